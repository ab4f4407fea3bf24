use thiserror::Error;

/// Size of the authorization popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupFeatures {
    pub width: u32,
    pub height: u32,
}

impl PopupFeatures {
    /// `window.open` feature string, e.g. `width=600,height=700`.
    pub fn feature_string(&self) -> String {
        format!("width={},height={}", self.width, self.height)
    }
}

#[derive(Error, Debug)]
pub enum PopupError {
    #[error("popup was blocked")]
    Blocked,
    #[error("failed to launch browser: {0}")]
    Launch(#[from] std::io::Error),
}

/// A window opened for the user; it may be closed outside our control.
pub trait PopupHandle: Send + Sync {
    fn is_closed(&self) -> bool;
    fn close(&self);
}

/// Opens popup windows.
pub trait PopupHost: Send + Sync {
    fn open(
        &self,
        url: &str,
        name: &str,
        features: PopupFeatures,
    ) -> Result<Box<dyn PopupHandle>, PopupError>;
}

/// Opens the authorization page in the user's default browser.
///
/// An external browser tab cannot be observed or closed from here, so its
/// handle never reports closed; abandoned attempts end by timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

struct BrowserTab;

impl PopupHandle for BrowserTab {
    fn is_closed(&self) -> bool {
        false
    }

    fn close(&self) {}
}

impl PopupHost for SystemBrowser {
    fn open(
        &self,
        url: &str,
        name: &str,
        features: PopupFeatures,
    ) -> Result<Box<dyn PopupHandle>, PopupError> {
        tracing::info!(
            "Opening authorization page {} ({}, {})",
            url,
            name,
            features.feature_string()
        );
        open::that(url)?;
        Ok(Box::new(BrowserTab))
    }
}
