//! Page operations of the console.
//!
//! Each operation fetches from the backend, renders into the shared page
//! and reports the result through the notification toast. Failures never
//! propagate: they are logged and shown to the user.

mod history;
mod profiles;
mod vacancies;

use crate::api::{ApiError, Backend};
use crate::auth::AuthCoordinator;
use crate::config::AppConfig;
use crate::dom::{lock, SharedDocument};
use crate::notify::{NotificationKind, Notifier};
use std::sync::Arc;

/// Fallback when the backend gives no error detail.
pub const UNKNOWN_ERROR: &str = "Неизвестная ошибка";

/// Asks the user a yes/no question before destructive or bulk actions.
pub trait Confirm: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Accepts every confirmation; used for non-interactive runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, message: &str) -> bool {
        tracing::debug!("Auto-confirmed: {}", message);
        true
    }
}

/// Which data a page path loads on start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Profiles,
    History,
    Other,
}

impl Page {
    pub fn from_path(path: &str) -> Self {
        if path.contains("profiles") {
            Page::Profiles
        } else if path.contains("history") {
            Page::History
        } else if path == "/" || path == "/index.html" {
            Page::Home
        } else {
            Page::Other
        }
    }
}

/// `"{prefix}: {detail}"` for backend rejections, `generic` for transport
/// and decoding failures.
fn failure_message(prefix: &str, generic: &str, error: &ApiError) -> String {
    if error.is_status() {
        format!("{}: {}", prefix, error.detail().unwrap_or(UNKNOWN_ERROR))
    } else {
        generic.to_string()
    }
}

#[derive(Clone)]
pub struct Console {
    document: SharedDocument,
    backend: Arc<dyn Backend>,
    notifier: Notifier,
    confirm: Arc<dyn Confirm>,
    auth: Arc<AuthCoordinator>,
    default_redirect_uri: String,
}

impl Console {
    pub fn new(
        config: &AppConfig,
        document: SharedDocument,
        backend: Arc<dyn Backend>,
        auth: Arc<AuthCoordinator>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        let notifier = Notifier::new(document.clone(), config.notification_duration());
        Self {
            document,
            backend,
            notifier,
            confirm,
            auth,
            default_redirect_uri: config.default_redirect_uri(),
        }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn auth(&self) -> &Arc<AuthCoordinator> {
        &self.auth
    }

    pub fn show_notification(&self, message: &str, kind: NotificationKind) {
        self.notifier.show(message, kind);
    }

    pub fn open_modal(&self, modal_id: &str) {
        lock(&self.document).set_display(modal_id, "flex");
    }

    pub fn close_modal(&self, modal_id: &str) {
        lock(&self.document).set_display(modal_id, "none");
    }

    /// A click landing on a modal backdrop closes that modal.
    pub fn click(&self, target: &str) {
        let mut doc = lock(&self.document);
        if let Some(element) = doc.get_mut(target) {
            if element.has_class("modal") {
                element.display = Some("none".to_string());
            }
        }
    }

    /// Highlights the navigation link matching `path`.
    pub fn set_active_page(&self, path: &str) {
        tracing::debug!("Current path: {}", path);
        let mut doc = lock(&self.document);
        for link in doc.nav_links_mut() {
            let href = link.href.as_str();
            link.active = path == href
                || (path == "/" && href == "/")
                || (path.contains("profiles") && href == "/profiles")
                || (path.contains("history") && href == "/history");
            if link.active {
                tracing::debug!("Active link set: {}", href);
            }
        }
    }

    /// Page start: highlights navigation and loads the page's data.
    pub async fn init(&self, path: &str) {
        tracing::info!("Initializing page {}", path);
        self.set_active_page(path);
        match Page::from_path(path) {
            Page::Profiles => self.load_profiles().await,
            Page::History => self.load_history().await,
            Page::Home => self.load_active_profile().await,
            Page::Other => {}
        }
    }

    /// Key press in the search field; Enter starts a search.
    pub async fn search_key(&self, key: &str) {
        if key == "Enter" {
            self.search_vacancies().await;
        }
    }

    /// Page teardown: abandons every pending authorization.
    pub fn teardown(&self) {
        self.auth.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CREATE_PROFILE_MODAL_ID;
    use crate::testing::{console_with, FakeBackend};

    #[test]
    fn test_page_from_path() {
        assert_eq!(Page::from_path("/"), Page::Home);
        assert_eq!(Page::from_path("/index.html"), Page::Home);
        assert_eq!(Page::from_path("/profiles"), Page::Profiles);
        assert_eq!(Page::from_path("/static/history.html"), Page::History);
        assert_eq!(Page::from_path("/settings"), Page::Other);
    }

    #[test]
    fn test_failure_message() {
        let rejected = ApiError::Status {
            status: 400,
            detail: None,
        };
        assert_eq!(
            failure_message("Ошибка отклика", "Ошибка отправки отклика", &rejected),
            "Ошибка отклика: Неизвестная ошибка"
        );
        assert_eq!(
            failure_message("Ошибка отклика", "Ошибка отправки отклика", &ApiError::NonJson),
            "Ошибка отправки отклика"
        );
    }

    #[tokio::test]
    async fn test_set_active_page_marks_single_link() {
        let (console, _) = console_with(Arc::new(FakeBackend::default()), true);
        console.set_active_page("/static/profiles.html");
        let doc = lock(console.document());
        let active: Vec<&str> = doc
            .nav_links()
            .iter()
            .filter(|l| l.active)
            .map(|l| l.href.as_str())
            .collect();
        assert_eq!(active, vec!["/profiles"]);
    }

    #[tokio::test]
    async fn test_modal_open_close_and_backdrop_click() {
        let (console, _) = console_with(Arc::new(FakeBackend::default()), true);
        console.open_modal(CREATE_PROFILE_MODAL_ID);
        assert_eq!(
            lock(console.document()).get(CREATE_PROFILE_MODAL_ID).unwrap().display.as_deref(),
            Some("flex")
        );

        console.click("profiles-grid");
        assert_eq!(
            lock(console.document()).get(CREATE_PROFILE_MODAL_ID).unwrap().display.as_deref(),
            Some("flex")
        );

        console.click(CREATE_PROFILE_MODAL_ID);
        assert_eq!(
            lock(console.document()).get(CREATE_PROFILE_MODAL_ID).unwrap().display.as_deref(),
            Some("none")
        );
    }

    #[tokio::test]
    async fn test_init_routes_by_path() {
        let backend = Arc::new(FakeBackend::default());
        let (console, _) = console_with(backend.clone(), true);

        console.init("/profiles").await;
        console.init("/history").await;
        console.init("/").await;
        console.init("/about").await;
        assert_eq!(
            backend.calls(),
            vec!["list_profiles", "history", "list_profiles"]
        );
    }
}
