//! In-memory model of the console page.
//!
//! Elements are addressed by id (`"profiles-grid"`) or, for the few
//! elements without one, by selector (`".history-table tbody"`). Only the
//! properties the console touches are modeled.

use crate::constants::{
    ACTIVE_PROFILE_NAME_ID, CREATE_PROFILE_MODAL_ID, HISTORY_BODY_SELECTOR, NOTIFICATION_ID,
    NOTIFICATION_TEXT_SELECTOR, PROFILES_GRID_ID, PROFILE_FORM_FIELDS, SEARCH_INPUT_ID,
    VACANCIES_GRID_ID,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

/// The page shared between the console, the notifier and background tasks.
pub type SharedDocument = Arc<Mutex<Document>>;

/// Locks the shared page. A panic while holding the lock leaves the page
/// usable, so poisoning is ignored.
pub fn lock(document: &SharedDocument) -> MutexGuard<'_, Document> {
    document.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub inner_html: String,
    pub text: String,
    /// Form control value.
    pub value: String,
    pub classes: BTreeSet<String>,
    /// Inline `style.display`, if set.
    pub display: Option<String>,
}

impl Element {
    pub fn with_class(class: &str) -> Self {
        let mut element = Self::default();
        element.set_class_name(class);
        element
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    /// Replaces the whole class list, like assigning `className`.
    pub fn set_class_name(&mut self, class_name: &str) {
        self.classes = class_name.split_whitespace().map(str::to_string).collect();
    }

    pub fn class_name(&self) -> String {
        self.classes.iter().cloned().collect::<Vec<_>>().join(" ")
    }
}

/// A link in the navigation bar.
#[derive(Debug, Clone, PartialEq)]
pub struct NavLink {
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: HashMap<String, Element>,
    nav_links: Vec<NavLink>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full console layout: navigation, notification toast, the three
    /// page containers, the search field and the create-profile modal form.
    pub fn console_layout() -> Self {
        let mut doc = Self::new();
        doc.add_nav_link("/")
            .add_nav_link("/profiles")
            .add_nav_link("/history")
            .insert(NOTIFICATION_ID, Element::with_class("notification"))
            .insert(NOTIFICATION_TEXT_SELECTOR, Element::with_class("notification-text"))
            .insert(ACTIVE_PROFILE_NAME_ID, Element::default())
            .insert(PROFILES_GRID_ID, Element::with_class("profiles-grid"))
            .insert(VACANCIES_GRID_ID, Element::with_class("vacancies-grid"))
            .insert(HISTORY_BODY_SELECTOR, Element::default())
            .insert(SEARCH_INPUT_ID, Element::default())
            .insert(CREATE_PROFILE_MODAL_ID, Element::with_class("modal"));
        for field in PROFILE_FORM_FIELDS {
            doc.insert(field, Element::default());
        }
        doc
    }

    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    /// Inserts or replaces the element at `key`.
    pub fn insert(&mut self, key: &str, element: Element) -> &mut Self {
        self.elements.insert(key.to_string(), element);
        self
    }

    pub fn add_nav_link(&mut self, href: &str) -> &mut Self {
        self.nav_links.push(NavLink {
            href: href.to_string(),
            active: false,
        });
        self
    }

    pub fn get(&self, key: &str) -> Option<&Element> {
        self.elements.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Element> {
        self.elements.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.elements.contains_key(key)
    }

    /// Value of a form control; empty when the control is absent.
    pub fn value(&self, key: &str) -> String {
        self.get(key).map(|e| e.value.clone()).unwrap_or_default()
    }

    /// Sets a form control value. Returns false when the control is absent.
    pub fn set_value(&mut self, key: &str, value: &str) -> bool {
        match self.get_mut(key) {
            Some(element) => {
                element.value = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_text(&mut self, key: &str, text: &str) -> bool {
        match self.get_mut(key) {
            Some(element) => {
                element.text = text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_inner_html(&mut self, key: &str, html: String) -> bool {
        match self.get_mut(key) {
            Some(element) => {
                element.inner_html = html;
                true
            }
            None => false,
        }
    }

    pub fn inner_html(&self, key: &str) -> Option<&str> {
        self.get(key).map(|e| e.inner_html.as_str())
    }

    pub fn set_display(&mut self, key: &str, display: &str) -> bool {
        match self.get_mut(key) {
            Some(element) => {
                element.display = Some(display.to_string());
                true
            }
            None => false,
        }
    }

    pub fn nav_links(&self) -> &[NavLink] {
        &self.nav_links
    }

    pub fn nav_links_mut(&mut self) -> &mut [NavLink] {
        &mut self.nav_links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name_replaces_classes() {
        let mut element = Element::with_class("notification show");
        element.set_class_name("notification error");
        assert!(element.has_class("error"));
        assert!(!element.has_class("show"));
        assert_eq!(element.class_name(), "error notification");
    }

    #[test]
    fn test_console_layout_has_form_and_modal() {
        let doc = Document::console_layout();
        assert_eq!(doc.nav_links().len(), 3);
        assert!(doc.contains("p-ruri"));
        assert!(doc.get(CREATE_PROFILE_MODAL_ID).unwrap().has_class("modal"));
    }

    #[test]
    fn test_missing_elements_are_reported() {
        let mut doc = Document::new();
        assert!(!doc.set_value("p-name", "x"));
        assert_eq!(doc.value("p-name"), "");
        doc.insert("p-name", Element::default());
        assert!(doc.set_value("p-name", "x"));
        assert_eq!(doc.value("p-name"), "x");
    }
}
