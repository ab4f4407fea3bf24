use super::Console;
use crate::api::HistoryItem;
use crate::constants::HISTORY_BODY_SELECTOR;
use crate::dom::lock;
use crate::render;

impl Console {
    pub async fn load_history(&self) {
        match self.backend.history().await {
            Ok(history) => self.display_history(&history),
            Err(e) => {
                tracing::error!("Failed to load history: {}", e);
                self.notifier.error("Ошибка загрузки истории");
            }
        }
    }

    pub fn display_history(&self, history: &[HistoryItem]) {
        let mut doc = lock(&self.document);
        if !doc.contains(HISTORY_BODY_SELECTOR) {
            tracing::warn!("History table body not found");
            return;
        }
        doc.set_inner_html(HISTORY_BODY_SELECTOR, render::history_rows(history));
    }

    pub fn apply_history_filters(&self) {
        self.notifier.info("Фильтры применены");
    }

    /// Export is announced but not offered yet.
    pub fn export_history(&self, format: &str) {
        self.notifier.info(&format!(
            "Экспорт в {} будет доступен в следующем обновлении",
            format.to_uppercase()
        ));
    }
}

#[cfg(test)]
mod tests {
    use crate::api::HistoryItem;
    use crate::constants::HISTORY_BODY_SELECTOR;
    use crate::dom::lock;
    use crate::testing::{
        console_with, notification_kind_is, notification_text, FakeBackend, Reply,
    };
    use std::sync::Arc;

    fn item(id: i64, status: &str) -> HistoryItem {
        HistoryItem {
            id,
            date: "2024-03-05T10:00:00".to_string(),
            vacancy_id: format!("9{}", id),
            vacancy_title: "Rust developer".to_string(),
            company: "ООО Ромашка".to_string(),
            status: status.to_string(),
            response_text: None,
        }
    }

    #[tokio::test]
    async fn test_load_history_renders_status_labels() {
        let backend = Arc::new(FakeBackend::default());
        *backend.history.lock().unwrap() = vec![item(1, "accepted"), item(2, "pending")];
        let (console, _) = console_with(backend, true);

        console.load_history().await;
        let doc = lock(console.document());
        let html = doc.inner_html(HISTORY_BODY_SELECTOR).unwrap();
        assert_eq!(html.matches("<tr>").count(), 2);
        assert!(html.contains("Принят"));
        assert!(html.contains("Ожидание"));
        assert!(html.contains("05.03.2024"));
    }

    #[tokio::test]
    async fn test_empty_history_shows_placeholder_row() {
        let (console, _) = console_with(Arc::new(FakeBackend::default()), true);
        console.load_history().await;
        assert!(lock(console.document())
            .inner_html(HISTORY_BODY_SELECTOR)
            .unwrap()
            .contains("Нет данных об откликах"));
    }

    #[tokio::test]
    async fn test_load_history_failure() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail("history", Reply::NonJson);
        let (console, _) = console_with(backend, true);
        console.load_history().await;
        assert_eq!(notification_text(&console), "Ошибка загрузки истории");
        assert!(notification_kind_is(&console, "error"));
    }

    #[tokio::test]
    async fn test_filters_and_export_notices() {
        let (console, _) = console_with(Arc::new(FakeBackend::default()), true);
        console.apply_history_filters();
        assert_eq!(notification_text(&console), "Фильтры применены");
        assert!(notification_kind_is(&console, "info"));

        console.export_history("csv");
        assert_eq!(
            notification_text(&console),
            "Экспорт в CSV будет доступен в следующем обновлении"
        );
    }
}
