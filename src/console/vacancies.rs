use super::{failure_message, Console};
use crate::api::{ApplyAllRequest, Vacancy};
use crate::constants::{SEARCH_INPUT_ID, VACANCIES_GRID_ID};
use crate::dom::lock;
use crate::render;

impl Console {
    /// Current contents of the search field, trimmed. `None` when the page
    /// has no search field.
    pub fn search_query(&self) -> Option<String> {
        let doc = lock(&self.document);
        doc.get(SEARCH_INPUT_ID)
            .map(|input| input.value.trim().to_string())
    }

    pub async fn search_vacancies(&self) {
        let Some(query) = self.search_query() else {
            tracing::debug!("No search field on this page");
            return;
        };
        if query.is_empty() {
            self.notifier.warning("Введите поисковый запрос");
            return;
        }

        tracing::info!("Searching vacancies: {}", query);
        match self.backend.search_vacancies(&query).await {
            Ok(vacancies) => {
                tracing::info!("Found {} vacancies", vacancies.len());
                self.display_vacancies(&vacancies);
            }
            Err(e) => {
                tracing::error!("Vacancy search failed: {}", e);
                self.notifier.error(&failure_message(
                    "Ошибка поиска вакансий",
                    "Ошибка поиска вакансий",
                    &e,
                ));
            }
        }
    }

    pub fn display_vacancies(&self, vacancies: &[Vacancy]) {
        let mut doc = lock(&self.document);
        if !doc.contains(VACANCIES_GRID_ID) {
            tracing::error!("Vacancies grid element not found");
            return;
        }
        doc.set_inner_html(VACANCIES_GRID_ID, render::vacancies_grid(vacancies));
    }

    /// Starts bulk applications for the current search after confirmation.
    pub async fn auto_apply_to_all(&self) {
        let Some(query) = self.search_query() else {
            tracing::debug!("No search field on this page");
            return;
        };
        if query.is_empty() {
            self.notifier.warning("Сначала выполните поиск вакансий");
            return;
        }
        if !self
            .confirm
            .confirm("Запустить автоотклики на все найденные вакансии?")
        {
            return;
        }

        match self.backend.apply_all(&ApplyAllRequest { query }).await {
            Ok(()) => self
                .notifier
                .success("Автоотклики запущены! Отслеживайте прогресс в истории."),
            Err(e) => {
                tracing::error!("Bulk apply failed: {}", e);
                self.notifier.error(&failure_message(
                    "Ошибка запуска автооткликов",
                    "Ошибка запуска автооткликов",
                    &e,
                ));
            }
        }
    }

    pub async fn apply_to_vacancy(&self, vacancy_id: &str) {
        match self.backend.apply(vacancy_id).await {
            Ok(()) => self.notifier.success("Отклик отправлен!"),
            Err(e) => {
                tracing::error!("Apply to {} failed: {}", vacancy_id, e);
                self.notifier.error(&failure_message(
                    "Ошибка отклика",
                    "Ошибка отправки отклика",
                    &e,
                ));
            }
        }
    }
}
