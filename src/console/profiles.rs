use super::{Console, UNKNOWN_ERROR};
use crate::api::NewProfile;
use crate::auth::{AuthError, AuthOutcome};
use crate::constants::{
    ACTIVE_PROFILE_NAME_ID, CREATE_PROFILE_MODAL_ID, PROFILES_GRID_ID,
    PROFILE_BAD_WORDS_FIELD, PROFILE_CLIENT_ID_FIELD, PROFILE_CLIENT_SECRET_FIELD,
    PROFILE_COVER_LETTER_FIELD, PROFILE_DESCRIPTION_FIELD, PROFILE_FORM_FIELDS,
    PROFILE_NAME_FIELD, PROFILE_REDIRECT_URI_FIELD, PROFILE_RESUME_FIELD,
};
use crate::dom::lock;
use crate::render;
use tokio::task::JoinHandle;

impl Console {
    /// Shows the active profile's name in the header, when the page has one.
    pub async fn load_active_profile(&self) {
        match self.backend.list_profiles().await {
            Ok(profiles) => {
                if let Some(active) = profiles.iter().find(|p| p.is_active) {
                    lock(&self.document).set_text(ACTIVE_PROFILE_NAME_ID, &active.name);
                }
            }
            Err(e) => tracing::error!("Failed to load active profile: {}", e),
        }
    }

    pub async fn load_profiles(&self) {
        match self.backend.list_profiles().await {
            Ok(profiles) => {
                let mut doc = lock(&self.document);
                if !doc.contains(PROFILES_GRID_ID) {
                    tracing::error!("Profiles grid element not found");
                    return;
                }
                doc.set_inner_html(PROFILES_GRID_ID, render::profiles_grid(&profiles));
            }
            Err(e) => {
                tracing::error!("Failed to load profiles: {}", e);
                self.notifier
                    .error(&format!("Ошибка загрузки профилей: {}", e));
            }
        }
    }

    fn read_profile_form(&self) -> NewProfile {
        let doc = lock(&self.document);
        NewProfile {
            name: doc.value(PROFILE_NAME_FIELD),
            description: doc.value(PROFILE_DESCRIPTION_FIELD),
            resume_id: doc.value(PROFILE_RESUME_FIELD),
            bad_words: doc.value(PROFILE_BAD_WORDS_FIELD),
            client_id: doc.value(PROFILE_CLIENT_ID_FIELD),
            client_secret: doc.value(PROFILE_CLIENT_SECRET_FIELD),
            redirect_uri: doc.value(PROFILE_REDIRECT_URI_FIELD),
            cover_letter: doc.value(PROFILE_COVER_LETTER_FIELD),
        }
    }

    /// Submits the create-profile form.
    pub async fn create_profile(&self) {
        let profile = self.read_profile_form();
        if !profile.has_required_fields() {
            self.notifier
                .error("Заполните обязательные поля: название, Client ID и Client Secret");
            return;
        }

        match self.backend.create_profile(&profile).await {
            Ok(created) => {
                tracing::info!("Profile created: {:?}", created.id);
                self.notifier.success("Профиль успешно создан!");
                self.close_modal(CREATE_PROFILE_MODAL_ID);
                self.clear_profile_form();
                self.load_profiles().await;
            }
            Err(e) if e.is_status() => {
                self.notifier.error(&format!(
                    "Ошибка создания профиля: {}",
                    e.detail().unwrap_or(UNKNOWN_ERROR)
                ));
            }
            Err(e) => {
                tracing::error!("Failed to create profile: {}", e);
                self.notifier.error("Ошибка создания профиля");
            }
        }
    }

    pub async fn activate_profile(&self, profile_id: i64) {
        match self.backend.activate_profile(profile_id).await {
            Ok(()) => {
                self.notifier.success("Профиль активирован");
                futures::join!(self.load_profiles(), self.load_active_profile());
            }
            Err(e) => {
                tracing::error!("Failed to activate profile {}: {}", profile_id, e);
                self.notifier.error("Ошибка активации профиля");
            }
        }
    }

    /// Deletes a profile after the user confirms.
    pub async fn delete_profile(&self, profile_id: i64) {
        if !self
            .confirm
            .confirm("Вы уверены, что хотите удалить профиль?")
        {
            return;
        }

        match self.backend.delete_profile(profile_id).await {
            Ok(()) => {
                self.notifier.success("Профиль удален");
                futures::join!(self.load_profiles(), self.load_active_profile());
            }
            Err(e) => {
                tracing::error!("Failed to delete profile {}: {}", profile_id, e);
                self.notifier.error("Ошибка удаления профиля");
            }
        }
    }

    /// Starts the popup authorization for a profile.
    ///
    /// Returns the task that waits for the code and reports the result, or
    /// `None` when the popup could not be opened.
    pub async fn authorize_profile(&self, profile_id: i64) -> Option<JoinHandle<()>> {
        let attempt = match self.auth.initiate(profile_id).await {
            Ok(attempt) => attempt,
            Err(e) => {
                tracing::error!("Authorization of profile {} failed: {}", profile_id, e);
                let message = match e {
                    AuthError::Popup(_) => "Не удалось открыть окно авторизации",
                    AuthError::Link(_) | AuthError::InvalidLink(_) => {
                        "Ошибка получения ссылки авторизации"
                    }
                };
                self.notifier.error(message);
                return None;
            }
        };

        let console = self.clone();
        Some(tokio::spawn(async move {
            let outcome = attempt.run().await;
            console.report_auth_outcome(outcome).await;
        }))
    }

    async fn report_auth_outcome(&self, outcome: AuthOutcome) {
        match outcome {
            AuthOutcome::Authorized => {
                self.notifier.success("Авторизация прошла успешно!");
                self.load_profiles().await;
            }
            AuthOutcome::Rejected { detail } => {
                self.notifier.error(&format!(
                    "Ошибка авторизации: {}",
                    detail.as_deref().unwrap_or(UNKNOWN_ERROR)
                ));
            }
            AuthOutcome::ExchangeFailed(_) => {
                self.notifier.error("Ошибка при обмене кода на токен");
            }
            AuthOutcome::Abandoned => {
                self.notifier
                    .warning("Авторизация отменена: окно авторизации закрыто");
            }
            AuthOutcome::TimedOut => {
                self.notifier.warning("Время ожидания авторизации истекло");
            }
            AuthOutcome::Cancelled => {
                tracing::debug!("Authorization attempt cancelled");
            }
        }
    }

    /// Empties the create-profile form and restores the default redirect URI.
    pub fn clear_profile_form(&self) {
        let mut doc = lock(&self.document);
        for field in PROFILE_FORM_FIELDS {
            doc.set_value(field, "");
        }
        doc.set_value(PROFILE_REDIRECT_URI_FIELD, &self.default_redirect_uri);
    }
}
