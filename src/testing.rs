//! In-process fakes shared by the unit tests.

use crate::api::{
    ApiError, ApplyAllRequest, AuthLink, Backend, CreatedProfile, HealthStatus, HistoryItem,
    NewProfile, Profile, TokenRequest, Vacancy,
};
use crate::auth::bus::MessageBus;
use crate::auth::popup::{PopupError, PopupFeatures, PopupHandle, PopupHost};
use crate::auth::{AuthCoordinator, AuthSettings};
use crate::config::AppConfig;
use crate::console::{Confirm, Console};
use crate::constants::{NOTIFICATION_ID, NOTIFICATION_TEXT_SELECTOR};
use crate::dom::{lock, Document};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A scripted failure for one backend method.
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, Option<&'static str>),
    NonJson,
}

impl Reply {
    fn into_error(self) -> ApiError {
        match self {
            Reply::Status(status, detail) => ApiError::Status {
                status,
                detail: detail.map(str::to_string),
            },
            Reply::NonJson => ApiError::NonJson,
        }
    }
}

/// Records every call and answers from canned data; methods succeed unless
/// a failure was scripted with [`FakeBackend::fail`].
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, Reply>>,
    pub profiles: Mutex<Vec<Profile>>,
    pub vacancies: Mutex<Vec<Vacancy>>,
    pub history: Mutex<Vec<HistoryItem>>,
}

impl FakeBackend {
    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        let backend = Self::default();
        *backend.profiles.lock().unwrap() = profiles;
        backend
    }

    pub fn fail(&self, method: &'static str, reply: Reply) {
        self.failures.lock().unwrap().insert(method, reply);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split(':').next() == Some(method))
            .collect()
    }

    fn record(&self, method: &'static str, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(method) {
            Some(reply) => Err(reply.clone().into_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_profiles(&self) -> Result<Vec<Profile>, ApiError> {
        self.record("list_profiles", "list_profiles".into())?;
        Ok(self.profiles.lock().unwrap().clone())
    }

    async fn create_profile(&self, profile: &NewProfile) -> Result<CreatedProfile, ApiError> {
        self.record("create_profile", format!("create_profile:{}", profile.name))?;
        let mut profiles = self.profiles.lock().unwrap();
        let id = profiles.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        profiles.push(Profile {
            id,
            name: profile.name.clone(),
            ..Profile::default()
        });
        Ok(CreatedProfile {
            status: "created".into(),
            id: Some(id),
        })
    }

    async fn activate_profile(&self, profile_id: i64) -> Result<(), ApiError> {
        self.record("activate_profile", format!("activate_profile:{}", profile_id))?;
        for profile in self.profiles.lock().unwrap().iter_mut() {
            profile.is_active = profile.id == profile_id;
        }
        Ok(())
    }

    async fn delete_profile(&self, profile_id: i64) -> Result<(), ApiError> {
        self.record("delete_profile", format!("delete_profile:{}", profile_id))?;
        self.profiles.lock().unwrap().retain(|p| p.id != profile_id);
        Ok(())
    }

    async fn auth_link(&self, profile_id: i64) -> Result<AuthLink, ApiError> {
        self.record("auth_link", format!("auth_link:{}", profile_id))?;
        Ok(AuthLink {
            url: format!(
                "https://hh.ru/oauth/authorize?response_type=code&client_id=cid-{}",
                profile_id
            ),
        })
    }

    async fn exchange_token(&self, request: &TokenRequest) -> Result<(), ApiError> {
        self.record(
            "exchange_token",
            format!("exchange_token:{}:{}", request.profile_id, request.auth_code),
        )?;
        for profile in self.profiles.lock().unwrap().iter_mut() {
            if profile.id == request.profile_id {
                profile.has_token = true;
            }
        }
        Ok(())
    }

    async fn search_vacancies(&self, query: &str) -> Result<Vec<Vacancy>, ApiError> {
        self.record("search_vacancies", format!("search_vacancies:{}", query))?;
        Ok(self.vacancies.lock().unwrap().clone())
    }

    async fn apply_all(&self, request: &ApplyAllRequest) -> Result<(), ApiError> {
        self.record("apply_all", format!("apply_all:{}", request.query))
    }

    async fn apply(&self, vacancy_id: &str) -> Result<(), ApiError> {
        self.record("apply", format!("apply:{}", vacancy_id))
    }

    async fn history(&self) -> Result<Vec<HistoryItem>, ApiError> {
        self.record("history", "history".into())?;
        Ok(self.history.lock().unwrap().clone())
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.record("health", "health".into())?;
        Ok(HealthStatus {
            status: "healthy".into(),
        })
    }
}

struct FakePopup {
    closed: Arc<AtomicBool>,
}

impl PopupHandle for FakePopup {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Records opened popups; each handle can be closed from the test.
#[derive(Default)]
pub struct FakePopupHost {
    opened: Mutex<Vec<(String, String, PopupFeatures, Arc<AtomicBool>)>>,
    blocked: AtomicBool,
}

impl FakePopupHost {
    pub fn block(&self) {
        self.blocked.store(true, Ordering::SeqCst);
    }

    pub fn opened_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    pub fn last_opened(&self) -> Option<(String, String, PopupFeatures)> {
        self.opened
            .lock()
            .unwrap()
            .last()
            .map(|(url, name, features, _)| (url.clone(), name.clone(), *features))
    }

    /// Simulates the user closing the most recent popup.
    pub fn close_last(&self) {
        if let Some((_, _, _, closed)) = self.opened.lock().unwrap().last() {
            closed.store(true, Ordering::SeqCst);
        }
    }

    pub fn last_handle_closed(&self) -> bool {
        self.opened
            .lock()
            .unwrap()
            .last()
            .is_some_and(|(_, _, _, closed)| closed.load(Ordering::SeqCst))
    }
}

impl PopupHost for FakePopupHost {
    fn open(
        &self,
        url: &str,
        name: &str,
        features: PopupFeatures,
    ) -> Result<Box<dyn PopupHandle>, PopupError> {
        if self.blocked.load(Ordering::SeqCst) {
            return Err(PopupError::Blocked);
        }
        let closed = Arc::new(AtomicBool::new(false));
        self.opened.lock().unwrap().push((
            url.to_string(),
            name.to_string(),
            features,
            Arc::clone(&closed),
        ));
        Ok(Box::new(FakePopup { closed }))
    }
}

/// Answers every confirmation the same way and records the questions.
pub struct FixedConfirm {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl FixedConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Confirm for FixedConfirm {
    fn confirm(&self, message: &str) -> bool {
        self.asked.lock().unwrap().push(message.to_string());
        self.answer
    }
}

/// A console over `document` with fake backend and popups.
pub fn console_on(
    document: Document,
    backend: Arc<FakeBackend>,
    confirm: Arc<FixedConfirm>,
) -> (Console, Arc<FakePopupHost>) {
    let config = AppConfig::default();
    let popups = Arc::new(FakePopupHost::default());
    let mut settings = AuthSettings::from_config(&config);
    settings.poll_interval = std::time::Duration::from_millis(50);
    let auth = Arc::new(AuthCoordinator::new(
        backend.clone(),
        popups.clone(),
        MessageBus::new(16),
        settings,
    ));
    let console = Console::new(&config, document.into_shared(), backend, auth, confirm);
    (console, popups)
}

/// A console over the full page layout that answers every confirmation
/// with `confirm`.
pub fn console_with(backend: Arc<FakeBackend>, confirm: bool) -> (Console, Arc<FakePopupHost>) {
    console_on(
        Document::console_layout(),
        backend,
        Arc::new(FixedConfirm::new(confirm)),
    )
}

pub fn notification_text(console: &Console) -> String {
    lock(console.document())
        .get(NOTIFICATION_TEXT_SELECTOR)
        .map(|e| e.text.clone())
        .unwrap_or_default()
}

pub fn notification_kind_is(console: &Console, kind: &str) -> bool {
    lock(console.document())
        .get(NOTIFICATION_ID)
        .is_some_and(|e| e.has_class(kind) && e.has_class("show"))
}
