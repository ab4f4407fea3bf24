//! Application-wide constants for hh-console.
//!
//! Centralizes endpoint paths, element ids and default timings so the
//! console, renderer and coordinator agree on them.

// ============================================================================
// Application Identity
// ============================================================================

/// Directory name used under the platform config dir.
pub const APP_DIR_NAME: &str = "hh-console";

// ============================================================================
// Backend
// ============================================================================

/// Default location of the console backend.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// HTTP request timeout for backend calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Path of the static page that relays the authorization code to its opener.
pub const AUTH_CALLBACK_PATH: &str = "/static/auth_callback.html";

/// Public vacancy page on hh.ru, suffixed with the vacancy id.
pub const HH_VACANCY_URL: &str = "https://hh.ru/vacancy/";

// ============================================================================
// Authorization
// ============================================================================

/// `type` field of the cross-window message carrying the authorization code.
pub const AUTH_MESSAGE_TYPE: &str = "hh_auth_code";

/// Window name used for the authorization popup.
pub const AUTH_POPUP_NAME: &str = "hh_auth";

/// Default popup size in pixels.
pub const DEFAULT_POPUP_WIDTH: u32 = 600;
pub const DEFAULT_POPUP_HEIGHT: u32 = 700;

/// Interval between popup-closed checks.
pub const DEFAULT_POPUP_POLL_MS: u64 = 500;

/// An attempt that produced no code after this long is abandoned.
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 300;

/// Capacity of the cross-window message bus.
/// Slow listeners skip messages beyond this backlog.
pub const MESSAGE_BUS_CAPACITY: usize = 16;

/// Local address of the loopback callback listener.
pub const DEFAULT_CALLBACK_ADDR: &str = "127.0.0.1:8765";

/// Route of the loopback callback listener that receives provider redirects.
pub const LOOPBACK_CALLBACK_ROUTE: &str = "/callback";

// ============================================================================
// Notifications
// ============================================================================

/// How long a notification stays visible.
pub const DEFAULT_NOTIFICATION_SECS: u64 = 5;

// ============================================================================
// Page elements
// ============================================================================

pub const NOTIFICATION_ID: &str = "notification";
pub const ACTIVE_PROFILE_NAME_ID: &str = "active-profile-name";
pub const PROFILES_GRID_ID: &str = "profiles-grid";
pub const VACANCIES_GRID_ID: &str = "vacancies-grid";
pub const SEARCH_INPUT_ID: &str = "search-input";
pub const CREATE_PROFILE_MODAL_ID: &str = "create-profile-modal";

/// The history table body has no id; it is addressed by selector.
pub const HISTORY_BODY_SELECTOR: &str = ".history-table tbody";

/// Profile form fields, in form order.
pub const PROFILE_NAME_FIELD: &str = "p-name";
pub const PROFILE_DESCRIPTION_FIELD: &str = "p-desc";
pub const PROFILE_RESUME_FIELD: &str = "p-resume";
pub const PROFILE_BAD_WORDS_FIELD: &str = "p-bad";
pub const PROFILE_CLIENT_ID_FIELD: &str = "p-cid";
pub const PROFILE_CLIENT_SECRET_FIELD: &str = "p-csec";
pub const PROFILE_REDIRECT_URI_FIELD: &str = "p-ruri";
pub const PROFILE_COVER_LETTER_FIELD: &str = "p-letter";

pub const PROFILE_FORM_FIELDS: &[&str] = &[
    PROFILE_NAME_FIELD,
    PROFILE_DESCRIPTION_FIELD,
    PROFILE_RESUME_FIELD,
    PROFILE_BAD_WORDS_FIELD,
    PROFILE_CLIENT_ID_FIELD,
    PROFILE_CLIENT_SECRET_FIELD,
    PROFILE_REDIRECT_URI_FIELD,
    PROFILE_COVER_LETTER_FIELD,
];

/// Text node inside the notification toast.
pub const NOTIFICATION_TEXT_SELECTOR: &str = "#notification .notification-text";
