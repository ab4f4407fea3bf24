use crate::api::{HistoryItem, Profile, Vacancy};
use crate::constants::HH_VACANCY_URL;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use horrorshow::helper::doctype;
use horrorshow::html;

/// Backend value or a placeholder when it is missing or empty.
fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => placeholder,
    }
}

/// Only http(s) links are rendered; anything else points nowhere.
fn external_href(url: Option<&str>) -> &str {
    match url {
        Some(url) if url.starts_with("https://") || url.starts_with("http://") => url,
        _ => "#",
    }
}

fn has_salary(vacancy: &Vacancy) -> bool {
    vacancy.salary.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn profile_card_class(profile: &Profile) -> &'static str {
    if profile.is_active {
        "profile-card active"
    } else {
        "profile-card"
    }
}

fn token_status_class(profile: &Profile) -> &'static str {
    if profile.has_token {
        "status-accepted"
    } else {
        "status-pending"
    }
}

fn token_status_text(profile: &Profile) -> &'static str {
    if profile.has_token {
        "Авторизован"
    } else {
        "Требуется авторизация"
    }
}

fn authorize_label(profile: &Profile) -> &'static str {
    if profile.has_token {
        "Переавторизовать"
    } else {
        "Авторизовать"
    }
}

/// Display label for an application status; unknown statuses pass through.
pub fn status_text(status: &str) -> &str {
    match status {
        "accepted" => "Принят",
        "pending" => "Ожидание",
        "rejected" => "Отклонен",
        "limit_exceeded" => "Лимит откликов исчерпан",
        other => other,
    }
}

/// Formats a backend timestamp as a Russian short date (`dd.mm.yyyy`).
/// Unrecognized values are shown as-is.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%d.%m.%Y").to_string();
    }
    for pattern in ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format("%d.%m.%Y").to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%d.%m.%Y").to_string();
    }
    raw.to_string()
}

/// Profile grid contents: one card per profile, or an empty state.
pub fn profiles_grid(profiles: &[Profile]) -> String {
    if profiles.is_empty() {
        return format!(
            "{}",
            html! {
                div(class="empty-state") {
                    div(class="empty-icon") {
                        svg(width="64", height="64", viewBox="0 0 24 24", fill="none",
                            stroke="currentColor", stroke-width="1") {
                            path(d="M20 21v-2a4 4 0 0 0-4-4H8a4 4 0 0 0-4 4v2") {}
                            circle(cx="12", cy="7", r="4") {}
                        }
                    }
                    h3 : "Нет созданных профилей";
                    p : "Создайте первый профиль для автоматических откликов";
                }
            }
        );
    }

    format!(
        "{}",
        html! {
            @ for profile in profiles {
                div(class=profile_card_class(profile)) {
                    div(class="profile-header") {
                        h3(class="profile-name") : &profile.name;
                        @ if profile.is_active {
                            span(class="active-badge") : "Активный";
                        }
                    }
                    p(class="profile-description")
                        : or_placeholder(Some(&profile.description), "Без описания");
                    div(class="profile-meta") {
                        div(class="meta-item") {
                            strong : "Резюме:";
                            : " ";
                            : or_placeholder(Some(&profile.resume_id), "Не указано");
                        }
                        div(class="meta-item") {
                            strong : "Статус:";
                            : " ";
                            span(class=token_status_class(profile)) : token_status_text(profile);
                        }
                    }
                    div(class="profile-actions") {
                        @ if !profile.is_active {
                            button(class="btn btn-select",
                                   onclick=format!("activateProfile({})", profile.id))
                                : "Активировать";
                        }
                        button(class="btn btn-outline",
                               onclick=format!("authorizeProfile({})", profile.id))
                            : authorize_label(profile);
                        button(class="btn btn-danger",
                               onclick=format!("deleteProfile({})", profile.id))
                            : "Удалить";
                    }
                }
            }
        }
    )
}

/// Vacancy grid contents: one card per vacancy, or an empty state.
pub fn vacancies_grid(vacancies: &[Vacancy]) -> String {
    if vacancies.is_empty() {
        return format!(
            "{}",
            html! {
                div(class="empty-state") {
                    div(class="empty-icon") {
                        svg(width="64", height="64", viewBox="0 0 24 24", fill="none",
                            stroke="currentColor", stroke-width="1") {
                            circle(cx="11", cy="11", r="8") {}
                            path(d="m21 21-4.3-4.3") {}
                        }
                    }
                    h3 : "Вакансии не найдены";
                    p : "Попробуйте изменить поисковый запрос";
                }
            }
        );
    }

    format!(
        "{}",
        html! {
            @ for vacancy in vacancies {
                div(class="vacancy-card") {
                    div(class="vacancy-header") {
                        h3(class="vacancy-title") : &vacancy.title;
                        span(class="vacancy-badge")
                            : or_placeholder(vacancy.kind.as_deref(), "Вакансия");
                    }
                    div(class="vacancy-content") {
                        div(class="vacancy-company") {
                            span(class="company-icon") : "🏢";
                            : " ";
                            : &vacancy.company;
                        }
                        div(class="vacancy-location") {
                            span(class="location-icon") : "📍";
                            : " ";
                            : or_placeholder(vacancy.area.as_deref(), "Не указано");
                        }
                        @ if has_salary(vacancy) {
                            div(class="vacancy-salary") : or_placeholder(vacancy.salary.as_deref(), "");
                        }
                        div(class="vacancy-description")
                            : or_placeholder(vacancy.snippet.as_deref(), "Описание не указано");
                    }
                    div(class="vacancy-actions") {
                        button(class="btn btn-primary", data-vacancy-id=vacancy.id.as_str(),
                               onclick="applyToVacancy(this.dataset.vacancyId)")
                            : "Откликнуться";
                        a(href=external_href(vacancy.url.as_deref()), target="_blank",
                          class="btn btn-outline")
                            : "Подробнее";
                    }
                }
            }
        }
    )
}

/// History table body: one row per item, or a single empty-state row.
pub fn history_rows(history: &[HistoryItem]) -> String {
    if history.is_empty() {
        return format!(
            "{}",
            html! {
                tr(class="empty-row") {
                    td(colspan="6") {
                        div(class="empty-state") {
                            div(class="empty-icon") {
                                svg(width="48", height="48", viewBox="0 0 24 24", fill="none",
                                    stroke="currentColor", stroke-width="1") {
                                    circle(cx="12", cy="12", r="10") {}
                                    line(x1="12", y1="8", x2="12", y2="12") {}
                                    line(x1="12", y1="16", x2="12.01", y2="16") {}
                                }
                            }
                            h4 : "Нет данных об откликах";
                            p : "Отправьте несколько откликов, чтобы увидеть историю";
                        }
                    }
                }
            }
        );
    }

    format!(
        "{}",
        html! {
            @ for item in history {
                tr {
                    td : format_date(&item.date);
                    td : &item.vacancy_title;
                    td : &item.company;
                    td {
                        span(class=format!("status-badge status-{}", item.status))
                            : status_text(&item.status);
                    }
                    td {
                        a(href=format!("{}{}", HH_VACANCY_URL, item.vacancy_id), target="_blank")
                            : &item.vacancy_id;
                    }
                    td {
                        button(class="btn btn-outline",
                               onclick=format!("viewResponseDetails({})", item.id))
                            : "Подробнее";
                    }
                }
            }
        }
    )
}

/// Page served by the loopback callback listener.
pub fn callback_page(success: bool) -> String {
    let (heading, message) = if success {
        (
            "Авторизация завершена",
            "Код авторизации получен. Это окно можно закрыть.",
        )
    } else {
        (
            "Ошибка авторизации",
            "Код авторизации не получен. Повторите попытку из консоли.",
        )
    };
    format!(
        "{}",
        html! {
            : doctype::HTML;
            html {
                head {
                    meta(charset="utf-8");
                    title : heading;
                }
                body {
                    h3 : heading;
                    p : message;
                }
            }
        }
    )
}
