//! Turns a raw intake payload into a [`NormalizedIntake`].
//!
//! Everything here is pure: the HTTP-derived inputs (forwarded-for chain,
//! referer, peer address) arrive through [`RequestMeta`] so the rules can be
//! tested without a server. Optional fields come out as `None` when they are
//! blank, which the reconciler reads as "do not overwrite".

use actix_web::http::header::REFERER;
use actix_web::HttpRequest;
use aidoshop_common::requests::MemberIntakeRequest;
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde_json::Value;

use crate::error::AppError;

const FORWARDED_FOR: &str = "X-Forwarded-For";

/// Accepted date-of-birth layouts, tried in this order.
///
/// Day-first layouts come before the month-first one, so `03/04/2020` is
/// read as 3 April. Stored dates depend on this order; keep it.
const DATE_FORMATS: [DateFormat; 5] = [
    DateFormat::new("%Y-%m-%d", '-', 0, 4),
    DateFormat::new("%d/%m/%Y", '/', 2, 4),
    DateFormat::new("%d-%m-%Y", '-', 2, 4),
    DateFormat::new("%m/%d/%Y", '/', 2, 4),
    DateFormat::new("%d-%b-%y", '-', 2, 2),
];

/// Two-digit years from `69` up land in the 1900s. chrono only starts
/// that century at `70`.
const PIVOT_YEAR: &str = "69";

const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// A `strftime` layout plus the exact width of its year field.
///
/// chrono's `%Y` happily reads `82` as the year 82, so the width is checked
/// separately to keep `02-10-82` from sneaking through a four-digit layout.
struct DateFormat {
    pattern: &'static str,
    separator: char,
    year_field: usize,
    year_width: usize,
}

impl DateFormat {
    const fn new(
        pattern: &'static str,
        separator: char,
        year_field: usize,
        year_width: usize,
    ) -> Self {
        Self {
            pattern,
            separator,
            year_field,
            year_width,
        }
    }

    fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let year = raw.split(self.separator).nth(self.year_field)?;
        if year.len() != self.year_width || !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let date = NaiveDate::parse_from_str(raw, self.pattern).ok()?;
        if self.year_width == 2 && year == PIVOT_YEAR {
            return date.with_year(date.year() - 100);
        }
        Some(date)
    }
}

/// Request details that do not come from the JSON body.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub forwarded_for: Option<String>,
    pub referer: Option<String>,
    pub peer_ip: Option<String>,
}

impl RequestMeta {
    pub fn from_request(req: &HttpRequest) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            forwarded_for: header(FORWARDED_FOR),
            referer: header(REFERER.as_str()),
            peer_ip: req.peer_addr().map(|addr| addr.ip().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BirthDetails {
    pub date_of_birth: NaiveDate,
    pub time_of_birth: Option<NaiveTime>,
    pub birth_city: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedIntake {
    /// Trimmed and lower-cased, never empty.
    pub email: String,
    pub full_name: Option<String>,
    pub gender: Option<String>,
    /// `None` when the payload did not say.
    pub consent_to_emails: Option<bool>,
    pub focus_areas: Option<String>,
    pub source_page: Option<String>,
    pub ip_address: Option<String>,
    pub country_code: Option<String>,
    pub birth: BirthDetails,
}

impl NormalizedIntake {
    /// Name used when a new member is created.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }
}

pub fn normalize(
    payload: &MemberIntakeRequest,
    meta: &RequestMeta,
) -> Result<NormalizedIntake, AppError> {
    let email = trimmed(payload.email.as_deref())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| AppError::validation("Missing email in payload"))?;

    let dob_raw = trimmed(payload.date_of_birth.as_deref())
        .ok_or_else(|| AppError::validation("Missing date_of_birth in payload"))?;
    let date_of_birth = parse_date_of_birth(dob_raw)?;

    Ok(NormalizedIntake {
        email,
        full_name: owned(payload.full_name.as_deref()),
        gender: owned(payload.gender.as_deref()),
        consent_to_emails: payload.consent_to_emails.as_ref().and_then(consent_flag),
        focus_areas: payload.focus_areas.as_ref().and_then(join_focus_areas),
        source_page: owned(payload.source_page.as_deref())
            .or_else(|| owned(meta.referer.as_deref())),
        ip_address: client_ip(meta.forwarded_for.as_deref(), meta.peer_ip.as_deref()),
        country_code: trimmed(payload.country_code.as_deref()).map(|c| c.to_uppercase()),
        birth: BirthDetails {
            date_of_birth,
            time_of_birth: payload.time_of_birth.as_deref().and_then(parse_time_of_birth),
            birth_city: non_empty(payload.birth_city.as_deref()),
            time_zone: non_empty(payload.time_zone.as_deref()),
        },
    })
}

/// First layout in [`DATE_FORMATS`] that accepts `raw` wins.
pub fn parse_date_of_birth(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| format.parse(raw))
        .ok_or_else(|| AppError::validation(format!("Unsupported date format: {}", raw)))
}

/// Unreadable times are dropped rather than rejected.
pub fn parse_time_of_birth(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
}

/// Joins a tag list (or passes a single string through) as `a,b,c`.
pub fn join_focus_areas(raw: &Value) -> Option<String> {
    let joined = match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(scalar_text)
            .collect::<Vec<_>>()
            .join(","),
        other => scalar_text(other).unwrap_or_default(),
    };
    (!joined.is_empty()).then_some(joined)
}

/// Reads the consent flag. Only explicitly false-like values revoke
/// consent; `null` counts as not supplied.
pub fn consent_flag(raw: &Value) -> Option<bool> {
    match raw {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64() != Some(0.0)),
        Value::String(s) => {
            let s = s.trim().to_ascii_lowercase();
            Some(!matches!(s.as_str(), "" | "false" | "0" | "no" | "off"))
        }
        Value::Array(_) | Value::Object(_) => Some(true),
    }
}

/// Client address: the first hop of `X-Forwarded-For` when a proxy set one,
/// otherwise the socket peer.
pub fn client_ip(forwarded_for: Option<&str>, peer_ip: Option<&str>) -> Option<String> {
    forwarded_for
        .and_then(|chain| chain.split(',').next())
        .and_then(|first| trimmed(Some(first)))
        .or_else(|| trimmed(peer_ip))
        .map(str::to_string)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) => owned(Some(s.as_str())),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn owned(value: Option<&str>) -> Option<String> {
    trimmed(value).map(str::to_string)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
