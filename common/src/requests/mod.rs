use serde::Deserialize;
use serde_json::Value;

/// Body of `POST /api/member-intake`.
///
/// Every recognised key is listed here; anything else in the payload is
/// ignored. `focus_areas` and `consent_to_emails` are kept as raw JSON
/// because forms send them in several shapes (array or string, boolean or
/// string) and the backend normalizer decides what they mean.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MemberIntakeRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub consent_to_emails: Option<Value>,
    pub focus_areas: Option<Value>,
    pub source_page: Option<String>,
    pub country_code: Option<String>,
    pub date_of_birth: Option<String>,
    pub time_of_birth: Option<String>,
    pub birth_city: Option<String>,
    pub time_zone: Option<String>,
}

/// Form posted by the admin login page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Query string of the admin login page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginQuery {
    /// Page to return to after a successful login.
    pub next: Option<String>,
}

/// Filters accepted by `GET /admin/members`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MemberFilter {
    /// Substring matched against the stored focus tags.
    pub focus: Option<String>,
    /// Substring matched against name, email and source page.
    pub search: Option<String>,
}

impl MemberFilter {
    pub fn focus(&self) -> Option<&str> {
        non_blank(self.focus.as_deref())
    }

    pub fn search(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
