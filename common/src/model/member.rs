use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A captured lead, as stored in the `members` table.
///
/// `email` is lower-cased before it reaches storage and is unique across
/// the table, so it is the key every repeat intake is merged on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub gender: Option<String>,
    pub consent_to_emails: bool,
    /// Comma-joined free-text tags, e.g. `Career,Wealth`.
    pub focus_areas: Option<String>,
    pub source_page: Option<String>,
    pub ip_address: Option<String>,
    pub country_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Individual focus tags, trimmed, with empty entries dropped.
    pub fn focus_tags(&self) -> impl Iterator<Item = &str> {
        self.focus_areas
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
    }
}

/// Birth details, one row per member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirthData {
    pub id: i64,
    pub member_id: i64,
    pub date_of_birth: NaiveDate,
    pub time_of_birth: Option<NaiveTime>,
    pub birth_city: Option<String>,
    /// Free-form, e.g. an IANA name or a `UTC+8` label.
    pub time_zone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_tags_skip_blank_entries() {
        let member = Member {
            id: 1,
            full_name: "A".into(),
            email: "a@x.com".into(),
            gender: None,
            consent_to_emails: true,
            focus_areas: Some(" Career, ,Wealth,".into()),
            source_page: None,
            ip_address: None,
            country_code: None,
            created_at: Utc::now(),
        };
        assert_eq!(member.focus_tags().collect::<Vec<_>>(), vec!["Career", "Wealth"]);
    }
}
