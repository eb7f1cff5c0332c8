use serde::{Deserialize, Serialize};

/// JSON answer of `POST /api/member-intake`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IntakeResponse {
    Ok {
        member_id: i64,
        /// `false` when the email matched an existing member and was merged.
        created: bool,
    },
    Error {
        message: String,
    },
}

/// One bar of the focus-area breakdown on the admin members page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FocusCount {
    pub label: String,
    pub count: usize,
}
