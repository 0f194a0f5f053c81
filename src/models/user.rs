use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Two-letter avatar fallback, e.g. "AT" for Ada Turing
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_minimal_payload() {
        let user: User = serde_json::from_str(
            r#"{"id":3,"email":"ada@example.com","firstName":"ada","lastName":"turing"}"#,
        )
        .unwrap();
        assert!(user.is_active);
        assert_eq!(user.full_name(), "ada turing");
        assert_eq!(user.initials(), "AT");
    }

    #[test]
    fn test_user_accepts_backend_timestamps() {
        let user: User = serde_json::from_str(
            r#"{"id":3,"email":"a@b.co","firstName":"A","lastName":"B","createdAt":"2024-05-01T10:15:30.123456"}"#,
        )
        .unwrap();
        assert!(user.created_at.is_some());
    }
}
