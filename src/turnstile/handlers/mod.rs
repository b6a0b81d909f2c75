pub mod health;
pub use self::health::health;

pub mod user_register;
pub use self::user_register::register;

pub mod user_login;
pub use self::user_login::login;

// shared response envelope for the form endpoints
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReplyKind {
    Success,
    Error,
}

/// JSON body returned by `/signup` and `/signin`.
///
/// Every validation or store outcome ships with HTTP 200; the frontend
/// branches on `type`. Optional fields are omitted when absent.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Reply {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(rename = "type")]
    pub kind: ReplyKind,
}

impl Reply {
    #[must_use]
    pub fn success(message: &str) -> Self {
        Self {
            message: message.to_string(),
            id: None,
            location: None,
            username: None,
            kind: ReplyKind::Success,
        }
    }

    #[must_use]
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            id: None,
            location: None,
            username: None,
            kind: ReplyKind::Error,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    #[must_use]
    pub fn with_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn error_reply_omits_optional_fields() -> Result<()> {
        let value = serde_json::to_value(Reply::error("Authentication failed"))?;

        assert_eq!(
            value,
            serde_json::json!({
                "message": "Authentication failed",
                "type": "error",
            })
        );

        Ok(())
    }

    #[test]
    fn success_reply_carries_identity_fields() -> Result<()> {
        let reply = Reply::success("Authentication successful")
            .with_id(7)
            .with_location("/client")
            .with_username("ann1");
        let value = serde_json::to_value(reply)?;

        assert_eq!(
            value,
            serde_json::json!({
                "message": "Authentication successful",
                "id": 7,
                "location": "/client",
                "username": "ann1",
                "type": "success",
            })
        );

        Ok(())
    }

    #[test]
    fn reply_round_trips() -> Result<()> {
        let reply = Reply::success("User registered successfully");
        let value = serde_json::to_value(&reply)?;
        let decoded: Reply = serde_json::from_value(value)?;

        assert_eq!(decoded, reply);

        Ok(())
    }
}
