//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ValidationError;

/// Declares a non-empty string identifier with the usual accessors.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates the identifier, returning error if empty.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id!(
    /// Subject identifier (the user whose access or payment is in question).
    UserId,
    "user_id"
);

string_id!(
    /// Plan reference a subscription or payment is tied to.
    PlanId,
    "plan_id"
);

string_id!(
    /// Protected content identifier.
    ContentId,
    "content_id"
);

string_id!(
    /// Action performed on content, e.g. "view" or "download".
    ///
    /// Rate limit and usage counters are keyed by (subject, action).
    Action,
    "action"
);

string_id!(
    /// Gateway-assigned or locally generated webhook event id.
    EventId,
    "event_id"
);

impl EventId {
    /// Local id for events delivered without one.
    pub fn generate() -> Self {
        Self(format!("evt_{}", Uuid::new_v4().simple()))
    }
}

string_id!(
    /// Payment transaction identifier (`txn_...`).
    TransactionId,
    "transaction_id"
);

impl TransactionId {
    pub fn generate() -> Self {
        Self(format!("txn_{}", Uuid::new_v4().simple()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_rejects_empty_string() {
        let err = UserId::new("").unwrap_err();
        assert_eq!(err, ValidationError::empty_field("user_id"));
    }

    #[test]
    fn action_rejects_whitespace() {
        assert!(Action::new("   ").is_err());
    }

    #[test]
    fn content_id_displays_inner_value() {
        let id = ContentId::new("article-42").unwrap();
        assert_eq!(id.to_string(), "article-42");
        assert_eq!(id.as_str(), "article-42");
    }

    #[test]
    fn generated_event_ids_are_prefixed_and_unique() {
        let a = EventId::generate();
        let b = EventId::generate();
        assert!(a.as_str().starts_with("evt_"));
        assert_ne!(a, b);
    }

    #[test]
    fn generated_transaction_ids_are_prefixed() {
        assert!(TransactionId::generate().as_str().starts_with("txn_"));
    }

    #[test]
    fn plan_id_deserializes_from_plain_string() {
        let id: PlanId = serde_json::from_str("\"p1\"").unwrap();
        assert_eq!(id.as_str(), "p1");
    }

    #[test]
    fn plan_id_deserialization_rejects_empty() {
        let result: Result<PlanId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
