//! Request bodies for paywall endpoints.
//!
//! Responses are the domain `AccessVerdict` serialized as is.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Action, ContentId, PlanId, UserId, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckAccessRequest {
    pub user_id: String,
    pub content_id: String,
    /// Plan the content requires; any active plan qualifies when absent.
    #[serde(default)]
    pub plan_id: Option<String>,
}

impl CheckAccessRequest {
    pub fn parse(self) -> Result<(UserId, ContentId, Option<PlanId>), ValidationError> {
        let plan_id = match self.plan_id {
            Some(plan) if !plan.trim().is_empty() => Some(PlanId::new(plan)?),
            _ => None,
        };
        Ok((UserId::new(self.user_id)?, ContentId::new(self.content_id)?, plan_id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforceRequest {
    pub user_id: String,
    pub content_id: String,
    pub action: String,
}

impl EnforceRequest {
    pub fn parse(self) -> Result<(UserId, ContentId, Action), ValidationError> {
        Ok((
            UserId::new(self.user_id)?,
            ContentId::new(self.content_id)?,
            Action::new(self.action)?,
        ))
    }
}
