use anyhow::Result;
use serde_json::json;

use super::print_json;
use crate::domain::EnrollmentId;
use crate::service::EnrollmentDesk;

#[derive(Debug, Clone)]
pub enum ReviewAction {
    Approve,
    Reject,
    Reset,
    SetStatus(String),
    Delete,
}

/// Staff action on a single enrollment.
pub struct ReviewCommand {
    id: EnrollmentId,
    action: ReviewAction,
}

impl ReviewCommand {
    pub fn new(id: u64, action: ReviewAction) -> Self {
        Self {
            id: EnrollmentId(id),
            action,
        }
    }

    pub async fn execute(&self, desk: &EnrollmentDesk) -> Result<()> {
        let message = match &self.action {
            ReviewAction::Approve => {
                desk.approve(self.id).await?;
                "Enrollment approved successfully".to_string()
            }
            ReviewAction::Reject => {
                desk.reject(self.id).await?;
                "Enrollment rejected successfully".to_string()
            }
            ReviewAction::Reset => {
                desk.reset(self.id).await?;
                "Enrollment reset to pending successfully".to_string()
            }
            ReviewAction::SetStatus(raw) => {
                let outcome = desk.set_status(self.id, raw).await?;
                format!("Enrollment status updated to {} successfully", outcome.current)
            }
            ReviewAction::Delete => {
                desk.delete(self.id).await?;
                println!("Enrollment deleted successfully");
                return Ok(());
            }
        };

        let record = desk.by_id(self.id).await?;
        print_json(&json!({ "message": message, "enrollment": record }))
    }
}
