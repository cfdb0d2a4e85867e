use anyhow::Result;
use serde_json::json;

use super::print_json;
use crate::domain::{CourseId, StudentId};
use crate::service::EnrollmentDesk;

pub enum EnrollCommand {
    ByName {
        first_name: String,
        last_name: String,
        course_title: String,
    },
    ByIds {
        student_id: StudentId,
        course_id: CourseId,
    },
}

impl EnrollCommand {
    pub async fn execute(&self, desk: &EnrollmentDesk) -> Result<()> {
        let enrollment = match self {
            EnrollCommand::ByName {
                first_name,
                last_name,
                course_title,
            } => desk.enroll(first_name, last_name, course_title).await?,
            EnrollCommand::ByIds {
                student_id,
                course_id,
            } => desk.enroll_by_ids(*student_id, *course_id).await?,
        };

        let record = desk.by_id(enrollment.id).await?;
        print_json(&json!({
            "message": "Enrollment request submitted successfully!",
            "enrollment": record,
        }))
    }
}
