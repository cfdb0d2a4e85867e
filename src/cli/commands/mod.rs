use anyhow::Result;
use serde::Serialize;

use super::Commands;
use crate::domain::EnrollmentId;
use crate::service::EnrollmentDesk;

pub mod catalogue;
pub mod enroll;
pub mod list;
pub mod review;

pub use catalogue::{CourseCommand, StudentCommand};
pub use enroll::EnrollCommand;
pub use list::{ListCommand, ListFilter};
pub use review::{ReviewAction, ReviewCommand};

/// Run one parsed command against the desk.
pub async fn execute(command: Commands, desk: &EnrollmentDesk) -> Result<()> {
    match command {
        Commands::Student { action } => StudentCommand::new(action).execute(desk).await,
        Commands::Course { action } => CourseCommand::new(action).execute(desk).await,
        Commands::Enroll {
            first_name,
            last_name,
            course_title,
        } => {
            EnrollCommand::ByName {
                first_name,
                last_name,
                course_title,
            }
            .execute(desk)
            .await
        }
        Commands::EnrollIds {
            student_id,
            course_id,
        } => {
            EnrollCommand::ByIds {
                student_id: student_id.into(),
                course_id: course_id.into(),
            }
            .execute(desk)
            .await
        }
        Commands::Approve { id } => ReviewCommand::new(id, ReviewAction::Approve).execute(desk).await,
        Commands::Reject { id } => ReviewCommand::new(id, ReviewAction::Reject).execute(desk).await,
        Commands::Reset { id } => ReviewCommand::new(id, ReviewAction::Reset).execute(desk).await,
        Commands::Status { id, status } => {
            ReviewCommand::new(id, ReviewAction::SetStatus(status))
                .execute(desk)
                .await
        }
        Commands::Delete { id } => ReviewCommand::new(id, ReviewAction::Delete).execute(desk).await,
        Commands::Show { id } => {
            let record = desk.by_id(EnrollmentId(id)).await?;
            print_json(&record)
        }
        Commands::List {
            student,
            course,
            status,
        } => {
            let filter = match (student, course, status) {
                (Some(id), _, _) => ListFilter::Student(id.into()),
                (_, Some(id), _) => ListFilter::Course(id.into()),
                (_, _, Some(raw)) => ListFilter::Status(raw),
                _ => ListFilter::All,
            };
            ListCommand::new(filter).execute(desk).await
        }
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
