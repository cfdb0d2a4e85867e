use anyhow::Result;

use super::print_json;
use crate::domain::{CourseId, StudentId};
use crate::service::EnrollmentDesk;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Student(StudentId),
    Course(CourseId),
    Status(String),
}

pub struct ListCommand {
    filter: ListFilter,
}

impl ListCommand {
    pub fn new(filter: ListFilter) -> Self {
        Self { filter }
    }

    pub async fn execute(&self, desk: &EnrollmentDesk) -> Result<()> {
        let records = match &self.filter {
            ListFilter::All => desk.all().await?,
            ListFilter::Student(id) => desk.by_student(*id).await?,
            ListFilter::Course(id) => desk.by_course(*id).await?,
            ListFilter::Status(raw) => desk.by_status(raw).await?,
        };
        print_json(&records)
    }
}
