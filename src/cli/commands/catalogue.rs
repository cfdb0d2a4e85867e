use anyhow::{Context, Result};
use std::path::Path;

use super::print_json;
use crate::cli::{CourseAction, StudentAction};
use crate::domain::{Course, CourseChanges, CourseId};
use crate::service::EnrollmentDesk;

async fn read_image(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))
}

fn course_summary(course: &Course) -> serde_json::Value {
    serde_json::json!({
        "id": course.id,
        "title": course.title,
        "description": course.description,
        "hasImage": course.image.is_some(),
        "imageType": course.image_kind().map(|kind| kind.content_type()),
    })
}

pub struct StudentCommand {
    action: StudentAction,
}

impl StudentCommand {
    pub fn new(action: StudentAction) -> Self {
        Self { action }
    }

    pub async fn execute(&self, desk: &EnrollmentDesk) -> Result<()> {
        match &self.action {
            StudentAction::Add {
                first_name,
                last_name,
                email,
            } => {
                let student = desk.register_student(first_name, last_name, email).await?;
                println!(
                    "✅ Registered {} {} (id {})",
                    student.first_name, student.last_name, student.id
                );
                Ok(())
            }
            StudentAction::List => {
                let students = desk.list_students().await?;
                if students.is_empty() {
                    println!("No students registered yet");
                    return Ok(());
                }
                for s in students {
                    println!("{:>4}  {} {} <{}>", s.id, s.first_name, s.last_name, s.email);
                }
                Ok(())
            }
        }
    }
}

pub struct CourseCommand {
    action: CourseAction,
}

impl CourseCommand {
    pub fn new(action: CourseAction) -> Self {
        Self { action }
    }

    pub async fn execute(&self, desk: &EnrollmentDesk) -> Result<()> {
        match &self.action {
            CourseAction::Add {
                title,
                description,
                image,
            } => {
                let image = match image {
                    Some(path) => Some(read_image(path).await?),
                    None => None,
                };
                let course = desk.add_course(title, description, image).await?;
                println!("✅ Added course '{}' (id {})", course.title, course.id);
                Ok(())
            }
            CourseAction::List => {
                let courses = desk.list_courses().await?;
                if courses.is_empty() {
                    println!("No courses in the catalogue yet");
                    return Ok(());
                }
                // image bytes stay out of listings
                let summary: Vec<_> = courses.iter().map(course_summary).collect();
                print_json(&summary)
            }
            CourseAction::Show { id, image_out } => {
                let course = desk.get_course(CourseId(*id)).await?;
                print_json(&course_summary(&course))?;

                if let Some(path) = image_out {
                    let bytes = course
                        .image
                        .as_deref()
                        .with_context(|| format!("Course {} has no image", course.id))?;
                    tokio::fs::write(path, bytes)
                        .await
                        .with_context(|| format!("Failed to write image {}", path.display()))?;
                    println!("🖼️  Wrote {} bytes to {}", bytes.len(), path.display());
                }
                Ok(())
            }
            CourseAction::Update {
                id,
                title,
                description,
                image,
            } => {
                let image = match image {
                    Some(path) => Some(read_image(path).await?),
                    None => None,
                };
                let changes = CourseChanges {
                    title: title.clone(),
                    description: description.clone(),
                    image,
                };
                let course = desk.update_course(CourseId(*id), changes).await?;
                println!("✅ Updated course '{}' (id {})", course.title, course.id);
                Ok(())
            }
            CourseAction::Delete { id } => {
                desk.delete_course(CourseId(*id)).await?;
                println!("🗑️  Course deleted successfully");
                Ok(())
            }
        }
    }
}
