use clap::{Parser, Subcommand};

pub mod backend;
pub mod commands;

pub use backend::Backend;

#[derive(Parser)]
#[command(name = "enrollment-desk")]
#[command(about = "Course enrollment administration")]
#[command(long_about = "Register students and courses, submit enrollment requests by name, \
                       and approve, reject or reset them. Records are kept in a local snapshot \
                       or SQLite database depending on configuration.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage registered students
    Student {
        #[command(subcommand)]
        action: StudentAction,
    },
    /// Manage the course catalogue
    Course {
        #[command(subcommand)]
        action: CourseAction,
    },
    /// Submit an enrollment request by student name and course title
    Enroll {
        first_name: String,
        last_name: String,
        course_title: String,
    },
    /// Submit an enrollment request by student and course id
    EnrollIds { student_id: u64, course_id: u64 },
    /// Approve an enrollment request
    Approve { id: u64 },
    /// Reject an enrollment request
    Reject { id: u64 },
    /// Put an enrollment request back to pending
    Reset { id: u64 },
    /// Set an enrollment's status by name (PENDING, APPROVED, REJECTED)
    Status { id: u64, status: String },
    /// Delete an enrollment
    Delete { id: u64 },
    /// Show one enrollment
    Show { id: u64 },
    /// List enrollments, optionally filtered
    List {
        /// Only enrollments of this student id
        #[arg(long, conflicts_with_all = ["course", "status"])]
        student: Option<u64>,
        /// Only enrollments in this course id
        #[arg(long, conflicts_with = "status")]
        course: Option<u64>,
        /// Only enrollments with this status (case-insensitive)
        #[arg(long)]
        status: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum StudentAction {
    /// Register a student
    Add {
        first_name: String,
        last_name: String,
        email: String,
    },
    /// List registered students
    List,
}

#[derive(Subcommand)]
pub enum CourseAction {
    /// Add a course to the catalogue
    Add {
        title: String,
        description: String,
        /// Optional cover image file
        #[arg(long)]
        image: Option<std::path::PathBuf>,
    },
    /// List courses
    List,
    /// Show one course; optionally write its image to a file
    Show {
        id: u64,
        /// Write the course image here
        #[arg(long)]
        image_out: Option<std::path::PathBuf>,
    },
    /// Change a course's title, description or image
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Replacement cover image file (an empty file clears it)
        #[arg(long)]
        image: Option<std::path::PathBuf>,
    },
    /// Delete a course that no enrollment references
    Delete { id: u64 },
}

impl Commands {
    /// Whether running this command can change stored records.
    pub fn mutates(&self) -> bool {
        match self {
            Commands::Student { action } => matches!(action, StudentAction::Add { .. }),
            Commands::Course { action } => matches!(
                action,
                CourseAction::Add { .. } | CourseAction::Update { .. } | CourseAction::Delete { .. }
            ),
            Commands::Show { .. } | Commands::List { .. } => false,
            _ => true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Commands::Student { .. } => "student",
            Commands::Course { .. } => "course",
            Commands::Enroll { .. } => "enroll",
            Commands::EnrollIds { .. } => "enroll-ids",
            Commands::Approve { .. } => "approve",
            Commands::Reject { .. } => "reject",
            Commands::Reset { .. } => "reset",
            Commands::Status { .. } => "status",
            Commands::Delete { .. } => "delete",
            Commands::Show { .. } => "show",
            Commands::List { .. } => "list",
        }
    }
}
