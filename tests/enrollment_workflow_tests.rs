//! End-to-end enrollment workflow through the `EnrollmentDesk` facade.
//! Testing library/framework: Rust built-in test framework with Tokio async runtime (#[tokio::test]).

use enrollment_desk::{
    EnrollmentDesk, EnrollmentError, EnrollmentId, EnrollmentStatus, ErrorKind, NotFound,
};

async fn desk_with_alice_and_go() -> EnrollmentDesk {
    let desk = EnrollmentDesk::in_memory();
    desk.register_student("Alice", "Smith", "alice@example.com")
        .await
        .expect("register alice");
    desk.add_course("Intro to Go", "Goroutines, channels and interfaces", None)
        .await
        .expect("add course");
    desk
}

#[tokio::test]
async fn alice_enrolls_then_is_approved_and_reset() {
    let desk = desk_with_alice_and_go().await;

    let created = desk.enroll("Alice", "Smith", "Intro to Go").await.unwrap();
    assert_eq!(created.status(), EnrollmentStatus::Pending);

    let record = desk.by_id(created.id).await.unwrap();
    assert_eq!(record.student_first_name, "Alice");
    assert_eq!(record.student_last_name, "Smith");
    assert_eq!(record.course_title, "Intro to Go");
    assert_eq!(record.status, EnrollmentStatus::Pending);
    assert_eq!(record.enrollment_date, created.enrolled_at());

    match desk.enroll("Alice", "Smith", "Intro to Go").await {
        Err(EnrollmentError::Conflict(message)) => {
            assert_eq!(message, "You are already enrolled in 'Intro to Go'")
        }
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(desk.all().await.unwrap().len(), 1);

    desk.approve(created.id).await.unwrap();
    assert_eq!(
        desk.by_id(created.id).await.unwrap().status,
        EnrollmentStatus::Approved
    );

    desk.reset(created.id).await.unwrap();
    assert_eq!(
        desk.by_id(created.id).await.unwrap().status,
        EnrollmentStatus::Pending
    );
}

#[tokio::test]
async fn unknown_course_lists_known_titles() {
    let desk = desk_with_alice_and_go().await;
    desk.add_course("Rust 101", "Ownership and borrowing", None)
        .await
        .unwrap();

    let err = desk
        .enroll("Bob", "Jones", "Nonexistent Course")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    match &err {
        EnrollmentError::NotFound(NotFound::Course { title, candidates }) => {
            assert_eq!(title, "Nonexistent Course");
            assert_eq!(candidates, &vec!["Intro to Go".to_string(), "Rust 101".to_string()]);
        }
        other => panic!("expected course not found, got {other:?}"),
    }
    assert!(err.to_string().contains("Available courses: [Intro to Go, Rust 101]"));
    assert!(desk.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_student_lists_known_students() {
    let desk = desk_with_alice_and_go().await;
    let err = desk.enroll("Bob", "Jones", "Intro to Go").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Student 'Bob Jones' not found. Available students: [Alice Smith]"
    );
}

#[tokio::test]
async fn blank_inputs_fail_validation_without_writes() {
    let desk = desk_with_alice_and_go().await;
    for (first, last, title) in [
        ("", "Smith", "Intro to Go"),
        ("Alice", "   ", "Intro to Go"),
        ("Alice", "Smith", ""),
    ] {
        let err = desk.enroll(first, last, title).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
    assert!(desk.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_enrollment_cannot_be_resubmitted() {
    let desk = desk_with_alice_and_go().await;
    let created = desk.enroll("Alice", "Smith", "Intro to Go").await.unwrap();
    desk.reject(created.id).await.unwrap();

    let err = desk.enroll("Alice", "Smith", "Intro to Go").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // reset is the way back into the queue
    let outcome = desk.reset(created.id).await.unwrap();
    assert_eq!(outcome.previous, EnrollmentStatus::Rejected);
    assert_eq!(outcome.current, EnrollmentStatus::Pending);
}

#[tokio::test]
async fn any_status_sequence_is_accepted() {
    let desk = desk_with_alice_and_go().await;
    let id = desk.enroll("Alice", "Smith", "Intro to Go").await.unwrap().id;

    for _ in 0..2 {
        desk.approve(id).await.unwrap();
        desk.reject(id).await.unwrap();
        desk.reset(id).await.unwrap();
    }
    assert_eq!(desk.by_id(id).await.unwrap().status, EnrollmentStatus::Pending);

    let outcome = desk.set_status(id, "approved").await.unwrap();
    assert_eq!(outcome.current, EnrollmentStatus::Approved);

    let err = desk.set_status(id, "archived").await.unwrap_err();
    assert!(matches!(err, EnrollmentError::InvalidStatus { .. }));
    assert_eq!(desk.by_id(id).await.unwrap().status, EnrollmentStatus::Approved);
}

#[tokio::test]
async fn status_queries_are_case_insensitive() {
    let desk = desk_with_alice_and_go().await;
    desk.register_student("Bob", "Jones", "bob@example.com")
        .await
        .unwrap();
    let alice = desk.enroll("Alice", "Smith", "Intro to Go").await.unwrap();
    desk.enroll("Bob", "Jones", "Intro to Go").await.unwrap();
    desk.approve(alice.id).await.unwrap();

    let a = desk.by_status("approved").await.unwrap();
    let b = desk.by_status("APPROVED").await.unwrap();
    let c = desk.by_status("Approved").await.unwrap();
    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(a.len(), 1);
    assert_eq!(desk.by_status("pending").await.unwrap().len(), 1);

    let err = desk.by_status("bogus").await.unwrap_err();
    assert!(matches!(err, EnrollmentError::Validation(_)));
}

#[tokio::test]
async fn student_and_course_views() {
    let desk = desk_with_alice_and_go().await;
    let bob = desk
        .register_student("Bob", "Jones", "bob@example.com")
        .await
        .unwrap();
    let rust = desk
        .add_course("Rust 101", "Ownership and borrowing", None)
        .await
        .unwrap();

    desk.enroll("Alice", "Smith", "Intro to Go").await.unwrap();
    desk.enroll("Alice", "Smith", "Rust 101").await.unwrap();
    desk.enroll_by_ids(bob.id, rust.id).await.unwrap();

    let alice = desk.find_student("Alice", "Smith").await.unwrap();
    assert_eq!(desk.by_student(alice.id).await.unwrap().len(), 2);
    assert_eq!(desk.by_student(bob.id).await.unwrap().len(), 1);

    let rust_roster = desk.by_course(rust.id).await.unwrap();
    let names: Vec<_> = rust_roster
        .iter()
        .map(|r| r.student_first_name.as_str())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob"]);
}

#[tokio::test]
async fn delete_then_reenroll() {
    let desk = desk_with_alice_and_go().await;
    let first = desk.enroll("Alice", "Smith", "Intro to Go").await.unwrap();
    desk.delete(first.id).await.unwrap();

    assert!(matches!(
        desk.by_id(first.id).await,
        Err(EnrollmentError::NotFound(NotFound::Enrollment(_)))
    ));
    let second = desk.enroll("Alice", "Smith", "Intro to Go").await.unwrap();
    assert_ne!(second.id, first.id);
    assert!(matches!(
        desk.approve(EnrollmentId(999)).await,
        Err(EnrollmentError::NotFound(_))
    ));
}
