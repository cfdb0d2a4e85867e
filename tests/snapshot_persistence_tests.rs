//! The CLI's memory backend keeps state between runs through a snapshot file.

use enrollment_desk::cli::Backend;
use enrollment_desk::config::{EnrollmentDeskConfig, StorageBackend};
use enrollment_desk::{EnrollmentDesk, EnrollmentStatus};

#[tokio::test]
async fn workflow_survives_reopening_the_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = EnrollmentDeskConfig::default();
    config.storage.backend = StorageBackend::Memory;
    config.storage.snapshot_path = dir.path().join("desk.json");

    let id = {
        let backend = Backend::open(&config).await.unwrap();
        let desk = EnrollmentDesk::new(backend.stores());
        desk.register_student("Alice", "Smith", "alice@example.com")
            .await
            .unwrap();
        desk.add_course("Intro to Go", "Goroutines", Some(vec![0xff, 0xd8]))
            .await
            .unwrap();
        let id = desk.enroll("Alice", "Smith", "Intro to Go").await.unwrap().id;
        desk.approve(id).await.unwrap();
        backend.persist().await.unwrap();
        id
    };

    let backend = Backend::open(&config).await.unwrap();
    let desk = EnrollmentDesk::new(backend.stores());
    let record = desk.by_id(id).await.unwrap();
    assert_eq!(record.status, EnrollmentStatus::Approved);
    assert_eq!(record.course_title, "Intro to Go");
    assert!(desk.enroll("Alice", "Smith", "Intro to Go").await.is_err());
    assert_eq!(
        desk.find_course("Intro to Go").await.unwrap().image,
        Some(vec![0xff, 0xd8])
    );
}
