use std::sync::Arc;

use async_trait::async_trait;
use classbook_core::{AppError, AppResult, Identity, Role, Tier};
use classbook_domain::{Grade, Homework, JournalRecord};
use tokio::sync::Mutex;

use crate::access_scoper::Audience;

use super::{JournalService, RecordQuery, RecordRepository};

struct FakeRecordRepository<T> {
    records: Mutex<Vec<T>>,
}

impl<T> Default for FakeRecordRepository<T> {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl<T: JournalRecord> RecordRepository<T> for FakeRecordRepository<T> {
    async fn list_records(&self) -> AppResult<Vec<T>> {
        Ok(self.records.lock().await.clone())
    }

    async fn find_record(&self, record_id: &str) -> AppResult<Option<T>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|record| record.record_id() == record_id)
            .cloned())
    }

    async fn save_record(&self, record: T) -> AppResult<()> {
        let mut records = self.records.lock().await;
        records.retain(|existing| existing.record_id() != record.record_id());
        records.push(record);
        Ok(())
    }

    async fn delete_record(&self, record_id: &str) -> AppResult<bool> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|record| record.record_id() != record_id);
        Ok(records.len() != before)
    }
}

fn grade_service() -> (JournalService<Grade>, Arc<FakeRecordRepository<Grade>>) {
    let repository = Arc::new(FakeRecordRepository::<Grade>::default());
    (JournalService::new(repository.clone()), repository)
}

fn admin() -> Identity {
    Identity::new(
        "admin-1",
        Role::Admin,
        [Tier::Teacher, Tier::User],
        vec!["ROLE_ADMIN".to_owned()],
        None,
    )
}

fn physics_teacher() -> Identity {
    Identity::new(
        "teacher-1",
        Role::Teacher {
            subject: Some("Physics".to_owned()),
        },
        [],
        vec!["ROLE_TEACHER_PHYSICS".to_owned()],
        None,
    )
}

fn student(id: &str) -> Identity {
    Identity::new(
        id,
        Role::User,
        [],
        vec!["ROLE_USER".to_owned()],
        Some("10a".to_owned()),
    )
}

fn grade(student_id: &str, subject: &str, value: u8) -> Grade {
    Grade {
        id: String::new(),
        student_id: student_id.to_owned(),
        group_id: "10a".to_owned(),
        subject: subject.to_owned(),
        value,
        kind: Some("test".to_owned()),
        comment: None,
        schedule_id: None,
        lesson_date: None,
    }
}

async fn seed(service: &JournalService<Grade>, grades: Vec<Grade>) -> Vec<Grade> {
    let mut created = Vec::new();
    for record in grades {
        match service.create(&admin(), record).await {
            Ok(record) => created.push(record),
            Err(error) => panic!("seeding failed: {error}"),
        }
    }
    created
}

#[tokio::test]
async fn physics_teacher_reads_only_physics_grades_of_a_group() {
    let (service, _) = grade_service();
    seed(
        &service,
        vec![
            grade("s-1", "Physics", 5),
            grade("s-1", "Chemistry", 3),
            grade("s-2", "Physics", 4),
        ],
    )
    .await;

    let listed = service
        .list(&physics_teacher(), Audience::Staff, RecordQuery::group("10a"))
        .await;
    let Ok(listed) = listed else {
        panic!("teacher should read group grades");
    };

    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|record| record.subject == "Physics"));
}

#[tokio::test]
async fn physics_teacher_cannot_create_chemistry_grade() {
    let (service, repository) = grade_service();
    let result = service
        .create(&physics_teacher(), grade("s-1", "Chemistry", 4))
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(repository.records.lock().await.is_empty());
}

#[tokio::test]
async fn physics_teacher_cannot_edit_a_chemistry_grade_into_physics() {
    let (service, _) = grade_service();
    let created = seed(&service, vec![grade("s-1", "Chemistry", 3)]).await;

    let result = service
        .update(&physics_teacher(), &created[0].id, grade("s-1", "Physics", 5))
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let result = service.delete(&physics_teacher(), &created[0].id).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn student_cannot_read_another_students_grades() {
    let (service, _) = grade_service();
    let created = seed(&service, vec![grade("s-2", "Physics", 5)]).await;

    let listed = service
        .list(&student("s-1"), Audience::SelfService, RecordQuery::student("s-2"))
        .await;
    assert!(matches!(listed, Err(AppError::Forbidden(_))));

    let fetched = service
        .get(&student("s-1"), Audience::SelfService, &created[0].id)
        .await;
    assert!(matches!(fetched, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn student_listing_is_narrowed_to_own_grades() {
    let (service, _) = grade_service();
    seed(
        &service,
        vec![grade("s-1", "Physics", 5), grade("s-2", "Physics", 2)],
    )
    .await;

    let listed = service
        .list(&student("s-1"), Audience::SelfService, RecordQuery::default())
        .await;
    let Ok(listed) = listed else {
        panic!("student should read own grades");
    };
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].student_id, "s-1");
}

#[tokio::test]
async fn students_cannot_write_grades() {
    let (service, _) = grade_service();
    let result = service.create(&student("s-1"), grade("s-1", "Physics", 5)).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn out_of_range_grade_is_rejected() {
    let (service, repository) = grade_service();
    let result = service.create(&admin(), grade("s-1", "Physics", 7)).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(repository.records.lock().await.is_empty());
}

#[tokio::test]
async fn update_keeps_the_stored_identifier() {
    let (service, _) = grade_service();
    let created = seed(&service, vec![grade("s-1", "Physics", 3)]).await;

    let updated = service
        .update(&physics_teacher(), &created[0].id, grade("s-1", "physics", 4))
        .await;
    let Ok(updated) = updated else {
        panic!("update within scope should succeed");
    };
    assert_eq!(updated.id, created[0].id);
    assert_eq!(updated.value, 4);
}

#[tokio::test]
async fn average_covers_only_the_students_grades() {
    let (service, _) = grade_service();
    seed(
        &service,
        vec![
            grade("s-1", "Physics", 5),
            grade("s-1", "History", 4),
            grade("s-2", "Physics", 2),
        ],
    )
    .await;

    let average = service.average_for_student(&student("s-1"), "s-1").await;
    assert_eq!(average.ok().flatten(), Some(4.5));

    let empty = service.average_for_student(&admin(), "s-9").await;
    assert_eq!(empty.ok().flatten(), None);

    let foreign = service.average_for_student(&student("s-1"), "s-2").await;
    assert!(matches!(foreign, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn group_homework_is_visible_to_group_members() {
    let repository = Arc::new(FakeRecordRepository::<Homework>::default());
    let service = JournalService::new(repository);
    let homework = Homework {
        id: String::new(),
        group_id: "10a".to_owned(),
        subject: "History".to_owned(),
        title: "Essay".to_owned(),
        description: None,
        student_id: None,
        due_date: None,
    };
    let created = service.create(&admin(), homework).await;
    let Ok(created) = created else {
        panic!("admin should create homework");
    };

    let fetched = service
        .get(&student("s-1"), Audience::GroupScoped, &created.id)
        .await;
    assert!(fetched.is_ok());

    let listed = service
        .list(&student("s-1"), Audience::GroupScoped, RecordQuery::group("10b"))
        .await;
    assert!(matches!(listed, Err(AppError::Forbidden(_))));
}
