use chrono::NaiveDate;
use rusqlite::Connection;
use schoolplanner_core::db::open_db_in_memory;
use schoolplanner_core::model::reminder::ReminderOffset;
use schoolplanner_core::repo::exam_repo::SqliteExamRepository;
use schoolplanner_core::repo::subject_repo::{SqliteSubjectRepository, SubjectRepository};
use schoolplanner_core::repo::task_repo::SqliteTaskRepository;
use schoolplanner_core::service::exam_service::ExamService;
use schoolplanner_core::service::form::FormField;
use schoolplanner_core::service::item_error::ItemServiceError;
use schoolplanner_core::service::task_service::TaskService;
use schoolplanner_core::{
    Color, FormEntry, ItemForm, NewSubject, ReminderSelection, SubjectId,
};

type Tasks<'c> = TaskService<SqliteTaskRepository<'c>, SqliteSubjectRepository<'c>>;
type Exams<'c> = ExamService<SqliteExamRepository<'c>, SqliteSubjectRepository<'c>>;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, day).unwrap()
}

fn task_service(conn: &Connection) -> Tasks<'_> {
    TaskService::new(
        SqliteTaskRepository::try_new(conn).unwrap(),
        SqliteSubjectRepository::try_new(conn).unwrap(),
    )
}

fn exam_service(conn: &Connection) -> Exams<'_> {
    ExamService::new(
        SqliteExamRepository::try_new(conn).unwrap(),
        SqliteSubjectRepository::try_new(conn).unwrap(),
    )
}

fn subject(conn: &Connection, name: &str) -> SubjectId {
    SqliteSubjectRepository::try_new(conn)
        .unwrap()
        .create_subject(&NewSubject::new(name, &name[..1], Color::for_name(name)))
        .unwrap()
}

fn form(subject_id: SubjectId, titles: &[&str]) -> ItemForm {
    ItemForm {
        due_date: Some(date(20)),
        reminder: Some(ReminderSelection::Offset(ReminderOffset::TwoDaysBefore)),
        subject_id: Some(subject_id),
        entries: titles.iter().map(|title| FormEntry::titled(*title)).collect(),
    }
}

#[test]
fn batch_add_creates_one_task_per_entry() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "Math");
    let art = subject(&conn, "Art");
    let service = task_service(&conn);
    let mut batch = form(math, &["Exercise 1", "Exercise 2", "Poster"]);
    batch.entries[1].description = "  page 42  ".to_string();
    batch.entries[2].subject_id = Some(art);
    batch.entries[2].reminder = Some(ReminderSelection::Date(date(1)));

    let ids = service.add_from_form(&batch).unwrap();

    assert_eq!(ids.len(), 3);
    let first = service.get_task(ids[0]).unwrap();
    assert_eq!(first.reminder, date(18));
    assert_eq!(first.subject_id, math);
    assert!(!first.completed);
    assert_eq!(
        service.get_task(ids[1]).unwrap().description.as_deref(),
        Some("page 42")
    );
    let poster = service.get_task(ids[2]).unwrap();
    assert_eq!(poster.subject_id, art);
    assert_eq!(poster.reminder, date(1));
}

#[test]
fn invalid_form_stores_nothing() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "Math");
    let service = task_service(&conn);
    let mut invalid = form(math, &["Ok", "  "]);
    invalid.due_date = None;

    match service.add_from_form(&invalid) {
        Err(ItemServiceError::Form(errors)) => {
            assert!(errors.contains(FormField::DueDate));
            assert!(errors.contains(FormField::Title(1)));
            assert!(errors.to_string().starts_with("Please fill in all required fields"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(service.list_tasks().unwrap().is_empty());
}

#[test]
fn unknown_subject_rejects_whole_batch() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "Math");
    let service = task_service(&conn);
    let mut batch = form(math, &["A", "B"]);
    batch.entries[1].subject_id = Some(77);

    assert!(matches!(
        service.add_from_form(&batch),
        Err(ItemServiceError::SubjectNotFound(77))
    ));
    assert!(service.list_tasks().unwrap().is_empty());
}

#[test]
fn edit_round_trips_form_and_keeps_completion() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "Math");
    let physics = subject(&conn, "Physics");
    let service = task_service(&conn);
    let id = service.add_from_form(&form(math, &["Worksheet"])).unwrap()[0];
    service.set_completed(id, true).unwrap();

    let mut edit = service.edit_form(id).unwrap();
    assert_eq!(
        edit.reminder,
        Some(ReminderSelection::Offset(ReminderOffset::TwoDaysBefore))
    );
    edit.due_date = Some(date(27));
    edit.subject_id = Some(physics);
    edit.entries[0].title = "Worksheet v2".to_string();
    let updated = service.update_from_form(id, &edit).unwrap();

    assert_eq!(updated.title, "Worksheet v2");
    assert_eq!(updated.due_date, date(27));
    assert_eq!(updated.reminder, date(25));
    assert_eq!(updated.subject_id, physics);
    assert!(updated.completed);
    assert_eq!(service.get_task(id).unwrap(), updated);
}

#[test]
fn edit_with_several_entries_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "Math");
    let service = task_service(&conn);
    let id = service.add_from_form(&form(math, &["Worksheet"])).unwrap()[0];

    let mut edit = service.edit_form(id).unwrap();
    edit.entries.push(FormEntry::titled("Extra"));

    match service.update_from_form(id, &edit) {
        Err(ItemServiceError::Form(errors)) => assert!(errors.contains(FormField::EntryCount)),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn completion_toggles_and_missing_task_is_reported() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "Math");
    let service = task_service(&conn);
    let id = service.add_from_form(&form(math, &["Worksheet"])).unwrap()[0];

    service.set_completed(id, true).unwrap();
    assert!(service.get_task(id).unwrap().completed);
    service.set_completed(id, false).unwrap();
    assert!(!service.get_task(id).unwrap().completed);

    assert!(matches!(
        service.set_completed(404, true),
        Err(ItemServiceError::TaskNotFound(404))
    ));
    service.delete_task(id).unwrap();
    assert!(matches!(
        service.delete_task(id),
        Err(ItemServiceError::TaskNotFound(_))
    ));
}

#[test]
fn exams_follow_the_same_form_rules() {
    let conn = open_db_in_memory().unwrap();
    let history = subject(&conn, "History");
    let service = exam_service(&conn);
    let mut batch = form(history, &["Midterm", "Final"]);
    batch.reminder = Some(ReminderSelection::Offset(ReminderOffset::OneWeekBefore));

    let ids = service.add_from_form(&batch).unwrap();

    let exams = service.list_exams().unwrap();
    assert_eq!(exams.len(), 2);
    assert!(exams.iter().all(|exam| exam.reminder == date(13)));

    let mut edit = service.edit_form(ids[1]).unwrap();
    edit.reminder = Some(ReminderSelection::Date(date(21)));
    match service.update_from_form(ids[1], &edit) {
        Err(ItemServiceError::Form(errors)) => assert!(errors.contains(FormField::Reminder)),
        other => panic!("unexpected result: {other:?}"),
    }

    service.delete_exam(ids[0]).unwrap();
    assert!(matches!(
        service.get_exam(ids[0]),
        Err(ItemServiceError::ExamNotFound(_))
    ));
}

#[test]
fn tasks_list_by_due_date() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "Math");
    let service = task_service(&conn);
    let mut late = form(math, &["Later"]);
    late.due_date = Some(date(25));
    service.add_from_form(&late).unwrap();
    service.add_from_form(&form(math, &["Sooner"])).unwrap();

    let titles: Vec<String> = service
        .list_tasks()
        .unwrap()
        .into_iter()
        .map(|task| task.title)
        .collect();

    assert_eq!(titles, vec!["Sooner", "Later"]);
}
