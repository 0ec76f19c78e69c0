use chrono::{Days, NaiveDate};
use rusqlite::Connection;
use schoolplanner_core::db::open_db_in_memory;
use schoolplanner_core::repo::exam_repo::{ExamRepository, SqliteExamRepository};
use schoolplanner_core::repo::subject_repo::{SqliteSubjectRepository, SubjectRepository};
use schoolplanner_core::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use schoolplanner_core::service::home_service::{HomeService, RefreshReport};
use schoolplanner_core::{Color, NewExam, NewSubject, NewTask, SubjectId};

type Home<'c> = HomeService<SqliteTaskRepository<'c>, SqliteExamRepository<'c>>;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn day(offset: i64) -> NaiveDate {
    if offset >= 0 {
        today() + Days::new(offset as u64)
    } else {
        today() - Days::new(offset.unsigned_abs())
    }
}

fn home(conn: &Connection) -> Home<'_> {
    HomeService::new(
        SqliteTaskRepository::try_new(conn).unwrap(),
        SqliteExamRepository::try_new(conn).unwrap(),
    )
}

fn subject(conn: &Connection, name: &str) -> SubjectId {
    SqliteSubjectRepository::try_new(conn)
        .unwrap()
        .create_subject(&NewSubject::new(name, name, Color(1)))
        .unwrap()
}

fn task(conn: &Connection, subject_id: SubjectId, title: &str, due: i64) -> i64 {
    SqliteTaskRepository::try_new(conn)
        .unwrap()
        .create_task(&NewTask {
            title: title.to_string(),
            due_date: day(due),
            reminder: day(due),
            subject_id,
            description: None,
            completed: false,
        })
        .unwrap()
}

fn exam(conn: &Connection, subject_id: SubjectId, title: &str, due: i64) -> i64 {
    SqliteExamRepository::try_new(conn)
        .unwrap()
        .create_exam(&NewExam {
            title: title.to_string(),
            due_date: day(due),
            reminder: day(due),
            subject_id,
            description: None,
        })
        .unwrap()
}

#[test]
fn board_groups_by_date_then_subject() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "Math");
    let bio = subject(&conn, "Bio");
    task(&conn, math, "Worksheet", 1);
    task(&conn, bio, "Reading", 1);
    exam(&conn, math, "Quiz", 1);
    task(&conn, math, "Project", 5);

    let board = home(&conn).load_board(today()).unwrap();

    assert_eq!(board.dates().collect::<Vec<_>>(), vec![day(1), day(5)]);
    let tomorrow = board.groups(day(1));
    assert_eq!(tomorrow.len(), 2);
    let math_group = tomorrow
        .iter()
        .find(|group| group.subject_id == math)
        .unwrap();
    assert_eq!(math_group.tasks.len(), 1);
    assert_eq!(math_group.exams.len(), 1);
    assert_eq!(board.groups(day(5))[0].tasks[0].title, "Project");
    assert_eq!(board.item_count(), 4);
}

#[test]
fn expired_items_are_deleted_on_load() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "Math");
    task(&conn, math, "Yesterday", -1);
    exam(&conn, math, "Last week", -7);
    let due_today = task(&conn, math, "Today", 0);

    let mut board = home(&conn).load_board(today()).unwrap();

    assert_eq!(board.dates().collect::<Vec<_>>(), vec![today()]);
    let remaining = SqliteTaskRepository::try_new(&conn)
        .unwrap()
        .list_tasks()
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, due_today);
    assert!(SqliteExamRepository::try_new(&conn)
        .unwrap()
        .list_exams()
        .unwrap()
        .is_empty());

    let report = home(&conn).refresh(&mut board, day(1)).unwrap();
    assert_eq!(
        report,
        RefreshReport {
            expired_tasks: 1,
            expired_exams: 0
        }
    );
    assert!(board.is_empty());
}

#[test]
fn refresh_tracks_edits_and_deletes() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "Math");
    let art = subject(&conn, "Art");
    let moved = task(&conn, math, "Sketch", 2);
    let removed = exam(&conn, art, "Portfolio", 3);
    let service = home(&conn);
    let mut board = service.load_board(today()).unwrap();

    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut sketch = tasks.get_task(moved).unwrap().unwrap();
    sketch.subject_id = art;
    sketch.due_date = day(4);
    tasks.update_task(&sketch).unwrap();
    SqliteExamRepository::try_new(&conn)
        .unwrap()
        .delete_exam(removed)
        .unwrap();

    service.refresh(&mut board, today()).unwrap();
    let second_pass = board.clone();
    service.refresh(&mut board, today()).unwrap();

    assert_eq!(board.dates().collect::<Vec<_>>(), vec![day(4)]);
    assert_eq!(board.groups(day(4))[0].subject_id, art);
    assert_eq!(board, second_pass);
}
