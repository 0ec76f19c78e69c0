//! Home-screen bucketing of pending tasks and exams.
//!
//! # Responsibility
//! - Group items by due date, then by subject within each date.
//! - Detect items whose due date has passed and purge them from the store
//!   (expiry sweep).
//!
//! # Invariants
//! - Buckets iterate nearest date first.
//! - Applying the same input twice leaves the board unchanged; an item is
//!   never present twice.
//! - Items missing from the latest input, or expired, disappear on the next
//!   pass together with any group or bucket left empty.

use crate::model::item::{Exam, ExamId, ItemKind, PlannerItem, Task, TaskId};
use crate::model::subject::SubjectId;
use crate::repo::exam_repo::ExamRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Items of one subject due on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectGroup {
    pub subject_id: SubjectId,
    pub tasks: Vec<Task>,
    pub exams: Vec<Exam>,
}

impl SubjectGroup {
    fn new(subject_id: SubjectId) -> Self {
        Self {
            subject_id,
            tasks: Vec::new(),
            exams: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.exams.is_empty()
    }
}

/// Items that live in one slot of a [`SubjectGroup`].
trait Bucketed: PlannerItem + Clone + PartialEq {
    fn slot(group: &mut SubjectGroup) -> &mut Vec<Self>;
}

impl Bucketed for Task {
    fn slot(group: &mut SubjectGroup) -> &mut Vec<Self> {
        &mut group.tasks
    }
}

impl Bucketed for Exam {
    fn slot(group: &mut SubjectGroup) -> &mut Vec<Self> {
        &mut group.exams
    }
}

/// Due-date buckets of pending items, each split into subject groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HomeBoard {
    buckets: BTreeMap<NaiveDate, Vec<SubjectGroup>>,
}

impl HomeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges the current task list into the board.
    ///
    /// Returns ids of expired tasks, which are not placed on the board.
    pub fn apply_tasks(&mut self, tasks: &[Task], today: NaiveDate) -> Vec<TaskId> {
        self.apply(tasks, today)
    }

    /// Merges the current exam list into the board.
    ///
    /// Returns ids of expired exams, which are not placed on the board.
    pub fn apply_exams(&mut self, exams: &[Exam], today: NaiveDate) -> Vec<ExamId> {
        self.apply(exams, today)
    }

    /// Bucket dates, nearest first.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.buckets.keys().copied()
    }

    /// Buckets with their subject groups, nearest date first.
    pub fn buckets(&self) -> impl Iterator<Item = (NaiveDate, &[SubjectGroup])> + '_ {
        self.buckets
            .iter()
            .map(|(date, groups)| (*date, groups.as_slice()))
    }

    /// Subject groups due on `date`; empty when there is no bucket.
    pub fn groups(&self, date: NaiveDate) -> &[SubjectGroup] {
        self.buckets
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of tasks and exams on the board.
    pub fn item_count(&self) -> usize {
        self.buckets
            .values()
            .flatten()
            .map(|group| group.tasks.len() + group.exams.len())
            .sum()
    }

    fn apply<I: Bucketed>(&mut self, items: &[I], today: NaiveDate) -> Vec<i64> {
        let latest = items
            .iter()
            .map(|item| (item.id(), item))
            .collect::<HashMap<_, _>>();

        // Drop stale entries; changed items are re-inserted below.
        for groups in self.buckets.values_mut() {
            for group in groups.iter_mut() {
                I::slot(group).retain(|existing| {
                    !existing.is_expired(today) && latest.get(&existing.id()) == Some(&existing)
                });
            }
            groups.retain(|group| !group.is_empty());
        }
        self.buckets.retain(|_, groups| !groups.is_empty());

        let mut expired = Vec::new();
        for item in items {
            if item.is_expired(today) {
                expired.push(item.id());
                continue;
            }

            let groups = self.buckets.entry(item.due_date()).or_default();
            let position = groups
                .iter()
                .position(|group| group.subject_id == item.subject_id());
            let group = match position {
                Some(index) => &mut groups[index],
                None => {
                    groups.push(SubjectGroup::new(item.subject_id()));
                    let last = groups.len() - 1;
                    &mut groups[last]
                }
            };

            let slot = I::slot(group);
            match slot.iter_mut().find(|existing| existing.id() == item.id()) {
                Some(existing) => {
                    if *existing != *item {
                        *existing = item.clone();
                    }
                }
                None => slot.push(item.clone()),
            }
        }

        expired
    }
}

/// Outcome of one home refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RefreshReport {
    pub expired_tasks: usize,
    pub expired_exams: usize,
}

/// Loads items from the store into a [`HomeBoard`] and sweeps expired rows.
pub struct HomeService<T: TaskRepository, E: ExamRepository> {
    tasks: T,
    exams: E,
}

impl<T: TaskRepository, E: ExamRepository> HomeService<T, E> {
    pub fn new(tasks: T, exams: E) -> Self {
        Self { tasks, exams }
    }

    /// Builds a fresh board for `today`.
    pub fn load_board(&self, today: NaiveDate) -> RepoResult<HomeBoard> {
        let mut board = HomeBoard::new();
        self.refresh(&mut board, today)?;
        Ok(board)
    }

    /// Re-reads tasks and exams into `board` and deletes expired rows.
    ///
    /// A failed delete is logged and skipped; the row is retried on the next
    /// refresh.
    pub fn refresh(&self, board: &mut HomeBoard, today: NaiveDate) -> RepoResult<RefreshReport> {
        let tasks = self.tasks.list_tasks()?;
        let expired_tasks = board.apply_tasks(&tasks, today);
        let exams = self.exams.list_exams()?;
        let expired_exams = board.apply_exams(&exams, today);

        let report = RefreshReport {
            expired_tasks: purge_expired(ItemKind::Task, &expired_tasks, |id| {
                self.tasks.delete_task(id)
            }),
            expired_exams: purge_expired(ItemKind::Exam, &expired_exams, |id| {
                self.exams.delete_exam(id)
            }),
        };
        info!(
            "event=home_refresh module=service status=ok buckets={} items={} expired_tasks={} expired_exams={}",
            board.buckets.len(),
            board.item_count(),
            report.expired_tasks,
            report.expired_exams
        );
        Ok(report)
    }
}

/// Deletes expired items by id, returning how many deletes succeeded.
pub(crate) fn purge_expired<F>(kind: ItemKind, ids: &[i64], mut delete: F) -> usize
where
    F: FnMut(i64) -> RepoResult<()>,
{
    let mut deleted = 0;
    for &id in ids {
        match delete(id) {
            Ok(()) => deleted += 1,
            Err(err) => warn!(
                "event=expiry_sweep module=service status=error kind={kind} id={id} error={err}"
            ),
        }
    }
    if !ids.is_empty() {
        info!("event=expiry_sweep module=service status=ok kind={kind} deleted={deleted}");
    }
    deleted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn task(id: TaskId, subject_id: SubjectId, days_ahead: i64) -> Task {
        let due_date = if days_ahead >= 0 {
            today() + Days::new(days_ahead as u64)
        } else {
            today() - Days::new(days_ahead.unsigned_abs())
        };
        Task {
            id,
            title: format!("task {id}"),
            due_date,
            reminder: due_date,
            subject_id,
            description: None,
            completed: false,
        }
    }

    fn exam(id: ExamId, subject_id: SubjectId, days_ahead: u64) -> Exam {
        let due_date = today() + Days::new(days_ahead);
        Exam {
            id,
            title: format!("exam {id}"),
            due_date,
            reminder: due_date,
            subject_id,
            description: None,
        }
    }

    #[test]
    fn same_date_different_subjects_make_two_groups() {
        let mut board = HomeBoard::new();
        board.apply_tasks(&[task(1, 10, 2), task(2, 20, 2)], today());

        let groups = board.groups(today() + Days::new(2));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].subject_id, 10);
        assert_eq!(groups[1].subject_id, 20);
    }

    #[test]
    fn same_date_same_subject_share_one_group() {
        let mut board = HomeBoard::new();
        board.apply_tasks(&[task(1, 10, 2), task(2, 10, 2)], today());
        board.apply_exams(&[exam(7, 10, 2)], today());

        let groups = board.groups(today() + Days::new(2));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].tasks.len(), 2);
        assert_eq!(groups[0].exams.len(), 1);
    }

    #[test]
    fn dates_are_nearest_first() {
        let mut board = HomeBoard::new();
        board.apply_tasks(&[task(1, 1, 9), task(2, 1, 0), task(3, 1, 4)], today());
        let offsets = board
            .dates()
            .map(|date| (date - today()).num_days())
            .collect::<Vec<_>>();
        assert_eq!(offsets, vec![0, 4, 9]);
    }

    #[test]
    fn expired_items_are_reported_not_placed() {
        let mut board = HomeBoard::new();
        let expired = board.apply_tasks(&[task(1, 1, -1), task(2, 1, 0)], today());
        assert_eq!(expired, vec![1]);
        assert_eq!(board.item_count(), 1);
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let tasks = [task(1, 1, 1), task(2, 2, 1), task(3, 1, 5)];
        let mut board = HomeBoard::new();
        board.apply_tasks(&tasks, today());
        let first = board.clone();
        board.apply_tasks(&tasks, today());
        assert_eq!(board, first);
    }

    #[test]
    fn removed_and_moved_items_leave_old_buckets() {
        let mut board = HomeBoard::new();
        board.apply_tasks(&[task(1, 1, 1), task(2, 1, 3)], today());

        let mut moved = task(2, 1, 3);
        moved.due_date = today() + Days::new(6);
        board.apply_tasks(&[moved.clone()], today());

        assert!(board.groups(today() + Days::new(1)).is_empty());
        assert!(board.groups(today() + Days::new(3)).is_empty());
        assert_eq!(board.groups(moved.due_date)[0].tasks, vec![moved]);
        assert_eq!(board.dates().count(), 1);
    }

    #[test]
    fn task_updates_do_not_touch_exams() {
        let mut board = HomeBoard::new();
        board.apply_exams(&[exam(1, 1, 2)], today());
        board.apply_tasks(&[], today());
        assert_eq!(board.item_count(), 1);
    }

    #[test]
    fn items_expire_when_the_day_rolls_over() {
        let mut board = HomeBoard::new();
        let tasks = [task(1, 1, 0)];
        board.apply_tasks(&tasks, today());
        let tomorrow = today() + Days::new(1);
        let expired = board.apply_tasks(&tasks, tomorrow);
        assert_eq!(expired, vec![1]);
        assert!(board.is_empty());
    }
}
