//! Task use-case service.
//!
//! # Responsibility
//! - Turn validated add/edit forms into stored tasks.
//! - Provide completion toggling and deletion by id.
//!
//! # Invariants
//! - Forms are validated before any store access.
//! - Every referenced subject exists before tasks are written.
//! - Editing a task never changes its completion state.

use crate::model::item::{Task, TaskId};
use crate::repo::subject_repo::SubjectRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoResult;
use crate::service::form::ItemForm;
use crate::service::item_error::{ensure_subjects_exist, ItemServiceError, ItemServiceResult};
use log::info;

/// Task service facade over repository implementations.
pub struct TaskService<T: TaskRepository, S: SubjectRepository> {
    tasks: T,
    subjects: S,
}

impl<T: TaskRepository, S: SubjectRepository> TaskService<T, S> {
    pub fn new(tasks: T, subjects: S) -> Self {
        Self { tasks, subjects }
    }

    /// Creates one task per form entry, all or nothing.
    pub fn add_from_form(&self, form: &ItemForm) -> ItemServiceResult<Vec<TaskId>> {
        let new_tasks = form.build_tasks()?;
        ensure_subjects_exist(&self.subjects, new_tasks.iter().map(|task| task.subject_id))?;
        let ids = self.tasks.create_tasks(&new_tasks)?;
        info!(
            "event=task_create module=service status=ok count={}",
            ids.len()
        );
        Ok(ids)
    }

    /// Prefilled edit form for an existing task.
    pub fn edit_form(&self, id: TaskId) -> ItemServiceResult<ItemForm> {
        Ok(ItemForm::from_task(&self.get_task(id)?))
    }

    /// Replaces a task's fields with the single entry of an edit form.
    pub fn update_from_form(&self, id: TaskId, form: &ItemForm) -> ItemServiceResult<Task> {
        let current = self.get_task(id)?;
        let updated = form.apply_to_task(&current)?;
        ensure_subjects_exist(&self.subjects, [updated.subject_id])?;
        self.tasks.update_task(&updated)?;
        Ok(updated)
    }

    pub fn get_task(&self, id: TaskId) -> ItemServiceResult<Task> {
        self.tasks
            .get_task(id)?
            .ok_or(ItemServiceError::TaskNotFound(id))
    }

    pub fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        self.tasks.list_tasks()
    }

    pub fn set_completed(&self, id: TaskId, completed: bool) -> ItemServiceResult<()> {
        self.tasks.set_task_completed(id, completed)?;
        info!("event=task_complete module=service status=ok task_id={id} completed={completed}");
        Ok(())
    }

    pub fn delete_task(&self, id: TaskId) -> ItemServiceResult<()> {
        self.tasks.delete_task(id)?;
        info!("event=task_delete module=service status=ok task_id={id}");
        Ok(())
    }
}
