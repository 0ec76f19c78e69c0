//! Exam use-case service.
//!
//! Mirrors the task service minus completion: exams cannot be completed.

use crate::model::item::{Exam, ExamId};
use crate::repo::exam_repo::ExamRepository;
use crate::repo::subject_repo::SubjectRepository;
use crate::repo::RepoResult;
use crate::service::form::ItemForm;
use crate::service::item_error::{ensure_subjects_exist, ItemServiceError, ItemServiceResult};
use log::info;

/// Exam service facade over repository implementations.
pub struct ExamService<E: ExamRepository, S: SubjectRepository> {
    exams: E,
    subjects: S,
}

impl<E: ExamRepository, S: SubjectRepository> ExamService<E, S> {
    pub fn new(exams: E, subjects: S) -> Self {
        Self { exams, subjects }
    }

    /// Creates one exam per form entry, all or nothing.
    pub fn add_from_form(&self, form: &ItemForm) -> ItemServiceResult<Vec<ExamId>> {
        let new_exams = form.build_exams()?;
        ensure_subjects_exist(&self.subjects, new_exams.iter().map(|exam| exam.subject_id))?;
        let ids = self.exams.create_exams(&new_exams)?;
        info!(
            "event=exam_create module=service status=ok count={}",
            ids.len()
        );
        Ok(ids)
    }

    pub fn edit_form(&self, id: ExamId) -> ItemServiceResult<ItemForm> {
        Ok(ItemForm::from_exam(&self.get_exam(id)?))
    }

    pub fn update_from_form(&self, id: ExamId, form: &ItemForm) -> ItemServiceResult<Exam> {
        let current = self.get_exam(id)?;
        let updated = form.apply_to_exam(&current)?;
        ensure_subjects_exist(&self.subjects, [updated.subject_id])?;
        self.exams.update_exam(&updated)?;
        Ok(updated)
    }

    pub fn get_exam(&self, id: ExamId) -> ItemServiceResult<Exam> {
        self.exams
            .get_exam(id)?
            .ok_or(ItemServiceError::ExamNotFound(id))
    }

    pub fn list_exams(&self) -> RepoResult<Vec<Exam>> {
        self.exams.list_exams()
    }

    pub fn delete_exam(&self, id: ExamId) -> ItemServiceResult<()> {
        self.exams.delete_exam(id)?;
        info!("event=exam_delete module=service status=ok exam_id={id}");
        Ok(())
    }
}
