//! Subject use-case service.
//!
//! # Responsibility
//! - Create, edit and list subjects.
//! - Guard subject deletion: unused subjects are deleted directly, used
//!   ones go through the reassign or delete-with-items flows.
//!
//! # Invariants
//! - A subject referenced by any task or exam is never deleted on its own.
//! - Reassignment targets must exist and differ from the source.

use crate::model::subject::{NewSubject, Subject, SubjectId, SubjectValidationError};
use crate::repo::subject_repo::{SubjectRepository, SubjectUsage};
use crate::repo::{RepoError, RepoResult};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from subject service operations.
#[derive(Debug)]
pub enum SubjectServiceError {
    Invalid(SubjectValidationError),
    SubjectNotFound(SubjectId),
    /// Tasks or exams still reference the subject.
    SubjectInUse {
        id: SubjectId,
        usage: SubjectUsage,
    },
    /// Reassignment source and target are the same subject.
    SameSubject(SubjectId),
    Repo(RepoError),
}

impl Display for SubjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::SubjectNotFound(id) => write!(f, "subject not found: {id}"),
            Self::SubjectInUse { id, usage } => write!(
                f,
                "subject {id} is still used by {} task(s) and {} exam(s); move or delete them first",
                usage.tasks, usage.exams
            ),
            Self::SameSubject(id) => {
                write!(f, "cannot move items of subject {id} onto itself")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SubjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SubjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "subject",
                id,
            } => Self::SubjectNotFound(id),
            RepoError::SubjectValidation(err) => Self::Invalid(err),
            other => Self::Repo(other),
        }
    }
}

impl From<SubjectValidationError> for SubjectServiceError {
    fn from(value: SubjectValidationError) -> Self {
        Self::Invalid(value)
    }
}

pub type SubjectServiceResult<T> = Result<T, SubjectServiceError>;

/// Subject service facade over repository implementations.
pub struct SubjectService<R: SubjectRepository> {
    repo: R,
}

impl<R: SubjectRepository> SubjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and stores a subject, returning the stored record.
    pub fn create_subject(&self, subject: NewSubject) -> SubjectServiceResult<Subject> {
        subject.validate()?;
        let id = self.repo.create_subject(&subject)?;
        info!("event=subject_create module=service status=ok subject_id={id}");
        Ok(subject.into_subject(id))
    }

    pub fn update_subject(&self, subject: &Subject) -> SubjectServiceResult<()> {
        subject.validate()?;
        self.repo.update_subject(subject)?;
        Ok(())
    }

    pub fn get_subject(&self, id: SubjectId) -> SubjectServiceResult<Subject> {
        self.repo
            .get_subject(id)?
            .ok_or(SubjectServiceError::SubjectNotFound(id))
    }

    pub fn list_subjects(&self) -> RepoResult<Vec<Subject>> {
        self.repo.list_subjects()
    }

    /// Reference counts used to decide between delete and migrate flows.
    pub fn usage(&self, id: SubjectId) -> SubjectServiceResult<SubjectUsage> {
        self.get_subject(id)?;
        Ok(self.repo.subject_usage(id)?)
    }

    /// Deletes an unused subject.
    ///
    /// Returns `SubjectInUse` when tasks or exams still reference it.
    pub fn delete_subject(&self, id: SubjectId) -> SubjectServiceResult<()> {
        let usage = self.usage(id)?;
        if !usage.is_unused() {
            return Err(SubjectServiceError::SubjectInUse { id, usage });
        }
        self.repo.delete_subject(id)?;
        info!("event=subject_delete module=service status=ok subject_id={id} mode=plain");
        Ok(())
    }

    /// Moves all tasks and exams to `target`, then deletes `id`.
    pub fn reassign_and_delete(
        &self,
        id: SubjectId,
        target: SubjectId,
    ) -> SubjectServiceResult<SubjectUsage> {
        if id == target {
            return Err(SubjectServiceError::SameSubject(id));
        }
        self.get_subject(id)?;
        self.get_subject(target)?;

        let moved = self.repo.reassign_and_delete(id, target)?;
        info!(
            "event=subject_delete module=service status=ok subject_id={id} mode=reassign target={target} tasks={} exams={}",
            moved.tasks, moved.exams
        );
        Ok(moved)
    }

    /// Deletes the subject together with its tasks and exams.
    pub fn delete_with_items(&self, id: SubjectId) -> SubjectServiceResult<SubjectUsage> {
        self.get_subject(id)?;
        let removed = self.repo.delete_with_items(id)?;
        info!(
            "event=subject_delete module=service status=ok subject_id={id} mode=cascade tasks={} exams={}",
            removed.tasks, removed.exams
        );
        Ok(removed)
    }
}
