//! Error type shared by the task and exam services.

use crate::model::item::{ExamId, ItemValidationError, TaskId};
use crate::model::subject::SubjectId;
use crate::repo::subject_repo::SubjectRepository;
use crate::repo::RepoError;
use crate::service::form::FormErrors;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ItemServiceError {
    /// Form failed field-level validation; nothing was stored.
    Form(FormErrors),
    Invalid(ItemValidationError),
    TaskNotFound(TaskId),
    ExamNotFound(ExamId),
    SubjectNotFound(SubjectId),
    Repo(RepoError),
}

impl Display for ItemServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Form(err) => write!(f, "{err}"),
            Self::Invalid(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::ExamNotFound(id) => write!(f, "exam not found: {id}"),
            Self::SubjectNotFound(id) => write!(f, "subject not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ItemServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Form(err) => Some(err),
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FormErrors> for ItemServiceError {
    fn from(value: FormErrors) -> Self {
        Self::Form(value)
    }
}

impl From<RepoError> for ItemServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity: "task", id } => Self::TaskNotFound(id),
            RepoError::NotFound { entity: "exam", id } => Self::ExamNotFound(id),
            RepoError::NotFound {
                entity: "subject",
                id,
            } => Self::SubjectNotFound(id),
            RepoError::ItemValidation(err) => Self::Invalid(err),
            other => Self::Repo(other),
        }
    }
}

pub type ItemServiceResult<T> = Result<T, ItemServiceError>;

/// Fails with `SubjectNotFound` for the first referenced subject that does
/// not exist.
pub(crate) fn ensure_subjects_exist<S: SubjectRepository>(
    subjects: &S,
    ids: impl IntoIterator<Item = SubjectId>,
) -> ItemServiceResult<()> {
    let distinct = ids.into_iter().collect::<BTreeSet<_>>();
    for id in distinct {
        if subjects.get_subject(id)?.is_none() {
            return Err(ItemServiceError::SubjectNotFound(id));
        }
    }
    Ok(())
}
