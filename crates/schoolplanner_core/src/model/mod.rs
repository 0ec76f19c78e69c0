//! Planner domain model.
//!
//! # Responsibility
//! - Define subjects, tasks and exams as stored by the planner.
//! - Hold the pure date, reminder and route logic shared by services.
//!
//! # Invariants
//! - Dates are compared at day granularity.
//! - Subjects are referenced from tasks and exams by `SubjectId`.

pub mod date;
pub mod item;
pub mod reminder;
pub mod route;
pub mod subject;
