//! Use-case services over the repository layer.
//!
//! # Responsibility
//! - Validate input forms and orchestrate repository calls.
//! - Map repository errors to domain-level failures for the host layer.

pub mod exam_service;
pub mod form;
pub mod home_service;
pub mod item_error;
pub mod settings_service;
pub mod subject_service;
pub mod task_service;
