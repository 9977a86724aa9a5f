//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls around the grouping algorithm.
//! - Keep CLI callers decoupled from storage details.

use crate::model::ModelValidationError;
use crate::policy::PolicyError;
use crate::repo::RepoError;
use thiserror::Error;

pub mod grouping_service;
pub mod roster_service;

/// Service-level failure.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ModelValidationError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}
