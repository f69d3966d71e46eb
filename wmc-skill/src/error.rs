//! Skill construction errors

use crate::resolver::ResolverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkillError {
    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),

    #[error(transparent)]
    Common(#[from] wmc_common::Error),

    /// Client name cannot be turned into a suffix pattern
    #[error("Invalid client pattern: {0}")]
    ClientPattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, SkillError>;
