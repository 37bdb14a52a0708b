//! Unified error type surfaced by the runtime API.
//!
//! Wraps engine failures and configuration problems so hosts can bubble them
//! up with consistent context.
use behavior_tree::TreeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("invalid value {value:?} for {key}")]
    InvalidSetting { key: &'static str, value: String },
}
