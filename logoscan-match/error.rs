use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("Invalid matcher configuration: {0}")]
    InvalidConfig(String),
}

pub type MatchResult<T> = Result<T, MatchError>;
