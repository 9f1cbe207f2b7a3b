//! Oracle error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    /// The oracle backend could not be reached
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    /// The oracle answered with something that does not parse
    #[error("malformed oracle response: {0}")]
    MalformedResponse(String),
}
