use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A service was constructed without one of its required fields
    /// (`name`, `type` or `port`).
    #[error("missing required service field `{0}`")]
    ErrMissingField(&'static str),
    #[error("invalid port number")]
    ErrInvalidPortNumber,
    #[error("connection closed")]
    ErrConnectionClosed,
}
