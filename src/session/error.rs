use std::io;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// An operation needed a level but none has been loaded.
    #[error("no level loaded")]
    NoLevelLoaded,

    /// The user asked to quit. Aborts whatever the session was doing.
    #[error("session terminated")]
    Terminated,

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;
