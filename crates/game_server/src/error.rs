use std::time::SystemTimeError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no free port in range {first}-{last}")]
    NoFreePort { first: u16, last: u16 },
    #[error("system clock is before the unix epoch: {0}")]
    SystemTime(#[from] SystemTimeError),
    #[error("invalid bind address {0:?}")]
    BindAddress(String),
    #[error("server state lock poisoned")]
    Poisoned,
}
