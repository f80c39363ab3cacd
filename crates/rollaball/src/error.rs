use std::net::AddrParseError;
use std::time::SystemTimeError;

use bevy_replicon_renet::netcode::NetcodeError;
use game_server::ServerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("netcode error: {0}")]
    Netcode(#[from] NetcodeError),

    #[error("invalid server address: {0}")]
    Address(#[from] AddrParseError),

    #[error("system clock before unix epoch: {0}")]
    SystemTime(#[from] SystemTimeError),

    #[error("embedded server failed: {0}")]
    EmbeddedServer(#[from] ServerError),
}
