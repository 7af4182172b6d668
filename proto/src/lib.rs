pub mod legacy;
pub mod persistence;
pub mod scheduler;

use definition::container::{NetworkMode, VolumeMode};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unrecognized container kind code: {0}")]
    UnknownKind(i32),

    #[error("Unrecognized volume mode code: {0}")]
    UnknownVolumeMode(i32),

    #[error("Unrecognized network mode code: {0}")]
    UnknownNetworkMode(i32),

    #[error("Unrecognized port mapping protocol: {0}")]
    UnknownProtocol(String),

    #[error("Malformed record: {0}")]
    Malformed(String),
}

impl From<prost::DecodeError> for ParseError {
    fn from(e: prost::DecodeError) -> Self {
        ParseError::Malformed(e.to_string())
    }
}

/// Container kind codes shared by the persistence and scheduler schemas.
/// The zero value is reserved so a written record always carries an explicit
/// kind; reading it back means the record was never fully written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum KindCode {
    Unspecified = 0,
    Docker = 1,
    Native = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum VolumeModeCode {
    Ro = 1,
    Rw = 2,
}

impl From<VolumeMode> for VolumeModeCode {
    fn from(mode: VolumeMode) -> Self {
        match mode {
            VolumeMode::ReadOnly => VolumeModeCode::Ro,
            VolumeMode::ReadWrite => VolumeModeCode::Rw,
        }
    }
}

impl From<VolumeModeCode> for VolumeMode {
    fn from(code: VolumeModeCode) -> Self {
        match code {
            VolumeModeCode::Ro => VolumeMode::ReadOnly,
            VolumeModeCode::Rw => VolumeMode::ReadWrite,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum NetworkModeCode {
    None = 1,
    Bridge = 2,
    Host = 3,
    User = 4,
}

impl From<NetworkMode> for NetworkModeCode {
    fn from(mode: NetworkMode) -> Self {
        match mode {
            NetworkMode::None => NetworkModeCode::None,
            NetworkMode::Bridge => NetworkModeCode::Bridge,
            NetworkMode::Host => NetworkModeCode::Host,
            NetworkMode::User => NetworkModeCode::User,
        }
    }
}

impl From<NetworkModeCode> for NetworkMode {
    fn from(code: NetworkModeCode) -> Self {
        match code {
            NetworkModeCode::None => NetworkMode::None,
            NetworkModeCode::Bridge => NetworkMode::Bridge,
            NetworkModeCode::Host => NetworkMode::Host,
            NetworkModeCode::User => NetworkMode::User,
        }
    }
}
