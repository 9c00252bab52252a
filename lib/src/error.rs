use thiserror::Error;

use crate::bodies::BodyId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Index {index} out of range for a table of {len} slots")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unknown body id: {0}")]
    UnknownBody(u8),

    #[error("Body has no orbital elements: {0:?}")]
    NoElements(BodyId),

    #[error("Eccentricity must be finite and in [0, 1): {0}")]
    InvalidEccentricity(f64),

    #[error("Semi-major axis must be finite and positive: {0}")]
    InvalidSemiMajorAxis(f64),

    #[error("Gravitational parameter must be finite and positive: {0}")]
    InvalidGravitationalParameter(f64),

    #[error("Time must be a finite number of seconds within range: {0}")]
    InvalidTime(f64),

    #[error("Cannot normalize a zero-length vector")]
    ZeroLengthVector,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
