//! Error taxonomy for the cosmos engine.
//!
//! Only surface creation is fatal. Everything else is absorbed where it
//! happens; the variants exist so lower layers can report what they dropped.

use thiserror::Error;

use crate::input::queue::InputChannel;

pub type CosmosResult<T> = Result<T, CosmosError>;

#[derive(Error, Debug)]
pub enum CosmosError {
    #[error("no renderable output surface: {0}")]
    SurfaceCreationFailure(String),

    #[error("permission denied for input channel {0:?}")]
    PermissionDenied(InputChannel),

    #[error("unknown point of interest: {0}")]
    UnknownPoi(String),

    #[error("orientation sample is missing beta or gamma")]
    MalformedOrientationSample,

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}
