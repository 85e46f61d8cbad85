use crate::core::world::Entity;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FogboundError>;

#[derive(Debug, Error)]
pub enum FogboundError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed ron data: {0}")]
    Ron(#[from] ron::Error),

    #[error("component payload could not be coded: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("packed region is not valid base64: {0}")]
    RegionDecode(#[from] base64::DecodeError),

    #[error("packed region covers {found} cells, expected {expected}")]
    RegionLength { expected: usize, found: usize },

    #[error("`{0}` is not a color literal")]
    ColorLiteral(String),

    #[error("grid of {found:?} does not match {expected:?}")]
    DimensionMismatch {
        expected: (u16, u16),
        found: (u16, u16),
    },

    #[error("no codec registered for component `{0}`")]
    UnknownComponent(String),

    #[error("{pending} entity reference(s) could not be resolved")]
    UnresolvedReferences { pending: usize },

    #[error("component storage is full ({0} entities)")]
    WorldFull(usize),

    #[error("entity {0:?} does not exist")]
    NoSuchEntity(Entity),

    #[error("worker pool could not be built: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("task for {entity:?} failed: {message}")]
    AgentTask { entity: Entity, message: String },
}
