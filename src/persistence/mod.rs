pub mod codec;
pub mod record;
pub mod references;
pub mod registry;

pub use codec::{decode_region, encode_region};
pub use record::KnownMapRecord;
pub use references::{EntityRef, ReferenceRegistry};
pub use registry::{codec_for, load_entity, save_entity, SavedComponent, SavedEntity, COMPONENT_CODECS};
