mod decode;
mod mime;
mod slot;

pub use decode::decode_artifact;
pub use decode::ArtifactUpload;
pub use decode::DecodeError;
pub use mime::ArtifactMime;
pub use slot::Slot;
