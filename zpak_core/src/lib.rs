pub mod archive;
pub mod codec;
pub mod decode;
pub mod encode;
pub mod error;
pub mod format;
pub mod serializer;

pub use archive::Archive;
pub use codec::{Codec, Level};
pub use decode::{decode_file, DecodeReport};
pub use encode::{encode_dir, EncodeReport};
pub use error::{Error, Result};
pub use format::{Manifest, ManifestEntry};
