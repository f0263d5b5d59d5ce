pub mod array;
pub mod codecs;
pub mod config;
pub mod error;
pub mod header;
pub mod registry;
pub mod types;

// Re-export key types at crate root for convenience.
pub use array::Array;
pub use codecs::{AnyCodec, Codec, CodecId, JpegCodec, Lz4Codec, PngCodec, RawCodec, ZstdCodec};
pub use config::CodecConfig;
pub use error::{CodecError, CodecResult};
pub use registry::{CodecConstructor, CodecRegistry};
pub use types::{DataType, Element};
