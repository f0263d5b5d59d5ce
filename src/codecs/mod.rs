pub mod jpeg;
pub mod lz4;
pub mod png;
mod raster;
pub mod raw;
pub mod zstd;

use crate::array::Array;
use crate::config::{config_id, CodecConfig};
use crate::error::{CodecError, CodecResult};

pub use self::jpeg::JpegCodec;
pub use self::lz4::Lz4Codec;
pub use self::png::PngCodec;
pub use self::raw::RawCodec;
pub use self::zstd::ZstdCodec;

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Bidirectional transform between an [`Array`] and a byte blob.
///
/// Implementations hold only immutable parameters, so one instance can be
/// shared across threads and called concurrently.
pub trait Codec: Send + Sync {
    /// Codec id stored under `"id"` in the configuration descriptor.
    fn id(&self) -> &'static str;

    fn encode(&self, array: &Array) -> CodecResult<Vec<u8>>;

    fn decode(&self, data: &[u8]) -> CodecResult<Array>;

    /// Descriptor holding `"id"` and the current value of every parameter.
    fn get_config(&self) -> CodecConfig;

    /// Rebuild a codec from a descriptor produced by [`Codec::get_config`].
    fn from_config(config: &CodecConfig) -> CodecResult<Self>
    where
        Self: Sized;
}

// ---------------------------------------------------------------------------
// CodecId
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecId {
    Raw,
    Lz4,
    Zstd,
    Png,
    Jpeg,
}

impl CodecId {
    pub const ALL: [CodecId; 5] = [
        CodecId::Raw,
        CodecId::Lz4,
        CodecId::Zstd,
        CodecId::Png,
        CodecId::Jpeg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodecId::Raw => raw::RAW_ID,
            CodecId::Lz4 => lz4::LZ4_ID,
            CodecId::Zstd => zstd::ZSTD_ID,
            CodecId::Png => png::PNG_ID,
            CodecId::Jpeg => jpeg::JPEG_ID,
        }
    }

    /// Map an id string to its [`CodecId`].
    pub fn lookup(name: &str) -> Option<CodecId> {
        CodecId::ALL.into_iter().find(|id| id.as_str() == name)
    }
}

impl std::fmt::Display for CodecId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AnyCodec  (enum dispatch, no Box<dyn>)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum AnyCodec {
    Raw(RawCodec),
    Lz4(Lz4Codec),
    Zstd(ZstdCodec),
    Png(PngCodec),
    Jpeg(JpegCodec),
}

impl AnyCodec {
    pub fn codec_id(&self) -> CodecId {
        match self {
            AnyCodec::Raw(_) => CodecId::Raw,
            AnyCodec::Lz4(_) => CodecId::Lz4,
            AnyCodec::Zstd(_) => CodecId::Zstd,
            AnyCodec::Png(_) => CodecId::Png,
            AnyCodec::Jpeg(_) => CodecId::Jpeg,
        }
    }
}

impl Codec for AnyCodec {
    fn id(&self) -> &'static str {
        self.codec_id().as_str()
    }

    fn encode(&self, array: &Array) -> CodecResult<Vec<u8>> {
        match self {
            AnyCodec::Raw(c) => c.encode(array),
            AnyCodec::Lz4(c) => c.encode(array),
            AnyCodec::Zstd(c) => c.encode(array),
            AnyCodec::Png(c) => c.encode(array),
            AnyCodec::Jpeg(c) => c.encode(array),
        }
    }

    fn decode(&self, data: &[u8]) -> CodecResult<Array> {
        match self {
            AnyCodec::Raw(c) => c.decode(data),
            AnyCodec::Lz4(c) => c.decode(data),
            AnyCodec::Zstd(c) => c.decode(data),
            AnyCodec::Png(c) => c.decode(data),
            AnyCodec::Jpeg(c) => c.decode(data),
        }
    }

    fn get_config(&self) -> CodecConfig {
        match self {
            AnyCodec::Raw(c) => c.get_config(),
            AnyCodec::Lz4(c) => c.get_config(),
            AnyCodec::Zstd(c) => c.get_config(),
            AnyCodec::Png(c) => c.get_config(),
            AnyCodec::Jpeg(c) => c.get_config(),
        }
    }

    /// Build any built-in codec from its descriptor. Use
    /// [`CodecRegistry`](crate::registry::CodecRegistry) to restrict or
    /// extend the set of accepted ids.
    fn from_config(config: &CodecConfig) -> CodecResult<Self> {
        let id = config_id(config)?;
        match CodecId::lookup(id) {
            Some(CodecId::Raw) => RawCodec::from_config(config).map(AnyCodec::Raw),
            Some(CodecId::Lz4) => Lz4Codec::from_config(config).map(AnyCodec::Lz4),
            Some(CodecId::Zstd) => ZstdCodec::from_config(config).map(AnyCodec::Zstd),
            Some(CodecId::Png) => PngCodec::from_config(config).map(AnyCodec::Png),
            Some(CodecId::Jpeg) => JpegCodec::from_config(config).map(AnyCodec::Jpeg),
            None => Err(CodecError::UnknownCodecId(id.to_string())),
        }
    }
}

impl From<RawCodec> for AnyCodec {
    fn from(c: RawCodec) -> Self {
        AnyCodec::Raw(c)
    }
}

impl From<Lz4Codec> for AnyCodec {
    fn from(c: Lz4Codec) -> Self {
        AnyCodec::Lz4(c)
    }
}

impl From<ZstdCodec> for AnyCodec {
    fn from(c: ZstdCodec) -> Self {
        AnyCodec::Zstd(c)
    }
}

impl From<PngCodec> for AnyCodec {
    fn from(c: PngCodec) -> Self {
        AnyCodec::Png(c)
    }
}

impl From<JpegCodec> for AnyCodec {
    fn from(c: JpegCodec) -> Self {
        AnyCodec::Jpeg(c)
    }
}
