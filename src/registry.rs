use std::collections::BTreeMap;

use crate::codecs::{AnyCodec, Codec, CodecId, JpegCodec, Lz4Codec, PngCodec, RawCodec, ZstdCodec};
use crate::config::{config_id, CodecConfig};
use crate::error::{CodecError, CodecResult};

/// Builds a codec from its full descriptor (including `"id"`).
pub type CodecConstructor = fn(&CodecConfig) -> CodecResult<AnyCodec>;

/// Maps codec ids to constructors.
///
/// Built once by the caller and handed to whatever needs to rebuild codecs
/// from stored descriptors. There is no process-wide instance.
#[derive(Debug, Clone, Default)]
pub struct CodecRegistry {
    constructors: BTreeMap<String, CodecConstructor>,
}

impl CodecRegistry {
    /// Registry with no codecs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in codec under its own id.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for id in CodecId::ALL {
            registry.register(id.as_str(), builtin_constructor(id));
        }
        registry
    }

    /// Register `constructor` under `id`, returning the one it replaces.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        constructor: CodecConstructor,
    ) -> Option<CodecConstructor> {
        let id = id.into();
        tracing::trace!(codec = %id, "registering codec");
        self.constructors.insert(id, constructor)
    }

    pub fn unregister(&mut self, id: &str) -> Option<CodecConstructor> {
        self.constructors.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.constructors.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Rebuild a codec from a descriptor produced by [`Codec::get_config`].
    pub fn from_config(&self, config: &CodecConfig) -> CodecResult<AnyCodec> {
        let id = config_id(config)?;
        let constructor = self
            .constructors
            .get(id)
            .ok_or_else(|| CodecError::UnknownCodecId(id.to_string()))?;
        let codec = constructor(config).inspect_err(|e| {
            tracing::debug!(codec = id, error = %e, "rejected codec descriptor");
        })?;
        tracing::debug!(codec = id, "built codec from descriptor");
        Ok(codec)
    }

    /// Like [`CodecRegistry::from_config`], for a descriptor held as a JSON value.
    pub fn from_json(&self, value: &serde_json::Value) -> CodecResult<AnyCodec> {
        match value {
            serde_json::Value::Object(config) => self.from_config(config),
            other => Err(CodecError::InvalidParameter(format!(
                "Codec descriptor must be a JSON object, got {other}"
            ))),
        }
    }
}

fn builtin_constructor(id: CodecId) -> CodecConstructor {
    match id {
        CodecId::Raw => |config| RawCodec::from_config(config).map(AnyCodec::Raw),
        CodecId::Lz4 => |config| Lz4Codec::from_config(config).map(AnyCodec::Lz4),
        CodecId::Zstd => |config| ZstdCodec::from_config(config).map(AnyCodec::Zstd),
        CodecId::Png => |config| PngCodec::from_config(config).map(AnyCodec::Png),
        CodecId::Jpeg => |config| JpegCodec::from_config(config).map(AnyCodec::Jpeg),
    }
}
