use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::array::Array;
use crate::codecs::Codec;
use crate::config::{build_config, parse_params, CodecConfig};
use crate::error::{CodecError, CodecResult};
use crate::header::{decode_framed, encode_framed};

pub const ZSTD_ID: &str = "zstd";

/// Zstandard codec. The payload after the array header is one zstd frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZstdCodec {
    #[serde(default = "default_level")]
    level: i32,
}

fn default_level() -> i32 {
    5
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl ZstdCodec {
    pub fn new(level: i32) -> CodecResult<Self> {
        let codec = Self { level };
        codec.validate()?;
        Ok(codec)
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    fn validate(&self) -> CodecResult<()> {
        let range = zstd::compression_level_range();
        if !range.contains(&self.level) {
            return Err(CodecError::InvalidParameter(format!(
                "zstd level must be within {}..={}, got {}",
                range.start(),
                range.end(),
                self.level
            )));
        }
        Ok(())
    }
}

impl Codec for ZstdCodec {
    fn id(&self) -> &'static str {
        ZSTD_ID
    }

    fn encode(&self, array: &Array) -> CodecResult<Vec<u8>> {
        encode_framed(ZSTD_ID, array, |raw| {
            zstd::bulk::compress(raw, self.level)
                .map_err(|e| CodecError::Encode(format!("Zstd compress failed: {e}")))
        })
    }

    fn decode(&self, data: &[u8]) -> CodecResult<Array> {
        decode_framed(ZSTD_ID, data, |payload, expected| {
            match zstd::zstd_safe::get_frame_content_size(payload) {
                Ok(Some(size)) if size != expected as u64 => {
                    return Err(CodecError::CorruptPayload(format!(
                        "Zstd frame holds {size} bytes, header declares {expected}"
                    )));
                }
                Ok(Some(_)) => {}
                // encode always records the content size
                Ok(None) => {
                    return Err(CodecError::CorruptPayload(
                        "Zstd frame does not declare its content size".into(),
                    ));
                }
                Err(_) => {
                    return Err(CodecError::CorruptPayload(
                        "Payload is not a zstd frame".into(),
                    ));
                }
            }
            // Capacity is the declared size, so an oversized frame fails
            // instead of allocating past it.
            zstd::bulk::decompress(payload, expected)
                .map_err(|e| CodecError::CorruptPayload(format!("Zstd decompress failed: {e}")))
        })
    }

    fn get_config(&self) -> CodecConfig {
        build_config(ZSTD_ID, &[("level", Value::from(self.level))])
    }

    fn from_config(config: &CodecConfig) -> CodecResult<Self> {
        let codec: Self = parse_params(ZSTD_ID, config)?;
        codec.validate()?;
        Ok(codec)
    }
}
