use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::array::Array;
use crate::codecs::Codec;
use crate::config::{build_config, parse_params, CodecConfig};
use crate::error::{CodecError, CodecResult};
use crate::header::{decode_framed, encode_framed};

pub const LZ4_ID: &str = "lz4";

const LZ4_SIZE_PREFIX_BYTES: usize = 4;

/// Upper bound on how many output bytes one LZ4 block byte can expand to.
const LZ4_MAX_EXPANSION: usize = 255;

/// LZ4 block codec.
///
/// The payload after the array header is an LZ4 block with a 4-byte
/// little-endian uncompressed-size prefix. `acceleration` is the LZ4
/// speed/ratio knob (1 = best ratio, higher = faster with less
/// compression). Any acceleration produces blobs every `Lz4Codec` can
/// decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Lz4Codec {
    #[serde(default = "default_acceleration")]
    acceleration: i32,
}

fn default_acceleration() -> i32 {
    1
}

impl Default for Lz4Codec {
    fn default() -> Self {
        Self {
            acceleration: default_acceleration(),
        }
    }
}

impl Lz4Codec {
    pub fn new(acceleration: i32) -> CodecResult<Self> {
        let codec = Self { acceleration };
        codec.validate()?;
        Ok(codec)
    }

    pub fn acceleration(&self) -> i32 {
        self.acceleration
    }

    fn validate(&self) -> CodecResult<()> {
        if self.acceleration < 1 {
            return Err(CodecError::InvalidParameter(format!(
                "lz4 acceleration must be >= 1, got {}",
                self.acceleration
            )));
        }
        Ok(())
    }

    fn compress(&self, data: &[u8]) -> CodecResult<Vec<u8>> {
        let orig_size = u32::try_from(data.len()).map_err(|_| {
            CodecError::Encode(format!(
                "LZ4 block of {} bytes exceeds the 4 GiB size prefix",
                data.len()
            ))
        })?;
        let mode = lz4::block::CompressionMode::FAST(self.acceleration);
        let compressed = lz4::block::compress(data, Some(mode), false)
            .map_err(|e| CodecError::Encode(format!("LZ4 compress failed: {e}")))?;
        let mut out = Vec::with_capacity(LZ4_SIZE_PREFIX_BYTES + compressed.len());
        out.extend_from_slice(&orig_size.to_le_bytes());
        out.extend_from_slice(&compressed);
        tracing::trace!(
            acceleration = self.acceleration,
            raw_bytes = data.len(),
            compressed_bytes = compressed.len(),
            "lz4 block compressed"
        );
        Ok(out)
    }

    fn decompress(&self, data: &[u8], expected: usize) -> CodecResult<Vec<u8>> {
        if data.len() < LZ4_SIZE_PREFIX_BYTES {
            return Err(CodecError::CorruptPayload(
                "LZ4 payload missing 4-byte size prefix".into(),
            ));
        }

        let (prefix, payload) = data.split_at(LZ4_SIZE_PREFIX_BYTES);
        let mut size_bytes = [0u8; LZ4_SIZE_PREFIX_BYTES];
        size_bytes.copy_from_slice(prefix);
        let dest_size = u32::from_le_bytes(size_bytes) as usize;

        if dest_size != expected {
            return Err(CodecError::CorruptPayload(format!(
                "LZ4 size prefix says {dest_size} bytes, header declares {expected}"
            )));
        }

        let max_size = payload
            .len()
            .saturating_mul(LZ4_MAX_EXPANSION)
            .saturating_add(16);
        if dest_size > max_size {
            return Err(CodecError::CorruptPayload(format!(
                "LZ4 block of {} bytes cannot expand to {dest_size} bytes",
                payload.len()
            )));
        }

        lz4_flex::block::decompress(payload, dest_size)
            .map_err(|e| CodecError::CorruptPayload(format!("LZ4 decompress failed: {e}")))
    }
}

impl Codec for Lz4Codec {
    fn id(&self) -> &'static str {
        LZ4_ID
    }

    fn encode(&self, array: &Array) -> CodecResult<Vec<u8>> {
        encode_framed(LZ4_ID, array, |raw| self.compress(raw))
    }

    fn decode(&self, data: &[u8]) -> CodecResult<Array> {
        decode_framed(LZ4_ID, data, |payload, expected| {
            self.decompress(payload, expected)
        })
    }

    fn get_config(&self) -> CodecConfig {
        build_config(LZ4_ID, &[("acceleration", Value::from(self.acceleration))])
    }

    fn from_config(config: &CodecConfig) -> CodecResult<Self> {
        let codec: Self = parse_params(LZ4_ID, config)?;
        codec.validate()?;
        Ok(codec)
    }
}
