use image::codecs::jpeg::JpegEncoder;
use image::{ImageEncoder, ImageFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::array::Array;
use crate::codecs::raster::{decode_images, encode_images, Frame};
use crate::codecs::Codec;
use crate::config::{build_config, parse_params, CodecConfig};
use crate::error::{CodecError, CodecResult};
use crate::types::DataType;

pub const JPEG_ID: &str = "jpeg";

const JPEG_DTYPES: [DataType; 1] = [DataType::UInt8];

/// Lossy image codec for `uint8` arrays, with the same layouts and
/// `single_channel` semantics as [`PngCodec`](crate::codecs::PngCodec).
///
/// Constant-valued images decode to the identical constant; other content
/// is subject to JPEG quantization at the configured `quality`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JpegCodec {
    #[serde(default = "default_single_channel")]
    single_channel: bool,
    #[serde(default = "default_quality")]
    quality: u8,
}

fn default_single_channel() -> bool {
    true
}

fn default_quality() -> u8 {
    75
}

impl Default for JpegCodec {
    fn default() -> Self {
        Self::new(default_single_channel())
    }
}

impl JpegCodec {
    pub fn new(single_channel: bool) -> Self {
        Self {
            single_channel,
            quality: default_quality(),
        }
    }

    /// Quality must be within `1..=100`.
    pub fn with_quality(self, quality: u8) -> CodecResult<Self> {
        let codec = Self { quality, ..self };
        codec.validate()?;
        Ok(codec)
    }

    pub fn single_channel(&self) -> bool {
        self.single_channel
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    fn validate(&self) -> CodecResult<()> {
        if !(1..=100).contains(&self.quality) {
            return Err(CodecError::InvalidParameter(format!(
                "jpeg quality must be within 1..=100, got {}",
                self.quality
            )));
        }
        Ok(())
    }

    /// SOI followed by the first marker.
    fn is_jpeg(data: &[u8]) -> bool {
        matches!(data, [0xFF, 0xD8, 0xFF, marker, ..] if *marker >= 0xC0)
    }

    fn encode_frame(&self, frame: &Frame<'_>) -> CodecResult<Vec<u8>> {
        let color = frame.color_type()?;
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.quality)
            .write_image(frame.pixels, frame.width, frame.height, color)
            .map_err(|e| CodecError::Encode(format!("JPEG encode failed: {e}")))?;
        Ok(out)
    }
}

impl Codec for JpegCodec {
    fn id(&self) -> &'static str {
        JPEG_ID
    }

    fn encode(&self, array: &Array) -> CodecResult<Vec<u8>> {
        encode_images(JPEG_ID, array, self.single_channel, &JPEG_DTYPES, |frame| {
            self.encode_frame(frame)
        })
    }

    fn decode(&self, data: &[u8]) -> CodecResult<Array> {
        decode_images(JPEG_ID, data, self.single_channel, ImageFormat::Jpeg, Self::is_jpeg)
    }

    fn get_config(&self) -> CodecConfig {
        build_config(
            JPEG_ID,
            &[
                ("single_channel", Value::from(self.single_channel)),
                ("quality", Value::from(self.quality)),
            ],
        )
    }

    fn from_config(config: &CodecConfig) -> CodecResult<Self> {
        let codec: Self = parse_params(JPEG_ID, config)?;
        codec.validate()?;
        Ok(codec)
    }
}
