use image::codecs::png::PngEncoder;
use image::{ImageEncoder, ImageFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::array::Array;
use crate::codecs::raster::{decode_images, encode_images, Frame};
use crate::codecs::Codec;
use crate::config::{build_config, parse_params, CodecConfig};
use crate::error::{CodecError, CodecResult};
use crate::types::DataType;

pub const PNG_ID: &str = "png";

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

const PNG_DTYPES: [DataType; 2] = [DataType::UInt8, DataType::UInt16];

/// Lossless image codec for `uint8` / `uint16` arrays of shape `(H, W)`,
/// `(H, W, C)`, `(N, H, W)` or `(N, H, W, C)` with `C` in `{1, 3}`.
///
/// With `single_channel` set, decoded grayscale images keep a trailing
/// size-1 channel axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PngCodec {
    #[serde(default = "default_single_channel")]
    single_channel: bool,
}

fn default_single_channel() -> bool {
    true
}

impl Default for PngCodec {
    fn default() -> Self {
        Self::new(default_single_channel())
    }
}

impl PngCodec {
    pub fn new(single_channel: bool) -> Self {
        Self { single_channel }
    }

    pub fn single_channel(&self) -> bool {
        self.single_channel
    }

    fn is_png(data: &[u8]) -> bool {
        data.starts_with(&PNG_SIGNATURE)
    }

    fn encode_frame(frame: &Frame<'_>) -> CodecResult<Vec<u8>> {
        let color = frame.color_type()?;
        let pixels = frame.native_pixels()?;
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&pixels, frame.width, frame.height, color)
            .map_err(|e| CodecError::Encode(format!("PNG encode failed: {e}")))?;
        Ok(out)
    }
}

impl Codec for PngCodec {
    fn id(&self) -> &'static str {
        PNG_ID
    }

    fn encode(&self, array: &Array) -> CodecResult<Vec<u8>> {
        encode_images(PNG_ID, array, self.single_channel, &PNG_DTYPES, Self::encode_frame)
    }

    fn decode(&self, data: &[u8]) -> CodecResult<Array> {
        decode_images(PNG_ID, data, self.single_channel, ImageFormat::Png, Self::is_png)
    }

    fn get_config(&self) -> CodecConfig {
        build_config(
            PNG_ID,
            &[("single_channel", Value::from(self.single_channel))],
        )
    }

    fn from_config(config: &CodecConfig) -> CodecResult<Self> {
        parse_params(PNG_ID, config)
    }
}
