//! Array <-> image mapping shared by the png and jpeg codecs.
//!
//! A single image is stored as a bare image container. A batch is stored as
//! `[u32 LE slice length][slice bytes]` per image, in batch order.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use image::{ColorType, ExtendedColorType, ImageFormat};
use std::borrow::Cow;

use crate::array::Array;
use crate::error::{CodecError, CodecResult};
use crate::types::{bytes_to_elements, elements_to_bytes, DataType};

fn is_channel_axis(channels: usize) -> bool {
    channels == 1 || channels == 3
}

// ---------------------------------------------------------------------------
// ImageLayout
// ---------------------------------------------------------------------------

/// How an array maps onto one or more 2-D images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ImageLayout {
    pub batch: Option<usize>,
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl ImageLayout {
    /// A trailing axis of 1 or 3 is always a channel axis. A rank-3 array
    /// with any other trailing axis is a grayscale batch `(N, H, W)`, which
    /// only codecs without `single_channel` accept.
    pub fn classify(shape: &[usize], single_channel: bool) -> CodecResult<Self> {
        let layout = match *shape {
            [height, width] => Self {
                batch: None,
                height,
                width,
                channels: 1,
            },
            [height, width, channels] if is_channel_axis(channels) => Self {
                batch: None,
                height,
                width,
                channels,
            },
            [n, height, width] if !single_channel => Self {
                batch: Some(n),
                height,
                width,
                channels: 1,
            },
            [n, height, width, channels] if is_channel_axis(channels) => Self {
                batch: Some(n),
                height,
                width,
                channels,
            },
            _ => {
                return Err(CodecError::UnsupportedLayout(format!(
                    "Shape {shape:?} is not an image layout: expected (H, W), (H, W, C), \
                     (N, H, W) or (N, H, W, C) with C in {{1, 3}}"
                )));
            }
        };

        if layout.height == 0 || layout.width == 0 || layout.batch == Some(0) {
            return Err(CodecError::UnsupportedLayout(format!(
                "Shape {shape:?} contains no pixels"
            )));
        }
        if u32::try_from(layout.height).is_err() || u32::try_from(layout.width).is_err() {
            return Err(CodecError::UnsupportedLayout(format!(
                "Image {}x{} exceeds u32 dimensions",
                layout.width, layout.height
            )));
        }
        Ok(layout)
    }

    fn image_count(&self) -> usize {
        self.batch.unwrap_or(1)
    }

    /// Shape of the decoded array. Grayscale images keep a trailing size-1
    /// axis only when `single_channel` is set.
    fn shape(&self, single_channel: bool) -> Vec<usize> {
        let mut shape = Vec::with_capacity(4);
        if let Some(n) = self.batch {
            shape.push(n);
        }
        shape.push(self.height);
        shape.push(self.width);
        if self.channels != 1 || single_channel {
            shape.push(self.channels);
        }
        shape
    }

    fn frame<'a>(&self, pixels: &'a [u8], dtype: DataType) -> Frame<'a> {
        Frame {
            pixels,
            width: self.width as u32,
            height: self.height as u32,
            channels: self.channels,
            dtype,
        }
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One image cut out of an array. `pixels` holds little-endian samples,
/// row-major, channels interleaved.
pub(crate) struct Frame<'a> {
    pub pixels: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    pub dtype: DataType,
}

impl Frame<'_> {
    pub fn color_type(&self) -> CodecResult<ExtendedColorType> {
        match (self.channels, self.dtype) {
            (1, DataType::UInt8) => Ok(ExtendedColorType::L8),
            (3, DataType::UInt8) => Ok(ExtendedColorType::Rgb8),
            (1, DataType::UInt16) => Ok(ExtendedColorType::L16),
            (3, DataType::UInt16) => Ok(ExtendedColorType::Rgb16),
            (channels, dtype) => Err(CodecError::UnsupportedLayout(format!(
                "No image color type for {channels} channel(s) of {dtype}"
            ))),
        }
    }

    /// Samples in the byte order the image encoders expect (native endian).
    pub fn native_pixels(&self) -> CodecResult<Cow<'_, [u8]>> {
        match self.dtype {
            DataType::UInt16 => {
                let samples = bytes_to_elements::<u16>(self.pixels)?;
                Ok(Cow::Owned(
                    samples.iter().flat_map(|s| s.to_ne_bytes()).collect(),
                ))
            }
            _ => Ok(Cow::Borrowed(self.pixels)),
        }
    }
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

pub(crate) fn encode_images<F>(
    codec_id: &str,
    array: &Array,
    single_channel: bool,
    supported: &[DataType],
    encode_one: F,
) -> CodecResult<Vec<u8>>
where
    F: Fn(&Frame<'_>) -> CodecResult<Vec<u8>>,
{
    if !supported.contains(&array.dtype()) {
        return Err(CodecError::UnsupportedLayout(format!(
            "{codec_id} cannot store {} elements",
            array.dtype()
        )));
    }
    let layout = ImageLayout::classify(array.shape(), single_channel)?;

    let out = match layout.batch {
        None => encode_one(&layout.frame(array.data(), array.dtype()))?,
        Some(_) => {
            let frame_bytes = array.data().len() / layout.image_count();
            let mut out = Vec::new();
            for pixels in array.data().chunks_exact(frame_bytes) {
                let blob = encode_one(&layout.frame(pixels, array.dtype()))?;
                write_slice(&mut out, &blob)?;
            }
            out
        }
    };

    tracing::debug!(
        codec = codec_id,
        shape = ?array.shape(),
        images = layout.image_count(),
        encoded_bytes = out.len(),
        "encoded image array"
    );
    Ok(out)
}

fn write_slice(out: &mut Vec<u8>, blob: &[u8]) -> CodecResult<()> {
    let len = u32::try_from(blob.len()).map_err(|_| {
        CodecError::Encode(format!("Encoded image of {} bytes exceeds 4 GiB", blob.len()))
    })?;
    out.write_u32::<LittleEndian>(len)
        .map_err(|e| CodecError::Encode(format!("Slice length write failed: {e}")))?;
    out.extend_from_slice(blob);
    Ok(())
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

struct DecodedImage {
    width: usize,
    height: usize,
    channels: usize,
    dtype: DataType,
    pixels: Vec<u8>,
}

/// Decode a blob written by [`encode_images`]. `is_single` recognizes a
/// bare image container; anything else is parsed as a batch.
pub(crate) fn decode_images(
    codec_id: &str,
    data: &[u8],
    single_channel: bool,
    format: ImageFormat,
    is_single: fn(&[u8]) -> bool,
) -> CodecResult<Array> {
    let (batch, images) = if is_single(data) {
        (None, vec![decode_one(data, format)?])
    } else {
        let slices = split_slices(data)?;
        let images = slices
            .iter()
            .map(|slice| decode_one(slice, format))
            .collect::<CodecResult<Vec<_>>>()?;
        (Some(images.len()), images)
    };

    let first = &images[0];
    let layout = ImageLayout {
        batch,
        height: first.height,
        width: first.width,
        channels: first.channels,
    };
    let dtype = first.dtype;
    if let Some(index) = images.iter().position(|img| {
        img.width != layout.width
            || img.height != layout.height
            || img.channels != layout.channels
            || img.dtype != dtype
    }) {
        return Err(CodecError::CorruptPayload(format!(
            "Batch slice {index} does not match the first slice's dimensions"
        )));
    }

    let mut pixels = Vec::with_capacity(first.pixels.len() * images.len());
    for img in images {
        pixels.extend_from_slice(&img.pixels);
    }
    let shape = layout.shape(single_channel);
    tracing::debug!(
        codec = codec_id,
        shape = ?shape,
        dtype = %dtype,
        encoded_bytes = data.len(),
        "decoded image array"
    );
    Array::new(shape, dtype, pixels).map_err(|e| CodecError::CorruptPayload(e.to_string()))
}

fn split_slices(data: &[u8]) -> CodecResult<Vec<&[u8]>> {
    let mut slices = Vec::new();
    let mut rest = data;
    while !rest.is_empty() {
        let len = rest.read_u32::<LittleEndian>().map_err(|_| {
            CodecError::CorruptPayload("Truncated batch slice length".into())
        })? as usize;
        if rest.len() < len {
            return Err(CodecError::CorruptPayload(format!(
                "Batch slice declares {len} bytes, {} remain",
                rest.len()
            )));
        }
        let (slice, tail) = rest.split_at(len);
        slices.push(slice);
        rest = tail;
    }
    if slices.is_empty() {
        return Err(CodecError::CorruptPayload("Empty image blob".into()));
    }
    Ok(slices)
}

fn decode_one(data: &[u8], format: ImageFormat) -> CodecResult<DecodedImage> {
    let decoded = image::load_from_memory_with_format(data, format)
        .map_err(|e| CodecError::CorruptPayload(format!("{format:?} decode failed: {e}")))?;
    let width = decoded.width() as usize;
    let height = decoded.height() as usize;
    let (channels, dtype, pixels) = match decoded.color() {
        ColorType::L8 => (1, DataType::UInt8, decoded.into_luma8().into_raw()),
        ColorType::Rgb8 => (3, DataType::UInt8, decoded.into_rgb8().into_raw()),
        ColorType::L16 => (
            1,
            DataType::UInt16,
            elements_to_bytes(&decoded.into_luma16().into_raw()),
        ),
        ColorType::Rgb16 => (
            3,
            DataType::UInt16,
            elements_to_bytes(&decoded.into_rgb16().into_raw()),
        ),
        other => {
            return Err(CodecError::CorruptPayload(format!(
                "Unsupported decoded color type {other:?}"
            )));
        }
    };
    Ok(DecodedImage {
        width,
        height,
        channels,
        dtype,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_single_images() {
        let layout = ImageLayout::classify(&[30, 20], true).unwrap();
        assert_eq!((layout.batch, layout.height, layout.width, layout.channels), (None, 30, 20, 1));
        let layout = ImageLayout::classify(&[30, 20, 3], true).unwrap();
        assert_eq!(layout.channels, 3);
        let layout = ImageLayout::classify(&[30, 20, 1], false).unwrap();
        assert_eq!((layout.batch, layout.channels), (None, 1));
    }

    #[test]
    fn test_classify_batches() {
        let layout = ImageLayout::classify(&[2, 30, 30, 3], true).unwrap();
        assert_eq!(layout.batch, Some(2));
        let layout = ImageLayout::classify(&[4, 30, 30], false).unwrap();
        assert_eq!((layout.batch, layout.channels), (Some(4), 1));
        // trailing axis outside {1, 3} is the width of a grayscale batch
        let layout = ImageLayout::classify(&[30, 30, 2], false).unwrap();
        assert_eq!((layout.batch, layout.height, layout.width), (Some(30), 30, 2));
    }

    #[test]
    fn test_classify_rejects_bad_layouts() {
        for (shape, single_channel) in [
            (&[30, 30, 4][..], true),
            (&[30, 30, 2][..], true),
            (&[2, 30, 30, 2][..], false),
            (&[4, 30, 30][..], true),
            (&[2, 30, 30, 4][..], false),
            (&[30][..], false),
            (&[1, 2, 30, 30, 3][..], false),
            (&[0, 30][..], false),
            (&[0, 30, 30, 3][..], true),
        ] {
            let err = ImageLayout::classify(shape, single_channel).unwrap_err();
            assert!(
                matches!(err, CodecError::UnsupportedLayout(_)),
                "{shape:?} single_channel={single_channel}"
            );
        }
    }

    #[test]
    fn test_decoded_shape_honors_single_channel() {
        let gray = ImageLayout::classify(&[5, 6], false).unwrap();
        assert_eq!(gray.shape(false), vec![5, 6]);
        assert_eq!(gray.shape(true), vec![5, 6, 1]);
        let rgb = ImageLayout::classify(&[2, 5, 6, 3], false).unwrap();
        assert_eq!(rgb.shape(false), vec![2, 5, 6, 3]);
    }

    #[test]
    fn test_split_slices() {
        let mut blob = Vec::new();
        write_slice(&mut blob, b"abc").unwrap();
        write_slice(&mut blob, b"de").unwrap();
        let slices = split_slices(&blob).unwrap();
        assert_eq!(slices, vec![&b"abc"[..], &b"de"[..]]);

        assert!(matches!(split_slices(&[]), Err(CodecError::CorruptPayload(_))));
        assert!(matches!(split_slices(&blob[..5]), Err(CodecError::CorruptPayload(_))));
        assert!(matches!(split_slices(&blob[..2]), Err(CodecError::CorruptPayload(_))));
    }

    #[test]
    fn test_native_pixels_for_sixteen_bit() {
        let le = elements_to_bytes(&[0x0102u16, 0x0304]);
        let frame = Frame {
            pixels: &le,
            width: 2,
            height: 1,
            channels: 1,
            dtype: DataType::UInt16,
        };
        assert_eq!(frame.color_type().unwrap(), ExtendedColorType::L16);
        let native = frame.native_pixels().unwrap();
        let expected: Vec<u8> = [0x0102u16, 0x0304].iter().flat_map(|s| s.to_ne_bytes()).collect();
        assert_eq!(native.as_ref(), expected.as_slice());
    }
}
