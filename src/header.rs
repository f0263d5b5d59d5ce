//! Self-describing header shared by the generic byte codecs.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! [u8 version][u8 dtype tag][u8 rank][u64 dim] * rank [payload...]
//! ```

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

use crate::array::{checked_byte_len, Array};
use crate::error::{CodecError, CodecResult};
use crate::types::DataType;

pub const HEADER_VERSION: u8 = 1;

const FIXED_HEADER_BYTES: usize = 3;
const DIM_BYTES: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHeader {
    pub dtype: DataType,
    pub shape: Vec<usize>,
}

impl BlobHeader {
    pub fn of(array: &Array) -> Self {
        Self {
            dtype: array.dtype(),
            shape: array.shape().to_vec(),
        }
    }

    pub fn encoded_len(&self) -> usize {
        FIXED_HEADER_BYTES + DIM_BYTES * self.shape.len()
    }

    /// Byte length of the uncompressed element data this header describes.
    pub fn payload_len(&self) -> CodecResult<usize> {
        checked_byte_len(&self.shape, self.dtype).ok_or_else(|| {
            CodecError::CorruptPayload(format!(
                "Header shape {:?} overflows the address space",
                self.shape
            ))
        })
    }

    pub fn write_to(&self, out: &mut Vec<u8>) -> CodecResult<()> {
        let rank = u8::try_from(self.shape.len()).map_err(|_| {
            CodecError::Encode(format!("Rank {} exceeds the header limit of 255", self.shape.len()))
        })?;
        let io_err = |e: std::io::Error| CodecError::Encode(format!("Header write failed: {e}"));
        out.write_u8(HEADER_VERSION).map_err(io_err)?;
        out.write_u8(self.dtype.tag()).map_err(io_err)?;
        out.write_u8(rank).map_err(io_err)?;
        for &dim in &self.shape {
            out.write_u64::<LittleEndian>(dim as u64).map_err(io_err)?;
        }
        Ok(())
    }

    /// Parse a header, returning it together with the bytes that follow it.
    pub fn read_from(data: &[u8]) -> CodecResult<(Self, &[u8])> {
        let mut cursor = Cursor::new(data);
        let truncated =
            |e: std::io::Error| CodecError::CorruptPayload(format!("Truncated header: {e}"));

        let version = cursor.read_u8().map_err(truncated)?;
        if version != HEADER_VERSION {
            return Err(CodecError::CorruptPayload(format!(
                "Unsupported header version {version}"
            )));
        }

        let tag = cursor.read_u8().map_err(truncated)?;
        let dtype = DataType::from_tag(tag)
            .ok_or_else(|| CodecError::CorruptPayload(format!("Unknown dtype tag {tag}")))?;

        let rank = cursor.read_u8().map_err(truncated)? as usize;
        let mut shape = Vec::with_capacity(rank);
        for _ in 0..rank {
            let dim = cursor.read_u64::<LittleEndian>().map_err(truncated)?;
            let dim = usize::try_from(dim).map_err(|_| {
                CodecError::CorruptPayload(format!("Dimension {dim} does not fit in usize"))
            })?;
            shape.push(dim);
        }

        let consumed = cursor.position() as usize;
        Ok((Self { dtype, shape }, &data[consumed..]))
    }
}

// ---------------------------------------------------------------------------
// Framing shared by raw / lz4 / zstd
// ---------------------------------------------------------------------------

/// Write `header + deflate(element bytes)`.
pub(crate) fn encode_framed<F>(codec_id: &str, array: &Array, deflate: F) -> CodecResult<Vec<u8>>
where
    F: FnOnce(&[u8]) -> CodecResult<Vec<u8>>,
{
    let header = BlobHeader::of(array);
    let payload = deflate(array.data())?;
    let mut out = Vec::with_capacity(header.encoded_len() + payload.len());
    header.write_to(&mut out)?;
    out.extend_from_slice(&payload);
    tracing::debug!(
        codec = codec_id,
        shape = ?array.shape(),
        dtype = %array.dtype(),
        raw_bytes = array.data().len(),
        encoded_bytes = out.len(),
        "encoded array"
    );
    Ok(out)
}

/// Parse the header, `inflate` the payload to the declared size, and
/// rebuild the array. `inflate` receives the payload and the exact number
/// of bytes the header declares.
pub(crate) fn decode_framed<F>(codec_id: &str, data: &[u8], inflate: F) -> CodecResult<Array>
where
    F: FnOnce(&[u8], usize) -> CodecResult<Vec<u8>>,
{
    let (header, payload) = BlobHeader::read_from(data).inspect_err(|e| {
        tracing::debug!(codec = codec_id, blob_bytes = data.len(), error = %e, "rejected blob header");
    })?;
    let expected = header.payload_len()?;
    let raw = inflate(payload, expected)?;
    if raw.len() != expected {
        tracing::debug!(
            codec = codec_id,
            expected,
            actual = raw.len(),
            "decoded payload length mismatch"
        );
        return Err(CodecError::CorruptPayload(format!(
            "Header declares {expected} bytes, payload holds {}",
            raw.len()
        )));
    }
    tracing::debug!(
        codec = codec_id,
        shape = ?header.shape,
        dtype = %header.dtype,
        encoded_bytes = data.len(),
        "decoded array"
    );
    Array::new(header.shape, header.dtype, raw)
        .map_err(|e| CodecError::CorruptPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_passes_declared_size_to_inflate() {
        let array = Array::from_vec(vec![2, 2], vec![1u16, 2, 3, 4]).unwrap();
        let blob = encode_framed("test", &array, |raw| Ok(raw.to_vec())).unwrap();
        let decoded = decode_framed("test", &blob, |payload, expected| {
            assert_eq!(expected, 8);
            Ok(payload.to_vec())
        })
        .unwrap();
        assert_eq!(decoded, array);
    }

    #[test]
    fn test_framing_rejects_short_inflate() {
        let array = Array::from_vec(vec![3], vec![1u8, 2, 3]).unwrap();
        let blob = encode_framed("test", &array, |raw| Ok(raw.to_vec())).unwrap();
        let err = decode_framed("test", &blob, |payload, _| Ok(payload[..2].to_vec())).unwrap_err();
        assert!(matches!(err, CodecError::CorruptPayload(_)));
    }

    #[test]
    fn test_header_layout() {
        let header = BlobHeader {
            dtype: DataType::UInt16,
            shape: vec![2, 3],
        };
        let mut out = Vec::new();
        header.write_to(&mut out).unwrap();
        assert_eq!(out.len(), header.encoded_len());
        assert_eq!(&out[..3], &[HEADER_VERSION, DataType::UInt16.tag(), 2]);
        assert_eq!(&out[3..11], &2u64.to_le_bytes());
        assert_eq!(&out[11..19], &3u64.to_le_bytes());
    }

    #[test]
    fn test_read_returns_trailing_payload() {
        let header = BlobHeader {
            dtype: DataType::Float32,
            shape: vec![1],
        };
        let mut out = Vec::new();
        header.write_to(&mut out).unwrap();
        out.extend_from_slice(&[9, 9, 9, 9]);
        let (parsed, rest) = BlobHeader::read_from(&out).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(rest, &[9, 9, 9, 9]);
        assert_eq!(parsed.payload_len().unwrap(), 4);
    }

    #[test]
    fn test_rejects_bad_version_and_tag() {
        let err = BlobHeader::read_from(&[7, 0, 0]).unwrap_err();
        assert!(matches!(err, CodecError::CorruptPayload(_)));
        let err = BlobHeader::read_from(&[HEADER_VERSION, 99, 0]).unwrap_err();
        assert!(matches!(err, CodecError::CorruptPayload(_)));
    }

    #[test]
    fn test_rejects_truncated_dims() {
        let err = BlobHeader::read_from(&[HEADER_VERSION, 5, 2, 1, 0, 0]).unwrap_err();
        assert!(matches!(err, CodecError::CorruptPayload(_)));
        assert!(BlobHeader::read_from(&[]).is_err());
    }

    #[test]
    fn test_overflowing_shape_is_corrupt() {
        let header = BlobHeader {
            dtype: DataType::Float64,
            shape: vec![usize::MAX, usize::MAX],
        };
        assert!(matches!(
            header.payload_len(),
            Err(CodecError::CorruptPayload(_))
        ));
    }
}
