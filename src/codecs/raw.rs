use serde::{Deserialize, Serialize};

use crate::array::Array;
use crate::codecs::Codec;
use crate::config::{build_config, parse_params, CodecConfig};
use crate::error::{CodecError, CodecResult};
use crate::header::{decode_framed, encode_framed};

pub const RAW_ID: &str = "raw";

/// Raw codec: header followed by the element bytes, uncompressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCodec {}

impl RawCodec {
    pub fn new() -> Self {
        Self {}
    }
}

impl Codec for RawCodec {
    fn id(&self) -> &'static str {
        RAW_ID
    }

    fn encode(&self, array: &Array) -> CodecResult<Vec<u8>> {
        encode_framed(RAW_ID, array, |raw| Ok(raw.to_vec()))
    }

    fn decode(&self, data: &[u8]) -> CodecResult<Array> {
        decode_framed(RAW_ID, data, |payload, expected| {
            if payload.len() != expected {
                return Err(CodecError::CorruptPayload(format!(
                    "Raw payload holds {} bytes, header declares {expected}",
                    payload.len()
                )));
            }
            Ok(payload.to_vec())
        })
    }

    fn get_config(&self) -> CodecConfig {
        build_config(RAW_ID, &[])
    }

    fn from_config(config: &CodecConfig) -> CodecResult<Self> {
        parse_params(RAW_ID, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    #[test]
    fn test_blob_is_header_plus_data() {
        let array = Array::from_vec(vec![3], vec![1u8, 2, 3]).unwrap();
        let blob = RawCodec::new().encode(&array).unwrap();
        assert_eq!(blob.len(), 3 + 8 + 3);
        assert_eq!(&blob[blob.len() - 3..], &[1, 2, 3]);
    }

    #[test]
    fn test_empty_array_round_trip() {
        let array = Array::zeros(vec![0, 4], DataType::Float64).unwrap();
        let codec = RawCodec::new();
        let decoded = codec.decode(&codec.encode(&array).unwrap()).unwrap();
        assert_eq!(decoded.shape(), &[0, 4]);
        assert_eq!(decoded.dtype(), DataType::Float64);
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_trailing_garbage_is_corrupt() {
        let array = Array::from_vec(vec![2], vec![5u16, 6]).unwrap();
        let codec = RawCodec::new();
        let mut blob = codec.encode(&array).unwrap();
        blob.push(0);
        assert!(matches!(codec.decode(&blob), Err(CodecError::CorruptPayload(_))));
        blob.truncate(blob.len() - 2);
        assert!(matches!(codec.decode(&blob), Err(CodecError::CorruptPayload(_))));
    }

    #[test]
    fn test_config() {
        let config = RawCodec::new().get_config();
        assert_eq!(config.len(), 1);
        assert_eq!(config["id"], "raw");
        assert_eq!(RawCodec::from_config(&config).unwrap(), RawCodec::new());
    }
}
