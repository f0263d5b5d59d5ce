use proptest::prelude::*;

use simplecodecs::header::BlobHeader;
use simplecodecs::types::ALL_DATA_TYPES;
use simplecodecs::{AnyCodec, Array, Codec, CodecError, DataType, Lz4Codec, RawCodec, ZstdCodec};

fn array_strategy() -> impl Strategy<Value = Array> {
    (
        prop::collection::vec(0usize..6, 0..4),
        prop::sample::select(ALL_DATA_TYPES.to_vec()),
    )
        .prop_flat_map(|(shape, dtype)| {
            let len = shape.iter().product::<usize>() * dtype.byte_size();
            prop::collection::vec(any::<u8>(), len).prop_map(move |bytes| {
                Array::new(shape.clone(), dtype, bytes).expect("length matches shape")
            })
        })
}

fn generic_codec_strategy() -> impl Strategy<Value = AnyCodec> {
    prop_oneof![
        Just(AnyCodec::from(RawCodec::new())),
        (1i32..=100).prop_map(|a| AnyCodec::from(Lz4Codec::new(a).expect("valid acceleration"))),
        (1i32..=19).prop_map(|l| AnyCodec::from(ZstdCodec::new(l).expect("valid level"))),
    ]
}

fn header_bytes(declared: usize) -> Vec<u8> {
    let mut blob = Vec::new();
    BlobHeader {
        dtype: DataType::UInt8,
        shape: vec![declared],
    }
    .write_to(&mut blob)
    .expect("rank 1 header");
    blob
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn generic_codecs_are_lossless(array in array_strategy(), codec in generic_codec_strategy()) {
        let blob = codec.encode(&array).unwrap();
        prop_assert_eq!(codec.decode(&blob).unwrap(), array);
    }

    #[test]
    fn raw_blob_prefixes_never_decode(array in array_strategy(), cut in any::<prop::sample::Index>()) {
        let codec = RawCodec::new();
        let blob = codec.encode(&array).unwrap();
        let cut = cut.index(blob.len());
        let err = codec.decode(&blob[..cut]).unwrap_err();
        prop_assert!(matches!(err, CodecError::CorruptPayload(_)), "{:?}", err);
    }

    #[test]
    fn arbitrary_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..256)) {
        for codec in [
            AnyCodec::from(RawCodec::new()),
            Lz4Codec::default().into(),
            ZstdCodec::default().into(),
        ] {
            let _ = codec.decode(&data);
        }
    }

    #[test]
    fn oversized_header_over_valid_lz4_block_is_corrupt(
        declared in (1usize << 20)..(1usize << 31),
        data in prop::collection::vec(any::<u8>(), 1..64),
    ) {
        let mut blob = header_bytes(declared);
        blob.extend_from_slice(&(declared as u32).to_le_bytes());
        blob.extend_from_slice(&lz4_flex::block::compress(&data));
        let err = Lz4Codec::default().decode(&blob).unwrap_err();
        prop_assert!(matches!(err, CodecError::CorruptPayload(_)), "{:?}", err);
    }

    #[test]
    fn oversized_header_over_valid_zstd_frame_is_corrupt(
        declared in (1usize << 20)..(1usize << 48),
        data in prop::collection::vec(any::<u8>(), 1..64),
    ) {
        let mut blob = header_bytes(declared);
        blob.extend_from_slice(&zstd::bulk::compress(&data, 3).unwrap());
        let err = ZstdCodec::default().decode(&blob).unwrap_err();
        prop_assert!(matches!(err, CodecError::CorruptPayload(_)), "{:?}", err);
    }
}
