use byteorder::{ByteOrder, LittleEndian};
use half::f16;
use num_complex::Complex;

use crate::error::{CodecError, CodecResult};

// ---------------------------------------------------------------------------
// DataType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float16,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

pub const ALL_DATA_TYPES: [DataType; 14] = [
    DataType::Bool,
    DataType::Int8,
    DataType::Int16,
    DataType::Int32,
    DataType::Int64,
    DataType::UInt8,
    DataType::UInt16,
    DataType::UInt32,
    DataType::UInt64,
    DataType::Float16,
    DataType::Float32,
    DataType::Float64,
    DataType::Complex64,
    DataType::Complex128,
];

impl DataType {
    /// Number of bytes per element.
    pub fn byte_size(&self) -> usize {
        match self {
            DataType::Bool => 1,
            DataType::Int8 => 1,
            DataType::Int16 => 2,
            DataType::Int32 => 4,
            DataType::Int64 => 8,
            DataType::UInt8 => 1,
            DataType::UInt16 => 2,
            DataType::UInt32 => 4,
            DataType::UInt64 => 8,
            DataType::Float16 => 2,
            DataType::Float32 => 4,
            DataType::Float64 => 8,
            DataType::Complex64 => 8,
            DataType::Complex128 => 16,
        }
    }

    /// Stable one-byte tag written into generic codec headers.
    /// Tags are append-only: never renumber an existing variant.
    pub fn tag(&self) -> u8 {
        match self {
            DataType::Bool => 0,
            DataType::Int8 => 1,
            DataType::Int16 => 2,
            DataType::Int32 => 3,
            DataType::Int64 => 4,
            DataType::UInt8 => 5,
            DataType::UInt16 => 6,
            DataType::UInt32 => 7,
            DataType::UInt64 => 8,
            DataType::Float16 => 9,
            DataType::Float32 => 10,
            DataType::Float64 => 11,
            DataType::Complex64 => 12,
            DataType::Complex128 => 13,
        }
    }

    pub fn from_tag(tag: u8) -> Option<DataType> {
        ALL_DATA_TYPES.iter().copied().find(|dt| dt.tag() == tag)
    }

    /// numpy-style name, e.g. `"uint8"` or `"float16"`.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Bool => "bool",
            DataType::Int8 => "int8",
            DataType::Int16 => "int16",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::UInt8 => "uint8",
            DataType::UInt16 => "uint16",
            DataType::UInt32 => "uint32",
            DataType::UInt64 => "uint64",
            DataType::Float16 => "float16",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Complex64 => "complex64",
            DataType::Complex128 => "complex128",
        }
    }

    pub fn from_name(name: &str) -> Option<DataType> {
        let lowered = name.to_lowercase();
        ALL_DATA_TYPES
            .iter()
            .copied()
            .find(|dt| dt.name() == lowered)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl serde::Serialize for DataType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> serde::Deserialize<'de> for DataType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DataType::from_name(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("Unknown data type: {s}")))
    }
}

// ---------------------------------------------------------------------------
// Element  (typed view of little-endian element bytes)
// ---------------------------------------------------------------------------

/// A Rust scalar type that maps one-to-one onto a [`DataType`].
///
/// `read_le` / `write_le` operate on exactly `DATA_TYPE.byte_size()` bytes.
pub trait Element: Copy + Send + Sync + 'static {
    const DATA_TYPE: DataType;

    fn read_le(buf: &[u8]) -> Self;

    fn write_le(self, buf: &mut [u8]);
}

macro_rules! impl_element {
    ($ty:ty, $dtype:expr, $read:ident, $write:ident) => {
        impl Element for $ty {
            const DATA_TYPE: DataType = $dtype;

            fn read_le(buf: &[u8]) -> Self {
                LittleEndian::$read(buf)
            }

            fn write_le(self, buf: &mut [u8]) {
                LittleEndian::$write(buf, self)
            }
        }
    };
}

impl_element!(i16, DataType::Int16, read_i16, write_i16);
impl_element!(i32, DataType::Int32, read_i32, write_i32);
impl_element!(i64, DataType::Int64, read_i64, write_i64);
impl_element!(u16, DataType::UInt16, read_u16, write_u16);
impl_element!(u32, DataType::UInt32, read_u32, write_u32);
impl_element!(u64, DataType::UInt64, read_u64, write_u64);
impl_element!(f32, DataType::Float32, read_f32, write_f32);
impl_element!(f64, DataType::Float64, read_f64, write_f64);

impl Element for bool {
    const DATA_TYPE: DataType = DataType::Bool;

    fn read_le(buf: &[u8]) -> Self {
        buf[0] != 0
    }

    fn write_le(self, buf: &mut [u8]) {
        buf[0] = self as u8;
    }
}

impl Element for i8 {
    const DATA_TYPE: DataType = DataType::Int8;

    fn read_le(buf: &[u8]) -> Self {
        buf[0] as i8
    }

    fn write_le(self, buf: &mut [u8]) {
        buf[0] = self as u8;
    }
}

impl Element for u8 {
    const DATA_TYPE: DataType = DataType::UInt8;

    fn read_le(buf: &[u8]) -> Self {
        buf[0]
    }

    fn write_le(self, buf: &mut [u8]) {
        buf[0] = self;
    }
}

impl Element for f16 {
    const DATA_TYPE: DataType = DataType::Float16;

    fn read_le(buf: &[u8]) -> Self {
        f16::from_bits(LittleEndian::read_u16(buf))
    }

    fn write_le(self, buf: &mut [u8]) {
        LittleEndian::write_u16(buf, self.to_bits())
    }
}

impl Element for Complex<f32> {
    const DATA_TYPE: DataType = DataType::Complex64;

    fn read_le(buf: &[u8]) -> Self {
        Complex::new(LittleEndian::read_f32(&buf[..4]), LittleEndian::read_f32(&buf[4..8]))
    }

    fn write_le(self, buf: &mut [u8]) {
        LittleEndian::write_f32(&mut buf[..4], self.re);
        LittleEndian::write_f32(&mut buf[4..8], self.im);
    }
}

impl Element for Complex<f64> {
    const DATA_TYPE: DataType = DataType::Complex128;

    fn read_le(buf: &[u8]) -> Self {
        Complex::new(LittleEndian::read_f64(&buf[..8]), LittleEndian::read_f64(&buf[8..16]))
    }

    fn write_le(self, buf: &mut [u8]) {
        LittleEndian::write_f64(&mut buf[..8], self.re);
        LittleEndian::write_f64(&mut buf[8..16], self.im);
    }
}

// ---------------------------------------------------------------------------
// Raw bytes <-> typed vector
// ---------------------------------------------------------------------------

/// Serialize a slice of elements into little-endian bytes.
pub fn elements_to_bytes<T: Element>(values: &[T]) -> Vec<u8> {
    let size = T::DATA_TYPE.byte_size();
    let mut out = vec![0u8; values.len() * size];
    for (chunk, value) in out.chunks_exact_mut(size).zip(values) {
        value.write_le(chunk);
    }
    out
}

/// Interpret little-endian bytes as a vector of `T`.
pub fn bytes_to_elements<T: Element>(data: &[u8]) -> CodecResult<Vec<T>> {
    let size = T::DATA_TYPE.byte_size();
    if data.len() % size != 0 {
        return Err(CodecError::InvalidArray(format!(
            "{} bytes is not a whole number of {} elements",
            data.len(),
            T::DATA_TYPE
        )));
    }
    Ok(data.chunks_exact(size).map(T::read_le).collect())
}
