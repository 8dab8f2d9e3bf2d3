//! Pixel element types a stack can hold

use crate::types::DataType;
use num_traits::{Bounded, NumCast};
use std::fmt;

/// Numeric element stored in a tile volume.
///
/// The pixel type of a stack is fixed when the stack is built; raw tiles of
/// any [`DataType`] are converted into it at ingestion.
pub trait Pixel:
    Copy + Default + PartialEq + PartialOrd + fmt::Debug + NumCast + Bounded + Send + Sync + 'static
{
    /// Data type tag for this element
    const DATA_TYPE: DataType;

    /// Decode one element from exactly `DATA_TYPE.size_in_bytes()` little-endian bytes
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// Append the little-endian encoding of this element
    fn extend_le_bytes(self, out: &mut Vec<u8>);
}

macro_rules! impl_pixel {
    ($($ty:ty => $data_type:expr),* $(,)?) => {
        $(
            impl Pixel for $ty {
                const DATA_TYPE: DataType = $data_type;

                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    buf.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(buf)
                }

                fn extend_le_bytes(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_pixel! {
    u8 => DataType::U8,
    u16 => DataType::U16,
    u32 => DataType::U32,
    u64 => DataType::U64,
    i8 => DataType::I8,
    i16 => DataType::I16,
    i32 => DataType::I32,
    i64 => DataType::I64,
    f32 => DataType::F32,
    f64 => DataType::F64,
}
