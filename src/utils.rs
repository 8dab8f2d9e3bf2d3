//! Utility functions

use crate::error::{Result, StackError};
use crate::pixel::Pixel;
use crate::types::DataType;
use num_traits::NumCast;

/// Encode typed pixels as little-endian bytes
pub fn encode_pixels<P: Pixel>(pixels: impl IntoIterator<Item = P>) -> Vec<u8> {
    let mut bytes = Vec::new();
    for pixel in pixels {
        pixel.extend_le_bytes(&mut bytes);
    }
    bytes
}

/// Decode little-endian bytes of `source` type into pixels of type `T`.
///
/// With `normalize` set, integer sources decoded into a float type are
/// scaled so unsigned data lands in [0, 1] and signed data in [-1, 1]:
/// non-negative samples are divided by the source maximum, negative ones
/// by the magnitude of the source minimum. Values that cannot be
/// represented in `T` are rejected rather than clamped, including float
/// samples with a fractional part (or NaN) decoded into an integer type.
pub fn decode_pixels<T: Pixel>(bytes: &[u8], source: DataType, normalize: bool) -> Result<Vec<T>> {
    if bytes.len() % source.size_in_bytes() != 0 {
        return Err(StackError::InvalidTileData(format!(
            "{} bytes is not a whole number of {} samples",
            bytes.len(),
            source
        )));
    }

    match source {
        DataType::U8 => decode_as::<u8, T>(bytes, normalize),
        DataType::U16 => decode_as::<u16, T>(bytes, normalize),
        DataType::U32 => decode_as::<u32, T>(bytes, normalize),
        DataType::U64 => decode_as::<u64, T>(bytes, normalize),
        DataType::I8 => decode_as::<i8, T>(bytes, normalize),
        DataType::I16 => decode_as::<i16, T>(bytes, normalize),
        DataType::I32 => decode_as::<i32, T>(bytes, normalize),
        DataType::I64 => decode_as::<i64, T>(bytes, normalize),
        DataType::F32 => decode_as::<f32, T>(bytes, normalize),
        DataType::F64 => decode_as::<f64, T>(bytes, normalize),
    }
}

fn decode_as<S: Pixel, T: Pixel>(bytes: &[u8], normalize: bool) -> Result<Vec<T>> {
    let scale = if normalize && S::DATA_TYPE.is_integer() && T::DATA_TYPE.is_float() {
        S::min_value().to_f64().zip(S::max_value().to_f64())
    } else {
        None
    };
    let integral_only = S::DATA_TYPE.is_float() && T::DATA_TYPE.is_integer();

    bytes
        .chunks_exact(S::DATA_TYPE.size_in_bytes())
        .map(|chunk| {
            let sample = S::from_le_slice(chunk);
            let value = match scale {
                Some((min, max)) => sample.to_f64().and_then(|v| {
                    let scaled = if v < 0.0 { v / -min } else { v / max };
                    <T as NumCast>::from(scaled)
                }),
                None if integral_only => sample
                    .to_f64()
                    .filter(|v| v.fract() == 0.0)
                    .and_then(|_| <T as NumCast>::from(sample)),
                None => <T as NumCast>::from(sample),
            };
            value.ok_or_else(|| {
                StackError::InvalidTileData(format!(
                    "{:?} ({}) is not representable as {}",
                    sample,
                    S::DATA_TYPE,
                    T::DATA_TYPE
                ))
            })
        })
        .collect()
}

/// Format byte size in human-readable form
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}
