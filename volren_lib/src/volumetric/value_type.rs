/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

use std::{fmt, str::FromStr};

use byteorder::{ByteOrder, LittleEndian};

use crate::error::VolumeError;

/// Scalar type of samples stored in a file.
/// Discriminant is the tag byte of the frame format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueType {
    Int8 = 0,
    UInt8 = 1,
    Int16 = 2,
    UInt16 = 3,
    Int32 = 4,
    UInt32 = 5,
    Float32 = 6,
}

impl ValueType {
    pub const ALL: [ValueType; 7] = [
        ValueType::Int8,
        ValueType::UInt8,
        ValueType::Int16,
        ValueType::UInt16,
        ValueType::Int32,
        ValueType::UInt32,
        ValueType::Float32,
    ];

    pub fn from_tag(tag: u8) -> Result<ValueType, VolumeError> {
        ValueType::ALL
            .get(tag as usize)
            .copied()
            .ok_or(VolumeError::UnknownValueType(tag))
    }

    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Bytes per sample
    pub fn size(self) -> usize {
        match self {
            ValueType::Int8 | ValueType::UInt8 => 1,
            ValueType::Int16 | ValueType::UInt16 => 2,
            ValueType::Int32 | ValueType::UInt32 | ValueType::Float32 => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Int8 => "int8",
            ValueType::UInt8 => "uint8",
            ValueType::Int16 => "int16",
            ValueType::UInt16 => "uint16",
            ValueType::Int32 => "int32",
            ValueType::UInt32 => "uint32",
            ValueType::Float32 => "float32",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueType {
    type Err = VolumeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| VolumeError::InvalidFormat(format!("unknown value type name `{}`", s)))
    }
}

/// Typed samples, as stored in a file
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Float32(Vec<f32>),
}

impl Samples {
    /// Decode `count` little-endian samples from the start of `bytes`.
    /// Fails with [`VolumeError::Truncated`] when `bytes` is too short.
    pub fn decode(value_type: ValueType, bytes: &[u8], count: usize) -> Result<Samples, VolumeError> {
        let expected = count
            .checked_mul(value_type.size())
            .ok_or_else(|| VolumeError::InvalidFormat("sample count overflow".into()))?;
        if bytes.len() < expected {
            return Err(VolumeError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }
        let src = &bytes[..expected];

        let samples = match value_type {
            ValueType::Int8 => Samples::Int8(src.iter().map(|&b| b as i8).collect()),
            ValueType::UInt8 => Samples::UInt8(src.to_vec()),
            ValueType::Int16 => {
                let mut dst = vec![0; count];
                LittleEndian::read_i16_into(src, &mut dst);
                Samples::Int16(dst)
            }
            ValueType::UInt16 => {
                let mut dst = vec![0; count];
                LittleEndian::read_u16_into(src, &mut dst);
                Samples::UInt16(dst)
            }
            ValueType::Int32 => {
                let mut dst = vec![0; count];
                LittleEndian::read_i32_into(src, &mut dst);
                Samples::Int32(dst)
            }
            ValueType::UInt32 => {
                let mut dst = vec![0; count];
                LittleEndian::read_u32_into(src, &mut dst);
                Samples::UInt32(dst)
            }
            ValueType::Float32 => {
                let mut dst = vec![0.0; count];
                LittleEndian::read_f32_into(src, &mut dst);
                Samples::Float32(dst)
            }
        };
        Ok(samples)
    }

    /// Little-endian byte image of the samples
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![0; self.len() * self.value_type().size()];
        match self {
            Samples::Int8(v) => out
                .iter_mut()
                .zip(v)
                .for_each(|(dst, &src)| *dst = src as u8),
            Samples::UInt8(v) => out.copy_from_slice(v),
            Samples::Int16(v) => LittleEndian::write_i16_into(v, &mut out),
            Samples::UInt16(v) => LittleEndian::write_u16_into(v, &mut out),
            Samples::Int32(v) => LittleEndian::write_i32_into(v, &mut out),
            Samples::UInt32(v) => LittleEndian::write_u32_into(v, &mut out),
            Samples::Float32(v) => LittleEndian::write_f32_into(v, &mut out),
        }
        out
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Samples::Int8(_) => ValueType::Int8,
            Samples::UInt8(_) => ValueType::UInt8,
            Samples::Int16(_) => ValueType::Int16,
            Samples::UInt16(_) => ValueType::UInt16,
            Samples::Int32(_) => ValueType::Int32,
            Samples::UInt32(_) => ValueType::UInt32,
            Samples::Float32(_) => ValueType::Float32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Samples::Int8(v) => v.len(),
            Samples::UInt8(v) => v.len(),
            Samples::Int16(v) => v.len(),
            Samples::UInt16(v) => v.len(),
            Samples::Int32(v) => v.len(),
            Samples::UInt32(v) => v.len(),
            Samples::Float32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples widened to `f32`, values unchanged
    pub fn to_f32(&self) -> Vec<f32> {
        match self {
            Samples::Int8(v) => v.iter().map(|&s| s as f32).collect(),
            Samples::UInt8(v) => v.iter().map(|&s| s as f32).collect(),
            Samples::Int16(v) => v.iter().map(|&s| s as f32).collect(),
            Samples::UInt16(v) => v.iter().map(|&s| s as f32).collect(),
            Samples::Int32(v) => v.iter().map(|&s| s as f32).collect(),
            Samples::UInt32(v) => v.iter().map(|&s| s as f32).collect(),
            Samples::Float32(v) => v.clone(),
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn tags_match_names() {
        for (tag, value_type) in ValueType::ALL.iter().enumerate() {
            assert_eq!(ValueType::from_tag(tag as u8).unwrap(), *value_type);
            assert_eq!(value_type.name().parse::<ValueType>().unwrap(), *value_type);
        }

        assert!(matches!(
            ValueType::from_tag(7),
            Err(VolumeError::UnknownValueType(7))
        ));
        assert!("float64".parse::<ValueType>().is_err());
    }

    #[test]
    fn decode_signed() {
        let bytes = [0xFF, 0xFF, 0x02, 0x00];

        let samples = Samples::decode(ValueType::Int16, &bytes, 2).unwrap();
        assert_eq!(samples, Samples::Int16(vec![-1, 2]));

        let samples = Samples::decode(ValueType::Int32, &bytes, 1).unwrap();
        assert_eq!(samples, Samples::Int32(vec![0x0002_FFFF]));

        let samples = Samples::decode(ValueType::Int8, &bytes, 4).unwrap();
        assert_eq!(samples.to_f32(), vec![-1.0, -1.0, 2.0, 0.0]);
    }

    #[test]
    fn decode_short() {
        let bytes = [0u8; 7];
        let err = Samples::decode(ValueType::Float32, &bytes, 2).unwrap_err();

        assert!(matches!(
            err,
            VolumeError::Truncated {
                expected: 8,
                actual: 7
            }
        ));
    }
}
