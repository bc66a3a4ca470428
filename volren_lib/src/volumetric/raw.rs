use std::{path::Path, str::FromStr};

use nom::{
    bytes::complete::{take_while, take_while1},
    character::complete::{alphanumeric1, char, digit1, u16 as parse_u16},
    combinator::all_consuming,
    sequence::tuple,
    IResult,
};

use super::{voxel_count, DataSource, Samples, ValueType, VolumeGrid};
use crate::error::VolumeError;

/// Layout of a headerless sample stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawParams {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub value_type: ValueType,
}

impl RawParams {
    /// `None` if the sample count overflows
    pub fn sample_count(&self) -> Option<usize> {
        voxel_count(self.width, self.height, self.depth)
    }

    /// Guess parameters from a file name such as `skull_256x256x113_uint8.raw`.
    ///
    /// Dimensions are the first three groups of digits, the value type is the
    /// type name found in the name. Returns `None` for whatever cannot be found.
    pub fn detect(file_name: &str) -> (Option<(usize, usize, usize)>, Option<ValueType>) {
        let base = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file_name)
            .to_lowercase();

        let dims = dims_parser(&base).ok().and_then(|(_, (w, h, d))| {
            Some((w.parse().ok()?, h.parse().ok()?, d.parse().ok()?))
        });

        // "uint8" contains "int8", longest names are tried first
        let mut by_length = ValueType::ALL;
        by_length.sort_by_key(|t| std::cmp::Reverse(t.name().len()));
        let value_type = by_length.into_iter().find(|t| base.contains(t.name()));

        (dims, value_type)
    }

    /// Parameters detected from `file_name`, if all of them are present
    pub fn from_file_name(file_name: &str) -> Option<RawParams> {
        match RawParams::detect(file_name) {
            (Some((width, height, depth)), Some(value_type)) => Some(RawParams {
                width,
                height,
                depth,
                value_type,
            }),
            _ => None,
        }
    }
}

/// Strict `WxHxD:TYPE` form, for example `256x256x113:uint8`.
/// Dimensions must fit into `u16` like in frame files.
impl FromStr for RawParams {
    type Err = VolumeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, (width, _, height, _, depth, _, type_name)) = all_consuming(tuple((
            parse_u16,
            char('x'),
            parse_u16,
            char('x'),
            parse_u16,
            char(':'),
            alphanumeric1,
        )))(s)
        .map_err(|_: nom::Err<nom::error::Error<&str>>| {
            VolumeError::InvalidFormat(format!("`{}` is not WxHxD:TYPE", s))
        })?;

        Ok(RawParams {
            width: width as usize,
            height: height as usize,
            depth: depth as usize,
            value_type: type_name.to_lowercase().parse()?,
        })
    }
}

fn not_digit(c: char) -> bool {
    !c.is_ascii_digit()
}

fn dims_parser(s: &str) -> IResult<&str, (&str, &str, &str)> {
    let (rest, (_, w, _, h, _, d)) = tuple((
        take_while(not_digit),
        digit1,
        take_while1(not_digit),
        digit1,
        take_while1(not_digit),
        digit1,
    ))(s)?;
    Ok((rest, (w, h, d)))
}

/// Decode the samples of a raw stream, extra bytes are dropped
pub fn decode_raw(bytes: &[u8], params: &RawParams) -> Result<Samples, VolumeError> {
    let too_large = || VolumeError::TooLarge {
        width: params.width,
        height: params.height,
        depth: params.depth,
    };
    let count = params.sample_count().ok_or_else(too_large)?;
    if count == 0 {
        return Err(VolumeError::EmptyVolume {
            width: params.width,
            height: params.height,
            depth: params.depth,
        });
    }
    let expected = count
        .checked_mul(params.value_type.size())
        .ok_or_else(too_large)?;
    if bytes.len() > expected {
        log::warn!("Dropping {} bytes after raw data", bytes.len() - expected);
    }
    Samples::decode(params.value_type, bytes, count)
}

/// Read headerless file and normalize it
pub fn load_raw<P>(path: P, params: RawParams) -> Result<VolumeGrid, VolumeError>
where
    P: AsRef<Path>,
{
    let ds = DataSource::from_file(&path)?;
    let samples = decode_raw(ds.as_slice(), &params)?;
    log::info!(
        "Loaded raw {}: {}x{}x{} {}",
        path.as_ref().display(),
        params.width,
        params.height,
        params.depth,
        params.value_type
    );
    let grid = VolumeGrid::new(params.width, params.height, params.depth, samples.to_f32())?;
    Ok(grid.normalized())
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn detect_full() {
        let params = RawParams::from_file_name("/data/Skull_256x256x113_UInt8.raw").unwrap();

        assert_eq!(
            params,
            RawParams {
                width: 256,
                height: 256,
                depth: 113,
                value_type: ValueType::UInt8
            }
        );
    }

    #[test]
    fn detect_partial() {
        let (dims, value_type) = RawParams::detect("bonsai_int16_64.raw");
        assert_eq!(dims, None);
        assert_eq!(value_type, Some(ValueType::Int16));

        let (dims, value_type) = RawParams::detect("engine 10 20 30.dat");
        assert_eq!(dims, Some((10, 20, 30)));
        assert_eq!(value_type, None);
    }

    #[test]
    fn decode_short_stream() {
        let params = RawParams {
            width: 2,
            height: 2,
            depth: 2,
            value_type: ValueType::UInt16,
        };

        assert!(matches!(
            decode_raw(&[0; 15], &params),
            Err(VolumeError::Truncated {
                expected: 16,
                actual: 15
            })
        ));
        assert_eq!(decode_raw(&[0; 20], &params).unwrap().len(), 8);
    }

    #[test]
    fn decode_oversized() {
        let params = RawParams {
            width: usize::MAX,
            height: 2,
            depth: 1,
            value_type: ValueType::UInt8,
        };
        assert_eq!(params.sample_count(), None);
        assert!(matches!(
            decode_raw(&[0; 4], &params),
            Err(VolumeError::TooLarge { .. })
        ));

        // count fits, byte size does not
        let params = RawParams {
            width: usize::MAX / 2,
            height: 1,
            depth: 1,
            value_type: ValueType::Float32,
        };
        assert!(matches!(
            decode_raw(&[0; 4], &params),
            Err(VolumeError::TooLarge { .. })
        ));
    }

    #[test]
    fn strict_argument() {
        let params: RawParams = "256x256x113:uint8".parse().unwrap();
        assert_eq!(
            params,
            RawParams {
                width: 256,
                height: 256,
                depth: 113,
                value_type: ValueType::UInt8
            }
        );
        assert_eq!("4x4x4:Float32".parse::<RawParams>().unwrap().value_type, ValueType::Float32);

        for bad in [
            "uint16:64x64x64",
            "64x64x64",
            "64x64:uint8",
            "64x64x64:uint8 ",
            "64x64x64:uint9",
            "70000x1x1:uint8",
            "-1x1x1:int8",
        ] {
            assert!(bad.parse::<RawParams>().is_err(), "{} accepted", bad);
        }
    }
}
