/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

//! Binary frame format.
//!
//! Little-endian layout:
//!
//! | offset | content                                   |
//! |--------|-------------------------------------------|
//! | 0      | value type tag (`u8`)                     |
//! | 1..3   | width (`u16`)                             |
//! | 3..5   | height (`u16`)                            |
//! | 5..7   | depth (`u16`)                             |
//! | 7..    | `width*height*depth` samples, x fastest   |
//!
//! Bytes after the last sample are ignored.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use byteorder::{LittleEndian, WriteBytesExt};
use nom::{
    number::complete::{le_u16, le_u8},
    sequence::tuple,
    IResult,
};

use super::{DataSource, Samples, ValueType, VolumeGrid};
use crate::error::VolumeError;

pub const FRAME_HEADER_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub value_type: ValueType,
    pub width: u16,
    pub height: u16,
    pub depth: u16,
}

impl FrameHeader {
    pub fn sample_count(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    pub fn data_size(&self) -> usize {
        self.sample_count() * self.value_type.size()
    }

    /// Parse header from the beginning of `bytes`, return rest of the input
    pub fn parse(bytes: &[u8]) -> Result<(FrameHeader, &[u8]), VolumeError> {
        let (rest, (tag, width, height, depth)) =
            header_parser(bytes).map_err(|_| VolumeError::Truncated {
                expected: FRAME_HEADER_SIZE,
                actual: bytes.len(),
            })?;

        let value_type = ValueType::from_tag(tag)?;

        if width == 0 || height == 0 || depth == 0 {
            return Err(VolumeError::EmptyVolume {
                width: width as usize,
                height: height as usize,
                depth: depth as usize,
            });
        }

        let header = FrameHeader {
            value_type,
            width,
            height,
            depth,
        };
        Ok((header, rest))
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u8(self.value_type.tag())?;
        w.write_u16::<LittleEndian>(self.width)?;
        w.write_u16::<LittleEndian>(self.height)?;
        w.write_u16::<LittleEndian>(self.depth)?;
        Ok(())
    }
}

fn header_parser(s: &[u8]) -> IResult<&[u8], (u8, u16, u16, u16)> {
    tuple((le_u8, le_u16, le_u16, le_u16))(s)
}

/// Frame with samples in their stored type
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    header: FrameHeader,
    samples: Samples,
}

impl RawFrame {
    pub fn new(width: u16, height: u16, depth: u16, samples: Samples) -> Result<RawFrame, VolumeError> {
        let header = FrameHeader {
            value_type: samples.value_type(),
            width,
            height,
            depth,
        };
        if header.sample_count() == 0 {
            return Err(VolumeError::EmptyVolume {
                width: width as usize,
                height: height as usize,
                depth: depth as usize,
            });
        }
        if samples.len() != header.sample_count() {
            return Err(VolumeError::SizeMismatch {
                expected: header.sample_count(),
                actual: samples.len(),
            });
        }
        Ok(RawFrame { header, samples })
    }

    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    /// Grid of samples rescaled into `<0;1>`
    pub fn to_grid(&self) -> Result<VolumeGrid, VolumeError> {
        let grid = VolumeGrid::new(
            self.header.width as usize,
            self.header.height as usize,
            self.header.depth as usize,
            self.samples.to_f32(),
        )?;
        Ok(grid.normalized())
    }
}

pub fn decode_frame(bytes: &[u8]) -> Result<RawFrame, VolumeError> {
    let (header, data) = FrameHeader::parse(bytes)?;
    let samples = Samples::decode(header.value_type, data, header.sample_count())?;

    let trailing = data.len() - header.data_size();
    if trailing > 0 {
        log::debug!("Ignoring {} bytes after frame data", trailing);
    }

    Ok(RawFrame { header, samples })
}

pub fn encode_frame(frame: &RawFrame) -> Vec<u8> {
    let mut out = Vec::with_capacity(FRAME_HEADER_SIZE + frame.header.data_size());
    // writing into a Vec cannot fail
    let _ = frame.header.write_to(&mut out);
    out.extend_from_slice(&frame.samples.encode());
    out
}

/// Read frame file and normalize it
pub fn load_frame<P>(path: P) -> Result<VolumeGrid, VolumeError>
where
    P: AsRef<Path>,
{
    let ds = DataSource::from_file(&path)?;
    let frame = decode_frame(ds.as_slice())?;
    let header = frame.header();
    log::info!(
        "Loaded frame {}: {}x{}x{} {}",
        path.as_ref().display(),
        header.width,
        header.height,
        header.depth,
        header.value_type
    );
    frame.to_grid()
}

pub fn save_frame<P>(path: P, frame: &RawFrame) -> Result<(), VolumeError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| VolumeError::write(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&encode_frame(frame))
        .and_then(|_| writer.flush())
        .map_err(|e| VolumeError::write(path, e))
}

#[cfg(test)]
mod test {

    use super::*;

    fn small_frame() -> RawFrame {
        RawFrame::new(2, 2, 1, Samples::UInt16(vec![0, 100, 200, 400])).unwrap()
    }

    #[test]
    fn header_layout() {
        let bytes = encode_frame(&small_frame());

        assert_eq!(&bytes[..FRAME_HEADER_SIZE], &[3, 2, 0, 2, 0, 1, 0]);
        assert_eq!(bytes.len(), FRAME_HEADER_SIZE + 8);
    }

    #[test]
    fn decode_normalized() {
        let bytes = encode_frame(&small_frame());

        let grid = decode_frame(&bytes).unwrap().to_grid().unwrap();

        assert_eq!(grid.dims(), nalgebra::vector![2, 2, 1]);
        assert_eq!(grid.data(), &[0.0, 0.25, 0.5, 1.0]);
    }

    #[test]
    fn trailing_bytes_ignored() {
        let mut bytes = encode_frame(&small_frame());
        bytes.extend_from_slice(&[0xAB; 5]);

        let frame = decode_frame(&bytes).unwrap();
        assert_eq!(frame, small_frame());
    }

    #[test]
    fn unknown_tag() {
        let bytes = [9u8, 1, 0, 1, 0, 1, 0, 0];
        assert!(matches!(
            decode_frame(&bytes),
            Err(VolumeError::UnknownValueType(9))
        ));
    }

    #[test]
    fn zero_sized() {
        let bytes = [1u8, 4, 0, 0, 0, 4, 0];
        assert!(matches!(
            decode_frame(&bytes),
            Err(VolumeError::EmptyVolume { height: 0, .. })
        ));
    }

    #[test]
    fn short_header() {
        let bytes = [1u8, 4, 0];
        assert!(matches!(
            decode_frame(&bytes),
            Err(VolumeError::Truncated {
                expected: FRAME_HEADER_SIZE,
                actual: 3
            })
        ));
    }

    #[test]
    fn unwritable_path() {
        // parent is a regular file, so the frame cannot be created
        let mut parent = std::env::temp_dir();
        parent.push(format!("volren_{}_not_a_dir", std::process::id()));
        std::fs::write(&parent, b"x").unwrap();

        let err = save_frame(parent.join("out.frame"), &small_frame()).unwrap_err();
        assert!(matches!(err, VolumeError::ResourceWrite { .. }));
        assert!(err.to_string().starts_with("cannot write"));

        std::fs::remove_file(parent).unwrap();
    }
}
