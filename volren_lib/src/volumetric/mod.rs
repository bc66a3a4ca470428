//! Volumetric data and the loaders producing it.
//!
//! Loaders normalize samples into `<0;1>` before building a [`VolumeGrid`],
//! the renderers use the values as they are.

mod cube;
mod data_source;
mod frame;
mod grid;
mod raw;
mod value_type;

use std::path::Path;

pub use cube::{cube_to_grid, load_cube_file, read_cube, write_cube, CubeAtom, CubeFile, ANGSTROMS_IN_BOHR};
pub use data_source::DataSource;
pub use frame::{decode_frame, encode_frame, load_frame, save_frame, FrameHeader, RawFrame, FRAME_HEADER_SIZE};
pub use grid::{voxel_count, VolumeGrid};
pub use raw::{decode_raw, load_raw, RawParams};
pub use value_type::{Samples, ValueType};

use crate::error::VolumeError;

/// Load volume file, format is chosen by extension.
/// `.cube` files are read as cube files, everything else as frames.
pub fn load_volume<P>(path: P) -> Result<VolumeGrid, VolumeError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let is_cube = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("cube"))
        .unwrap_or(false);

    if is_cube {
        let cube = load_cube_file(path)?;
        cube_to_grid(&cube)
    } else {
        load_frame(path)
    }
}

#[cfg(test)]
mod test {

    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("volren_{}_{}", std::process::id(), name));
        path
    }

    #[test]
    fn dispatch_by_extension() {
        let frame_path = temp_path("dispatch.frame");
        let frame = RawFrame::new(2, 1, 1, Samples::Int8(vec![-4, 4])).unwrap();
        save_frame(&frame_path, &frame).unwrap();

        let grid = load_volume(&frame_path).unwrap();
        assert_eq!(grid.data(), &[0.0, 1.0]);

        let cube_path = temp_path("dispatch.CUBE");
        let cube = CubeFile {
            titles: ["a".into(), "b".into()],
            origin: nalgebra::point![0.0, 0.0, 0.0],
            counts: [1, 1, 2],
            axes: [nalgebra::Vector3::x(), nalgebra::Vector3::y(), nalgebra::Vector3::z()],
            atoms: vec![],
            data: vec![1.0, 3.0],
        };
        let mut text = Vec::new();
        write_cube(&cube, &mut text).unwrap();
        std::fs::write(&cube_path, text).unwrap();

        let grid = load_volume(&cube_path).unwrap();
        assert_eq!(grid.dims(), nalgebra::vector![1, 1, 2]);
        assert_eq!(grid.data(), &[0.0, 1.0]);

        std::fs::remove_file(frame_path).unwrap();
        std::fs::remove_file(cube_path).unwrap();
    }
}
