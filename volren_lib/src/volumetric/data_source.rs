use std::{fs::File, path::Path};

use memmap::{Mmap, MmapOptions};

use crate::error::VolumeError;

/// Bytes of a volume file, either owned or memory mapped
pub enum DataSource {
    Vec(Vec<u8>),
    Mmap(Mmap),
}

impl DataSource {
    /// Memory map the file at `path`
    pub fn from_file<P>(path: P) -> Result<DataSource, VolumeError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| VolumeError::resource(path, e))?;
        let len = file
            .metadata()
            .map_err(|e| VolumeError::resource(path, e))?
            .len();

        // zero length mappings are rejected by the OS
        if len == 0 {
            return Ok(DataSource::Vec(vec![]));
        }

        let mmap = unsafe { MmapOptions::new().map(&file) };
        let mmap = mmap.map_err(|e| VolumeError::resource(path, e))?;

        log::debug!("Mapped {} ({} bytes)", path.display(), len);
        Ok(DataSource::Mmap(mmap))
    }

    pub fn as_slice(&self) -> &[u8] {
        match self {
            DataSource::Vec(v) => v.as_slice(),
            DataSource::Mmap(m) => &m[..],
        }
    }
}
