/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

//! Error types of the library.
//!
//! Loading failures ([`VolumeError`]) abort the load and leave the previous
//! volume displayed. Shader failures ([`ShaderError`]) only disable the
//! renderer strategy that produced them.

use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Errors raised while reading or building volumetric data.
#[derive(Error, Debug)]
pub enum VolumeError {
    /// File cannot be opened, mapped or read.
    #[error("cannot read {path}: {source}")]
    ResourceLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File cannot be created or written.
    #[error("cannot write {path}: {source}")]
    ResourceWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Data section is shorter than the header declares.
    #[error("truncated data: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Type tag does not name a known value type.
    #[error("unknown value type: {0}")]
    UnknownValueType(u8),

    /// Malformed header or text.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// One of the declared dimensions is zero.
    #[error("bad data size: {width} x {height} x {depth}")]
    EmptyVolume {
        width: usize,
        height: usize,
        depth: usize,
    },

    /// Voxel count does not fit into memory addresses.
    #[error("volume too large: {width} x {height} x {depth}")]
    TooLarge {
        width: usize,
        height: usize,
        depth: usize,
    },

    /// Number of samples does not match the dimensions.
    #[error("data size mismatch: expected {expected} samples, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

impl VolumeError {
    pub fn resource(path: impl Into<PathBuf>, source: std::io::Error) -> VolumeError {
        VolumeError::ResourceLoad {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> VolumeError {
        VolumeError::ResourceWrite {
            path: path.into(),
            source,
        }
    }
}

/// Pipeline stage a shader belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Shader compilation or program linking failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShaderError {
    #[error("failed to compile {stage} shader `{name}`:\n{log}")]
    Compile {
        stage: ShaderStage,
        name: String,
        log: String,
    },

    #[error("failed to link program `{name}`:\n{log}")]
    Link { name: String, log: String },
}

impl ShaderError {
    /// Compiler or linker output.
    pub fn log(&self) -> &str {
        match self {
            ShaderError::Compile { log, .. } | ShaderError::Link { log, .. } => log,
        }
    }
}

/// Transfer function tables must not be empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferFunctionError {
    #[error("color table is empty")]
    EmptyColors,

    #[error("opacity table is empty")]
    EmptyOpacities,
}

/// Reading or writing the settings file failed.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
