//! Interactive direct volume rendering.
//!
//! Volumes are loaded from frame, raw or cube files ([`volumetric`]),
//! uploaded as textures to a software graphics [`gpu`] and drawn either by
//! view aligned slices or by ray casting ([`render`]). [`view::VolumeView`]
//! combines everything into a widget-like controller.

pub mod camera;
pub mod color;
pub mod common;
pub mod error;
pub mod gpu;
pub mod premade;
pub mod render;
pub mod settings;
pub mod test_helpers;
pub mod transfer_function;
pub mod view;
pub mod volumetric;

pub use error::{SettingsError, ShaderError, TransferFunctionError, VolumeError};
pub use render::{Renderer, RendererKind};
pub use settings::Settings;
pub use transfer_function::TransferFunction;
pub use view::VolumeView;
