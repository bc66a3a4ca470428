/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

use nalgebra::{vector, Vector3, Vector4};

pub type RGBA = Vector4<f32>;
pub type RGB = Vector3<f32>;

pub fn new(r: f32, g: f32, b: f32, a: f32) -> RGBA {
    vector![r, g, b, a]
}

pub fn rgb(r: f32, g: f32, b: f32) -> RGB {
    vector![r, g, b]
}

pub fn zero() -> RGBA {
    vector![0.0, 0.0, 0.0, 0.0]
}

/// Relative luminance (Rec. 709 weights)
pub fn luminance(c: &RGBA) -> f32 {
    0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z
}

/// Convert a <0;1> channel into a byte
pub fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
