// Ready made palettes, opacity curves and procedural volumes.
// Used by the viewer menus, the tests and the benchmarks.

pub mod generators;
pub mod opacity;
pub mod palettes;
