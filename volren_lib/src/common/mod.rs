mod bound_box;
mod cutoff;
mod ray;
mod value_range;
mod viewport_box;

pub use bound_box::BoundBox;
pub use cutoff::{CutoffWindow, CUTOFF_EPSILON};
pub use ray::Ray;
pub use value_range::ValueRange;
pub use viewport_box::ViewportBox;
