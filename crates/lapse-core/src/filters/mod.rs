//! Plane filters used by preprocessing and corner detection.

pub mod gaussian_blur;
pub mod gradient;
pub mod histogram;

pub use gaussian_blur::gaussian_blur;
pub use gradient::sobel;
pub use histogram::{contrast_stretch, histogram_stretch};
