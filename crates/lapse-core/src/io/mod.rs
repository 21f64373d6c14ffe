//! Image decoding, preprocessing and frame sources.

pub mod crop;
pub mod image_io;
pub mod preprocess;
pub mod source;

pub use crop::crop_color;
pub use image_io::{image_size, load_color, save_color_png};
pub use preprocess::{preprocess, PreprocessConfig};
pub use source::{DiskFrameSource, FrameSource};
