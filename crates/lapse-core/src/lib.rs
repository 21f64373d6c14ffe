pub mod align;
pub mod consts;
pub mod crop;
pub mod error;
pub mod features;
pub mod filters;
pub mod frame;
pub mod geometry;
pub mod homography;
pub mod io;
pub mod pipeline;
pub mod sequence;
