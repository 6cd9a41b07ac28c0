//! The fan field: figure, its grid of copies and the axes helper.
//!
//! - `params` scene constants
//! - `figure` the fan tree
//! - `instancer` randomised copies of the figure
//! - `axes` line helper on the background layer

pub mod axes;
pub mod figure;
pub mod instancer;
pub mod params;
