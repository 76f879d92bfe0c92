//! Raster operations used by the transcoder: orientation correction,
//! resize policies, and format encoding.

pub mod encode;
pub mod orientation;
pub mod resize;
