//! Debayering module: 2x2 superpixel downsample of the GONet Bayer grid into
//! red, green and blue planes, plus the 12-bit to 16-bit rescale.

pub mod scale;
pub mod superpixel;
pub mod types;

pub use scale::{UINT12_MAX, UINT16_MAX, scale_plane_to_16bit, scale_uint12_to_16bit};
pub use superpixel::SuperpixelDebayer;
pub use types::ChannelPlanes;
