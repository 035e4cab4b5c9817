//! Pointer-driven heat diffusion effect.
//!
//! A brush deposits heat into a downscaled grid, heat diffuses and decays,
//! and each frame is mapped through a palette LUT into a packed pixel buffer.
//! [`sim::Simulation`] drives everything; the SDL front-end lives in the binary.

pub mod config;
#[cfg(unix)]
pub mod control;
#[cfg(feature = "window")]
pub mod display;
pub mod grid;
pub mod input;
pub mod kernel;
pub mod palette;
pub mod pixel_buffer;
pub mod render;
pub mod sim;
pub mod util;

pub use config::{Config, GlowLimit};
pub use palette::{build_lut, Lut, Palette, Rgb};
pub use pixel_buffer::PixelBuffer;
pub use sim::{DeviceProfile, Mode, Simulation};
