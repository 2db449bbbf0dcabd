//! Echo engine crate.
//!
//! Host runtime for Echo games: owns the platform window, the GPU device and
//! the sprite quad renderer. The game-facing host contract lives in
//! `echo-framework`.

pub mod core;
pub mod device;
pub mod time;
pub mod window;

pub mod coords;
pub mod logging;
pub mod paint;
pub mod render;
