//! Colour model shared by the sprite batch and the renderer.

mod color;

pub use color::Color;
