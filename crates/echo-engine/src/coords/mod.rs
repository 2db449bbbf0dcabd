//! Geometry types shared by the sprite batch and the renderer.
//!
//! CPU space is back-buffer (physical) pixels, origin top-left, +X right, +Y down.
//! The sprite shader converts to NDC with a viewport uniform.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
