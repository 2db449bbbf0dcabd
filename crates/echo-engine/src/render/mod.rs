//! GPU rendering.
//!
//! The only renderer is the sprite quad renderer fed by the sprite batch.
//! CPU geometry is in back-buffer pixels; the vertex shader converts to NDC
//! using a viewport uniform.

mod ctx;
mod sprite;

pub use ctx::{RenderCtx, RenderTarget};
pub use sprite::{Sprite, SpriteRenderer};
