//! Seams between [`EchoGame`](crate::EchoGame) and the engine it runs on.
//!
//! The game owns its engine by composition. Everything the game needs from
//! the engine goes through [`HostEngine`]; everything the sprite batch
//! needs from the graphics device goes through [`RenderDevice`].

use anyhow::Result;
use echo_engine::render::Sprite;

use crate::content::ContentManager;
use crate::graphics::DisplaySettings;

/// Capabilities an engine offers to the game it hosts.
pub trait HostEngine {
    /// Render-surface handle published once initialization completes.
    type Device: RenderDevice;

    /// Applies committed display settings to the window.
    fn apply_display(&mut self, display: &DisplaySettings);

    fn set_window_title(&mut self, title: &str);

    /// The engine's own content manager, before the game configures it.
    fn default_content(&self) -> ContentManager;

    /// Runs the engine's internal setup and returns the graphics device.
    ///
    /// Only valid once the engine is ready (window and GPU created).
    fn initialize(&mut self) -> Result<Self::Device>;
}

/// Receiver of finished sprite batches.
///
/// Clones must refer to the same device.
pub trait RenderDevice: Clone {
    fn submit(&self, sprites: Vec<Sprite>);

    /// Whether `self` and `other` are the same device.
    fn same_device(&self, other: &Self) -> bool;
}
