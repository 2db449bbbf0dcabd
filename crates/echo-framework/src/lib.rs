//! Echo framework: the base every Echo game is built on.
//!
//! A program creates exactly one [`EchoGame`] as the first thing it does,
//! passing the window title, size and fullscreen flag, then hands control to
//! [`EchoGame::run`]. The host engine calls [`EchoGame::initialize`] once its
//! window and GPU exist; from then on the graphics device and the sprite
//! batch are available next to the content manager and display settings.
//!
//! ```rust,ignore
//! use echo_framework::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let host = EchoGame::new(GameConfig::new("Demo", 800, 600, false), WgpuEngine::new()?)?;
//!     host.run(MyGame::default())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod content;
pub mod error;
pub mod game;
pub mod graphics;
pub mod host;
pub mod instance;
pub mod sprite_batch;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{GraphicsDevice, WgpuEngine};
pub use config::GameConfig;
pub use content::{CONTENT_ROOT, ContentManager};
pub use error::{ContentError, HostError, SpriteBatchError};
pub use game::{EchoGame, Game, GameControl, HostState};
pub use graphics::{DisplaySettings, GraphicsSettings};
pub use host::{HostEngine, RenderDevice};
pub use instance::InstanceSlot;
pub use sprite_batch::{SortMode, SpriteBatch};

/// Everything a game needs, in one import.
pub mod prelude {
    pub use crate::{
        ContentManager, EchoGame, Game, GameConfig, GameControl, GraphicsSettings, SortMode,
        SpriteBatch, WgpuEngine,
    };
    pub use echo_engine::coords::{Rect, Vec2};
    pub use echo_engine::paint::Color;
    pub use echo_engine::render::Sprite;
    pub use echo_engine::time::GameTime;
}
