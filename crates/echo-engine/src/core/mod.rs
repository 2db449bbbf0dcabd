//! Core engine-facing contracts.
//!
//! The stable interface between the runtime (platform loop) and the layer
//! that hosts a game. Runtime internals stay behind these types.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, InitCtx, WindowCtx};
