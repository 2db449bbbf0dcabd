//! Time subsystem.
//!
//! One `FrameClock` drives the game loop; `tick()` is called once per
//! presented frame and yields the `GameTime` handed to update/draw.

mod frame_clock;

pub use frame_clock::{FrameClock, GameTime};
