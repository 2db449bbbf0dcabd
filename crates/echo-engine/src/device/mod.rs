//! GPU device + surface management.
//!
//! Creates the wgpu Instance/Adapter/Device/Queue for the game window,
//! configures the surface and hands out one encoder + view per frame.

mod gpu;
mod surface;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
