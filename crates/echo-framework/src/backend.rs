//! The winit + wgpu host engine.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use winit::dpi::PhysicalSize;

use echo_engine::core::{App as EngineApp, AppControl, FrameCtx, InitCtx};
use echo_engine::device::GpuInit;
use echo_engine::render::{Sprite, SpriteRenderer};
use echo_engine::window::{Runtime, RuntimeConfig, WindowMode};

use crate::content::ContentManager;
use crate::game::{EchoGame, Game, GameControl};
use crate::graphics::DisplaySettings;
use crate::host::{HostEngine, RenderDevice};

/// The GPU device of a running game, shared by everything that draws.
///
/// Cloning is cheap and yields the same device.
#[derive(Clone)]
pub struct GraphicsDevice {
    inner: Rc<DeviceInner>,
}

struct DeviceInner {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    submitted: RefCell<Vec<Sprite>>,
}

impl GraphicsDevice {
    fn new(device: wgpu::Device, queue: wgpu::Queue, surface_format: wgpu::TextureFormat) -> Self {
        Self {
            inner: Rc::new(DeviceInner {
                device,
                queue,
                surface_format,
                submitted: RefCell::default(),
            }),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.inner.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.inner.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.inner.surface_format
    }

    /// Sprites submitted since the last call, in submission order.
    fn take_submitted(&self) -> Vec<Sprite> {
        std::mem::take(&mut *self.inner.submitted.borrow_mut())
    }
}

impl std::fmt::Debug for GraphicsDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsDevice")
            .field("surface_format", &self.inner.surface_format)
            .field("pending_sprites", &self.inner.submitted.borrow().len())
            .finish()
    }
}

impl RenderDevice for GraphicsDevice {
    fn submit(&self, sprites: Vec<Sprite>) {
        self.inner.submitted.borrow_mut().extend(sprites);
    }

    fn same_device(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Host engine backed by a winit window and a wgpu device.
///
/// Before [`EchoGame::run`] the engine only records window settings; the
/// window and device are created inside the run loop.
#[derive(Debug)]
pub struct WgpuEngine {
    window: RuntimeConfig,
    gpu_init: GpuInit,
    base_dir: PathBuf,
    device: Option<GraphicsDevice>,
    /// Window settings changed while running, picked up on the next frame.
    pending: Option<RuntimeConfig>,
}

impl WgpuEngine {
    /// Resolves content against the current working directory.
    pub fn new() -> Result<Self> {
        let base_dir = std::env::current_dir().context("failed to read the working directory")?;
        Ok(Self::with_base_dir(base_dir))
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            window: RuntimeConfig::default(),
            gpu_init: GpuInit::default(),
            base_dir: base_dir.into(),
            device: None,
            pending: None,
        }
    }

    /// Switches vsync (FIFO) on or off (immediate presentation).
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.gpu_init.present_mode = if vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        self
    }

    /// Window settings the window is (or will be) created with.
    pub fn window_config(&self) -> &RuntimeConfig {
        &self.window
    }

    pub fn is_running(&self) -> bool {
        self.device.is_some()
    }

    fn window_changed(&mut self) {
        if self.is_running() {
            self.pending = Some(self.window.clone());
        }
    }
}

impl HostEngine for WgpuEngine {
    type Device = GraphicsDevice;

    fn apply_display(&mut self, display: &DisplaySettings) {
        self.window.size = PhysicalSize::new(display.width, display.height);
        self.window.mode = WindowMode::from_fullscreen(display.fullscreen);
        self.window.cursor_visible = display.mouse_visible;
        self.window_changed();
    }

    fn set_window_title(&mut self, title: &str) {
        self.window.title = title.to_string();
        self.window_changed();
    }

    fn default_content(&self) -> ContentManager {
        ContentManager::new(&self.base_dir)
    }

    fn initialize(&mut self) -> Result<GraphicsDevice> {
        self.device
            .clone()
            .ok_or_else(|| anyhow!("graphics device is not ready; initialize runs inside EchoGame::run"))
    }
}

impl EchoGame<WgpuEngine> {
    /// Opens the window and runs `game` until it exits or the window closes.
    ///
    /// The host is initialized once the window and device exist, then
    /// [`Game::load_content`] runs, then update/draw every frame.
    pub fn run<G>(self, game: G) -> Result<()>
    where
        G: Game + 'static,
    {
        let window = self.engine().window_config().clone();
        let gpu_init = self.engine().gpu_init.clone();

        log::info!("starting {:?}", window.title);
        Runtime::run(
            window,
            gpu_init,
            Driver {
                host: self,
                game,
                renderer: SpriteRenderer::new(),
            },
        )
    }
}

/// Bridges the engine runtime callbacks to the host and the game.
struct Driver<G> {
    host: EchoGame<WgpuEngine>,
    game: G,
    renderer: SpriteRenderer,
}

impl<G: Game> EngineApp for Driver<G> {
    fn on_init(&mut self, ctx: &mut InitCtx<'_, '_>) -> Result<()> {
        let device = GraphicsDevice::new(
            ctx.gpu.device().clone(),
            ctx.gpu.queue().clone(),
            ctx.gpu.surface_format(),
        );
        self.host.engine_mut().device = Some(device);

        self.host.initialize()?;
        self.game
            .load_content(&mut self.host)
            .context("load_content failed")
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let control = match self.host.frame(&mut self.game, &ctx.time) {
            Ok(control) => control,
            Err(err) => {
                log::error!("game frame failed: {err:#}");
                GameControl::Exit
            }
        };
        if control == GameControl::Exit {
            return AppControl::Exit;
        }

        if let Some(cfg) = self.host.engine_mut().pending.take() {
            ctx.runtime.reconfigure(cfg);
        }

        let Some(device) = self.host.graphics_device() else {
            return AppControl::Exit;
        };
        let sprites = device.take_submitted();
        let renderer = &mut self.renderer;

        ctx.render(self.game.clear_color(), |rctx, target| {
            renderer.render(rctx, target, &sprites);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::instance::InstanceSlot;

    #[test]
    fn display_settings_shape_the_window() {
        let mut engine = WgpuEngine::with_base_dir("/games/demo");
        engine.apply_display(&DisplaySettings {
            width: 1280,
            height: 720,
            fullscreen: true,
            mouse_visible: true,
        });
        engine.set_window_title("Game");

        let cfg = engine.window_config();
        assert_eq!(cfg.size, PhysicalSize::new(1280, 720));
        assert_eq!(cfg.mode, WindowMode::Fullscreen);
        assert!(cfg.cursor_visible);
        assert_eq!(cfg.title, "Game");
    }

    #[test]
    fn fullscreen_host_keeps_preferred_back_buffer() {
        let slot = InstanceSlot::new();
        let host = EchoGame::new_in(
            &slot,
            GameConfig::new("Game", 1280, 720, true),
            WgpuEngine::with_base_dir("."),
        )
        .unwrap();

        let cfg = host.engine().window_config();
        assert_eq!(cfg.mode, WindowMode::Fullscreen);
        assert_eq!(cfg.size, PhysicalSize::new(1280, 720));
        assert!(!cfg.resizable);

        let applied = host.graphics().applied();
        assert_eq!(cfg.size, PhysicalSize::new(applied.width, applied.height));
    }

    #[test]
    fn changes_before_run_are_not_queued() {
        let mut engine = WgpuEngine::with_base_dir(".");
        engine.set_window_title("Game");
        assert!(!engine.is_running());
        assert!(engine.pending.is_none());
    }

    #[test]
    fn initialize_outside_the_loop_fails() {
        let mut engine = WgpuEngine::with_base_dir(".");
        assert!(engine.initialize().is_err());
    }

    #[test]
    fn content_resolves_against_base_dir() {
        let engine = WgpuEngine::with_base_dir("/games/demo");
        let content = engine.default_content();
        assert_eq!(
            content.resolve("a.txt").unwrap(),
            PathBuf::from("/games/demo/a.txt")
        );
    }

    #[test]
    fn default_engine_resolves_against_working_directory() {
        let engine = WgpuEngine::new().unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(engine.default_content().resolve("a.txt").unwrap(), cwd.join("a.txt"));
    }

    #[test]
    fn vsync_selects_present_mode() {
        assert_eq!(
            WgpuEngine::with_base_dir(".").with_vsync(false).gpu_init.present_mode,
            wgpu::PresentMode::AutoNoVsync
        );
    }
}
