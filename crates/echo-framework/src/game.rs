use std::cell::{RefCell, RefMut};

use anyhow::Result;
use echo_engine::paint::Color;
use echo_engine::time::GameTime;
use state::InitCell;

use crate::backend::WgpuEngine;
use crate::config::GameConfig;
use crate::content::{CONTENT_ROOT, ContentManager};
use crate::error::HostError;
use crate::graphics::GraphicsSettings;
use crate::host::HostEngine;
use crate::instance::InstanceSlot;
use crate::sprite_batch::SpriteBatch;

/// Lifecycle position of an [`EchoGame`].
///
/// A game value only exists once constructed; there is no way back from
/// `Initialized`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HostState {
    Constructed,
    Initialized,
}

/// Control directive returned by [`Game::update`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GameControl {
    Continue,
    Exit,
}

/// Callbacks of a game running on an [`EchoGame`].
pub trait Game<E: HostEngine = WgpuEngine> {
    /// Called once, right after the host is initialized.
    fn load_content(&mut self, host: &mut EchoGame<E>) -> Result<()> {
        let _ = host;
        Ok(())
    }

    fn update(&mut self, host: &mut EchoGame<E>, time: &GameTime) -> GameControl;

    /// Draws through [`EchoGame::sprite_batch`].
    fn draw(&mut self, host: &EchoGame<E>, time: &GameTime) -> Result<()>;

    /// Colour the back buffer is cleared to before `draw`.
    fn clear_color(&self) -> Color {
        Color::CORNFLOWER
    }
}

/// The single game host of a program.
///
/// Construction claims the instance slot, configures the window through
/// the engine and prepares the content manager. The graphics device and
/// the sprite batch only exist after [`initialize`](Self::initialize),
/// which the engine calls once its own setup is done.
pub struct EchoGame<E: HostEngine> {
    engine: E,
    title: String,
    graphics: GraphicsSettings,
    content: ContentManager,
    graphics_device: InitCell<E::Device>,
    sprite_batch: InitCell<RefCell<SpriteBatch<E::Device>>>,
}

impl<E: HostEngine> EchoGame<E> {
    /// Creates the game, claiming the process-wide instance slot.
    ///
    /// Fails with [`HostError::AlreadyInitialized`] if a game was created
    /// before, whatever the arguments.
    pub fn new(config: GameConfig, engine: E) -> Result<Self, HostError> {
        Self::new_in(InstanceSlot::process(), config, engine)
    }

    /// Creates the game, claiming `slot` instead of the process slot.
    pub fn new_in(slot: &InstanceSlot, config: GameConfig, mut engine: E) -> Result<Self, HostError> {
        if slot.is_claimed() {
            log::error!(
                "refusing to create {:?}: {:?} already exists",
                config.title,
                slot.owner().unwrap_or_default()
            );
            return Err(HostError::AlreadyInitialized);
        }
        config.validate()?;
        slot.claim(&config.title)?;

        let mut graphics = GraphicsSettings::new();
        graphics.set_preferred_back_buffer_width(config.width);
        graphics.set_preferred_back_buffer_height(config.height);
        graphics.set_full_screen(config.fullscreen);
        graphics.set_mouse_visible(true);
        engine.apply_display(&graphics.apply_changes());

        engine.set_window_title(&config.title);

        let mut content = engine.default_content();
        content.set_root_directory(CONTENT_ROOT);

        log::info!(
            "created {:?} ({}x{}, fullscreen: {})",
            config.title,
            config.width,
            config.height,
            config.fullscreen
        );

        Ok(Self {
            engine,
            title: config.title,
            graphics,
            content,
            graphics_device: InitCell::new(),
            sprite_batch: InitCell::new(),
        })
    }

    /// Publishes the graphics device and creates the sprite batch bound to it.
    ///
    /// Runs the engine's own initialization first, since the device only
    /// exists after it. A second call fails with
    /// [`HostError::InitializedTwice`] and leaves both handles unchanged.
    pub fn initialize(&mut self) -> Result<(), HostError> {
        if self.graphics_device.try_get().is_some() {
            return Err(HostError::InitializedTwice);
        }

        let device = self.engine.initialize().map_err(HostError::Engine)?;
        let batch = SpriteBatch::new(device.clone());

        let published = self.graphics_device.set(device) && self.sprite_batch.set(RefCell::new(batch));
        debug_assert!(published);

        log::info!("{:?} initialized", self.title);
        Ok(())
    }

    pub fn state(&self) -> HostState {
        if self.graphics_device.try_get().is_some() {
            HostState::Initialized
        } else {
            HostState::Constructed
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Renames the window.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.engine.set_window_title(&self.title);
    }

    pub fn graphics(&self) -> &GraphicsSettings {
        &self.graphics
    }

    /// Mutable display settings; call
    /// [`apply_graphics_changes`](Self::apply_graphics_changes) afterwards.
    pub fn graphics_mut(&mut self) -> &mut GraphicsSettings {
        &mut self.graphics
    }

    /// Commits pending display settings to the window.
    pub fn apply_graphics_changes(&mut self) {
        let applied = self.graphics.apply_changes();
        self.engine.apply_display(&applied);
    }

    pub fn content(&self) -> &ContentManager {
        &self.content
    }

    /// `None` until [`initialize`](Self::initialize) has run.
    pub fn graphics_device(&self) -> Option<&E::Device> {
        self.graphics_device.try_get()
    }

    /// `None` until [`initialize`](Self::initialize) has run.
    ///
    /// # Panics
    /// If the batch is already borrowed.
    pub fn sprite_batch(&self) -> Option<RefMut<'_, SpriteBatch<E::Device>>> {
        self.sprite_batch.try_get().map(RefCell::borrow_mut)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Runs one update + draw step of `game`.
    pub fn frame<G: Game<E>>(&mut self, game: &mut G, time: &GameTime) -> Result<GameControl> {
        if game.update(self, time) == GameControl::Exit {
            return Ok(GameControl::Exit);
        }
        game.draw(self, time)?;

        if let Some(batch) = self.sprite_batch() {
            if batch.is_active() {
                log::warn!("sprite batch left open after draw; {} sprites not submitted", batch.pending());
            }
        }
        Ok(GameControl::Continue)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use echo_engine::coords::Rect;

    use super::*;
    use crate::graphics::DisplaySettings;
    use crate::host::RenderDevice;
    use crate::sprite_batch::SortMode;
    use crate::testing::{RecordingDevice, RecordingEngine};

    fn construct(slot: &InstanceSlot, title: &str, w: u32, h: u32, fs: bool) -> Result<EchoGame<RecordingEngine>, HostError> {
        EchoGame::new_in(slot, GameConfig::new(title, w, h, fs), RecordingEngine::new())
    }

    fn time() -> GameTime {
        GameTime {
            elapsed: 1.0 / 60.0,
            total: Duration::ZERO,
            now: Instant::now(),
            frame_index: 0,
        }
    }

    #[test]
    fn construct_applies_display_and_title() {
        let slot = InstanceSlot::new();
        let game = construct(&slot, "Demo", 800, 600, false).unwrap();

        let g = game.graphics();
        assert_eq!(g.preferred_back_buffer_width(), 800);
        assert_eq!(g.preferred_back_buffer_height(), 600);
        assert!(!g.is_full_screen());
        assert!(!g.has_pending_changes());
        assert_eq!(game.title(), "Demo");

        let engine = game.engine();
        assert_eq!(engine.title, "Demo");
        assert_eq!(
            engine.displays,
            vec![DisplaySettings { width: 800, height: 600, fullscreen: false, mouse_visible: true }]
        );
    }

    #[test]
    fn content_root_is_fixed() {
        for (w, h, fs) in [(800, 600, false), (1920, 1080, true), (1, 1, false)] {
            let slot = InstanceSlot::new();
            let game = construct(&slot, "Demo", w, h, fs).unwrap();
            assert_eq!(game.content().root_directory(), std::path::Path::new("Content"));
        }
    }

    #[test]
    fn second_construct_fails_and_keeps_first_configuration() {
        let slot = InstanceSlot::new();
        let game = construct(&slot, "Game", 1280, 720, true).unwrap();
        assert!(slot.is_claimed());
        assert!(game.graphics().is_full_screen());

        let second = construct(&slot, "Other", 100, 100, false);
        assert!(matches!(second, Err(HostError::AlreadyInitialized)));

        assert_eq!(slot.owner(), Some("Game"));
        assert_eq!(game.graphics().preferred_back_buffer_width(), 1280);
        assert_eq!(game.graphics().preferred_back_buffer_height(), 720);
        assert!(game.graphics().is_full_screen());
    }

    #[test]
    fn second_construct_fails_even_with_invalid_arguments() {
        let slot = InstanceSlot::new();
        let _game = construct(&slot, "Game", 640, 480, false).unwrap();
        assert!(matches!(construct(&slot, "", 0, 0, false), Err(HostError::AlreadyInitialized)));
    }

    #[test]
    fn invalid_configuration_does_not_claim_the_slot() {
        let slot = InstanceSlot::new();
        assert!(matches!(construct(&slot, "", 800, 600, false), Err(HostError::InvalidConfig(_))));
        assert!(matches!(construct(&slot, "Demo", 0, 600, false), Err(HostError::InvalidConfig(_))));
        assert!(!slot.is_claimed());
        assert!(construct(&slot, "Demo", 800, 600, false).is_ok());
    }

    #[test]
    fn handles_are_unset_until_initialize() {
        let slot = InstanceSlot::new();
        let mut game = construct(&slot, "Demo", 800, 600, false).unwrap();
        assert_eq!(game.state(), HostState::Constructed);
        assert!(game.graphics_device().is_none());
        assert!(game.sprite_batch().is_none());

        game.initialize().unwrap();
        assert_eq!(game.state(), HostState::Initialized);
        assert_eq!(game.engine().init_calls, 1);

        let device = game.graphics_device().unwrap().clone();
        assert!(device.same_device(&game.engine().device));
        assert!(game.sprite_batch().unwrap().device().same_device(&device));
    }

    #[test]
    fn second_initialize_is_rejected() {
        let slot = InstanceSlot::new();
        let mut game = construct(&slot, "Demo", 800, 600, false).unwrap();
        game.initialize().unwrap();
        let first = game.graphics_device().unwrap().clone();

        game.engine_mut().device = RecordingDevice::new();
        assert!(matches!(game.initialize(), Err(HostError::InitializedTwice)));
        assert_eq!(game.engine().init_calls, 1);
        assert!(game.graphics_device().unwrap().same_device(&first));
        assert!(game.sprite_batch().unwrap().device().same_device(&first));
    }

    #[test]
    fn engine_failure_leaves_game_constructed() {
        let slot = InstanceSlot::new();
        let mut engine = RecordingEngine::new();
        engine.fail_init = true;
        let mut game = EchoGame::new_in(&slot, GameConfig::new("Demo", 800, 600, false), engine).unwrap();

        let err = game.initialize().unwrap_err();
        assert!(matches!(err, HostError::Engine(_)));
        assert_eq!(err.to_string(), "no adapter");
        assert_eq!(game.state(), HostState::Constructed);
    }

    #[test]
    fn graphics_changes_reach_the_engine_when_applied() {
        let slot = InstanceSlot::new();
        let mut game = construct(&slot, "Demo", 800, 600, false).unwrap();

        game.graphics_mut().toggle_full_screen();
        assert_eq!(game.engine().displays.len(), 1);

        game.apply_graphics_changes();
        assert_eq!(game.engine().displays.len(), 2);
        assert!(game.engine().displays[1].fullscreen);

        game.set_title("Renamed");
        assert_eq!(game.engine().title, "Renamed");
    }

    struct Squares {
        updates: u32,
        stop_after: u32,
    }

    impl Game<RecordingEngine> for Squares {
        fn update(&mut self, _host: &mut EchoGame<RecordingEngine>, _time: &GameTime) -> GameControl {
            self.updates += 1;
            if self.updates > self.stop_after { GameControl::Exit } else { GameControl::Continue }
        }

        fn draw(&mut self, host: &EchoGame<RecordingEngine>, _time: &GameTime) -> Result<()> {
            let mut batch = host.sprite_batch().expect("initialized");
            batch.begin(SortMode::Deferred)?;
            batch.draw(Rect::new(0.0, 0.0, 16.0, 16.0), Color::WHITE)?;
            batch.end()?;
            Ok(())
        }
    }

    #[test]
    fn frame_runs_update_then_draw() {
        let slot = InstanceSlot::new();
        let mut host = construct(&slot, "Demo", 800, 600, false).unwrap();
        host.initialize().unwrap();
        let mut game = Squares { updates: 0, stop_after: 1 };

        assert_eq!(host.frame(&mut game, &time()).unwrap(), GameControl::Continue);
        assert_eq!(host.engine().device.batches().len(), 1);

        // Exit from update skips draw.
        assert_eq!(host.frame(&mut game, &time()).unwrap(), GameControl::Exit);
        assert_eq!(host.engine().device.batches().len(), 1);
    }

    #[test]
    fn process_slot_allows_one_game() {
        // The only test touching the process slot.
        let first = EchoGame::new(GameConfig::new("Process", 320, 240, false), RecordingEngine::new());
        assert!(first.is_ok());
        assert!(InstanceSlot::process().is_claimed());

        let second = EchoGame::new(GameConfig::default(), RecordingEngine::new());
        assert!(matches!(second, Err(HostError::AlreadyInitialized)));
    }
}
