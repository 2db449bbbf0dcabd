//! In-memory engine and device used by the unit tests.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Result, bail};
use echo_engine::render::Sprite;

use crate::content::ContentManager;
use crate::graphics::DisplaySettings;
use crate::host::{HostEngine, RenderDevice};

/// Device that records every submitted batch.
#[derive(Debug, Clone, Default)]
pub struct RecordingDevice {
    batches: Rc<RefCell<Vec<Vec<Sprite>>>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<Vec<Sprite>> {
        self.batches.borrow().clone()
    }
}

impl RenderDevice for RecordingDevice {
    fn submit(&self, sprites: Vec<Sprite>) {
        self.batches.borrow_mut().push(sprites);
    }

    fn same_device(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.batches, &other.batches)
    }
}

/// Engine that records what the host asks of it.
#[derive(Debug)]
pub struct RecordingEngine {
    pub base_dir: PathBuf,
    pub displays: Vec<DisplaySettings>,
    pub title: String,
    pub init_calls: usize,
    pub fail_init: bool,
    /// Device handed out by the next `initialize`.
    pub device: RecordingDevice,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("/games/test"),
            displays: Vec::new(),
            title: String::new(),
            init_calls: 0,
            fail_init: false,
            device: RecordingDevice::new(),
        }
    }
}

impl HostEngine for RecordingEngine {
    type Device = RecordingDevice;

    fn apply_display(&mut self, display: &DisplaySettings) {
        self.displays.push(*display);
    }

    fn set_window_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn default_content(&self) -> ContentManager {
        ContentManager::new(&self.base_dir)
    }

    fn initialize(&mut self) -> Result<RecordingDevice> {
        self.init_calls += 1;
        if self.fail_init {
            bail!("no adapter");
        }
        Ok(self.device.clone())
    }
}
