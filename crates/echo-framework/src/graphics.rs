/// A complete set of display values, as last applied or as requested.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DisplaySettings {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub mouse_visible: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            fullscreen: false,
            mouse_visible: true,
        }
    }
}

/// Display configuration of the game window.
///
/// Setters only change the *preferred* values; nothing reaches the window
/// until [`EchoGame::apply_graphics_changes`](crate::EchoGame::apply_graphics_changes)
/// runs, which calls [`apply_changes`](Self::apply_changes) and forwards the
/// result to the host engine.
#[derive(Debug, Clone, Default)]
pub struct GraphicsSettings {
    preferred: DisplaySettings,
    applied: DisplaySettings,
}

impl GraphicsSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preferred_back_buffer_width(&self) -> u32 {
        self.preferred.width
    }

    pub fn set_preferred_back_buffer_width(&mut self, width: u32) {
        self.preferred.width = width;
    }

    pub fn preferred_back_buffer_height(&self) -> u32 {
        self.preferred.height
    }

    pub fn set_preferred_back_buffer_height(&mut self, height: u32) {
        self.preferred.height = height;
    }

    pub fn is_full_screen(&self) -> bool {
        self.preferred.fullscreen
    }

    pub fn set_full_screen(&mut self, fullscreen: bool) {
        self.preferred.fullscreen = fullscreen;
    }

    pub fn toggle_full_screen(&mut self) {
        self.preferred.fullscreen = !self.preferred.fullscreen;
    }

    pub fn is_mouse_visible(&self) -> bool {
        self.preferred.mouse_visible
    }

    pub fn set_mouse_visible(&mut self, visible: bool) {
        self.preferred.mouse_visible = visible;
    }

    pub fn has_pending_changes(&self) -> bool {
        self.preferred != self.applied
    }

    /// The values the window currently runs with.
    pub fn applied(&self) -> DisplaySettings {
        self.applied
    }

    /// Commits the preferred values and returns them.
    pub fn apply_changes(&mut self) -> DisplaySettings {
        self.applied = self.preferred;
        self.applied
    }
}
