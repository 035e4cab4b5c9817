//! Latest-value inbox between event handlers and the frame loop.
//!
//! Event handlers overwrite whatever is pending; the frame loop drains it
//! once at the start of each tick, so a frame never sees a half-applied update.

use crate::config::Config;

/// Pointer state in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

/// Everything one frame needs from the outside world
#[derive(Debug, Clone, Default)]
pub struct FrameInputs {
    pub pointer: Pointer,
    pub config: Option<Config>,
    pub viewport: Option<(u32, u32)>,
    pub clear: bool,
}

#[derive(Debug, Default)]
pub struct Inbox {
    pointer: Pointer,
    config: Option<Config>,
    viewport: Option<(u32, u32)>,
    clear: bool,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer.x = x;
        self.pointer.y = y;
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.pointer = Pointer { x, y, active: true };
    }

    pub fn pointer_up(&mut self) {
        self.pointer.active = false;
    }

    /// Queue a full configuration; replaces any earlier pending one
    pub fn set_config(&mut self, config: Config) {
        self.config = Some(config);
    }

    /// Pending configuration, if any, for incremental edits
    pub fn pending_config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Some((width, height));
    }

    pub fn request_clear(&mut self) {
        self.clear = true;
    }

    /// Snapshot for this frame. Pointer state persists; one-shot updates are consumed.
    pub fn take(&mut self) -> FrameInputs {
        FrameInputs {
            pointer: self.pointer,
            config: self.config.take(),
            viewport: self.viewport.take(),
            clear: std::mem::take(&mut self.clear),
        }
    }
}
