//! Frame scheduling and resize delivery for the terminal event loop.

use std::time::Instant;

use nightsky_core::Viewport;
use nightsky_starfield::{FrameHandle, Host, ListenerId};
use ratatui::layout::Size;

/// Braille dots per terminal cell, horizontally.
pub const CELL_WIDTH_PX: f32 = 2.0;

/// Braille dots per terminal cell, vertically.
pub const CELL_HEIGHT_PX: f32 = 4.0;

/// Surface size for a terminal of the given cell size.
pub fn viewport_for(size: Size) -> Viewport {
    Viewport::new(
        size.width as f32 * CELL_WIDTH_PX,
        size.height as f32 * CELL_HEIGHT_PX,
    )
}

/// Single-slot frame scheduler driven by the app loop.
///
/// At most one frame callback is pending; the loop takes it once per tick.
#[derive(Debug)]
pub struct TerminalHost {
    next_id: u64,
    pending: Option<FrameHandle>,
    resize_listeners: Vec<ListenerId>,
    started: Instant,
}

impl Default for TerminalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalHost {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: None,
            resize_listeners: Vec::new(),
            started: Instant::now(),
        }
    }

    /// Take the pending frame callback, if any.
    pub fn take_frame(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    /// Whether anyone wants resize events.
    pub fn wants_resize(&self) -> bool {
        !self.resize_listeners.is_empty()
    }

    /// Milliseconds since the host was created.
    pub fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Host for TerminalHost {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id());
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }

    fn subscribe_resize(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id());
        self.resize_listeners.push(id);
        id
    }

    fn unsubscribe_resize(&mut self, id: ListenerId) {
        self.resize_listeners.retain(|l| *l != id);
    }
}
