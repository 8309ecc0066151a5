//! Mount, frame, resize and teardown lifecycle of the starfield background.

use log::{debug, info, warn};
use nightsky_core::{DrawCommand, Viewport};
use thiserror::Error;

use crate::settings::StarfieldSettings;
use crate::state::Starfield;

/// Failure to acquire a drawing surface.
#[derive(Debug, Error, PartialEq)]
pub enum SurfaceError {
    #[error("drawing surface unavailable: {0}")]
    Unavailable(String),
    #[error("viewport {width}x{height} has no drawable area")]
    EmptyViewport { width: f32, height: f32 },
}

/// Something the starfield can draw on.
pub trait Surface {
    /// Set the pixel dimensions of the surface.
    fn resize(&mut self, viewport: Viewport);
    /// Replace the surface contents with `commands`.
    fn submit(&mut self, commands: &[DrawCommand]);
}

/// Opaque id of a requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Opaque id of a resize subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// The environment hosting the layer: frame callbacks and resize events.
pub trait Host {
    /// Ask for one frame callback.
    fn request_frame(&mut self) -> FrameHandle;
    /// Revoke a pending frame callback. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
    /// Start delivering resize events to the layer.
    fn subscribe_resize(&mut self) -> ListenerId;
    /// Stop delivering resize events.
    fn unsubscribe_resize(&mut self, id: ListenerId);
}

#[derive(Debug)]
struct Running<S> {
    surface: S,
    starfield: Starfield,
    pending: Option<FrameHandle>,
    listener: ListenerId,
}

#[derive(Debug)]
enum LayerState<S> {
    /// Mounted without a surface; never draws.
    Inactive,
    Running(Box<Running<S>>),
    TornDown,
}

/// The starfield mounted as a full-viewport background.
#[derive(Debug)]
pub struct StarfieldLayer<S> {
    state: LayerState<S>,
}

impl<S: Surface> StarfieldLayer<S> {
    /// Set up the layer and request its first frame.
    ///
    /// If the surface could not be acquired the layer stays inactive and
    /// every later call is a no-op.
    pub fn mount<H: Host>(
        surface: Result<S, SurfaceError>,
        viewport: Viewport,
        settings: StarfieldSettings,
        host: &mut H,
    ) -> Self {
        let surface = surface.and_then(|s| {
            if viewport.is_empty() {
                Err(SurfaceError::EmptyViewport {
                    width: viewport.width,
                    height: viewport.height,
                })
            } else {
                Ok(s)
            }
        });
        let mut surface = match surface {
            Ok(s) => s,
            Err(e) => {
                warn!("starfield disabled: {e}");
                return Self {
                    state: LayerState::Inactive,
                };
            }
        };

        surface.resize(viewport);
        let starfield = Starfield::new(viewport, settings);
        let listener = host.subscribe_resize();
        let pending = Some(host.request_frame());
        info!(
            "starfield mounted at {}x{} with {} stars",
            viewport.width,
            viewport.height,
            starfield.stars().len()
        );

        Self {
            state: LayerState::Running(Box::new(Running {
                surface,
                starfield,
                pending,
                listener,
            })),
        }
    }

    /// Handle a frame callback. Returns true if a frame was drawn.
    ///
    /// Callbacks for a handle that is no longer pending draw nothing.
    pub fn on_frame<H: Host>(
        &mut self,
        handle: FrameHandle,
        timestamp_ms: f64,
        scroll_y: f32,
        host: &mut H,
    ) -> bool {
        let LayerState::Running(running) = &mut self.state else {
            return false;
        };
        if running.pending != Some(handle) {
            debug!("ignoring stale frame {handle:?}");
            return false;
        }

        running.starfield.step(timestamp_ms, scroll_y);
        let commands = running.starfield.draw();
        running.surface.submit(&commands);
        running.pending = Some(host.request_frame());
        true
    }

    /// Resize the surface and regenerate the population.
    pub fn on_resize(&mut self, viewport: Viewport) {
        let LayerState::Running(running) = &mut self.state else {
            return;
        };
        if viewport.is_empty() {
            debug!(
                "skipping resize to empty viewport {}x{}",
                viewport.width, viewport.height
            );
            return;
        }
        running.surface.resize(viewport);
        running.starfield.resize(viewport);
    }

    /// Cancel the pending frame and drop the resize subscription.
    ///
    /// Calling this more than once is harmless.
    pub fn teardown<H: Host>(&mut self, host: &mut H) {
        match std::mem::replace(&mut self.state, LayerState::TornDown) {
            LayerState::Running(running) => {
                if let Some(handle) = running.pending {
                    host.cancel_frame(handle);
                }
                host.unsubscribe_resize(running.listener);
                info!("starfield torn down");
            }
            LayerState::Inactive | LayerState::TornDown => {}
        }
    }

    /// Mounted with a surface and not yet torn down.
    pub fn is_running(&self) -> bool {
        matches!(self.state, LayerState::Running(_))
    }

    /// Frame callback the layer is waiting for.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        match &self.state {
            LayerState::Running(running) => running.pending,
            _ => None,
        }
    }

    pub fn starfield(&self) -> Option<&Starfield> {
        match &self.state {
            LayerState::Running(running) => Some(&running.starfield),
            _ => None,
        }
    }

    pub fn starfield_mut(&mut self) -> Option<&mut Starfield> {
        match &mut self.state {
            LayerState::Running(running) => Some(&mut running.starfield),
            _ => None,
        }
    }

    pub fn surface(&self) -> Option<&S> {
        match &self.state {
            LayerState::Running(running) => Some(&running.surface),
            _ => None,
        }
    }
}
