//! Animated night-sky simulation for the nightsky background.
//!
//! The sky is a population of twinkling stars on two parallax layers, a few
//! fixed constellations joined by faint lines, and the occasional shooting
//! star. [`Starfield`] holds the simulation state and is advanced with
//! [`Starfield::step`] and rendered with [`Starfield::draw`], which returns
//! plain [`DrawCommand`]s. [`StarfieldLayer`] wraps it in the mount, frame,
//! resize and teardown lifecycle of a background layer.

mod animations;
mod layer;
mod settings;
mod state;
mod throttle;

pub use animations::constellation::{
    CONSTELLATIONS, Constellation, ConstellationPoint, ConstellationSpan, member_count,
};
pub use animations::shooting::{ShootingStar, SpawnTimer};
pub use animations::star::{Star, Tier};
pub use layer::{FrameHandle, Host, ListenerId, StarfieldLayer, Surface, SurfaceError};
pub use nightsky_core::{AnimationSpeed, DrawCommand, Viewport};
pub use settings::{DEFAULT_STAR_COUNT, StarfieldSettings};
pub use state::{FramePlan, Starfield};
pub use throttle::Throttle;
