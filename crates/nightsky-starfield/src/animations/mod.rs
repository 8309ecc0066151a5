//! Sky objects: stars, constellations and shooting stars.

pub mod constellation;
pub mod shooting;
pub mod star;
