//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keyboard, touch, device tilt)
//! - Storage lives in `persistence`, time in `sim::clock`

pub mod input;

pub use input::InputState;
