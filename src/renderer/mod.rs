//! Rendering module
//!
//! `shapes` builds a pure draw list from the session; painters consume it.
//! The browser painter is Canvas2D, native runs use `HeadlessRenderer`.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use shapes::{DrawList, Shape, ShapeKind, Surface, build_draw_list};

use crate::error::RenderError;
use crate::sim::Session;

/// Paints one frame of a session
pub trait Renderer {
    fn render(&mut self, session: &Session) -> Result<(), RenderError>;
}

/// Builds draw lists without painting them (native demo, tests)
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    pub frames: u64,
    pub last_shape_count: usize,
}

impl Renderer for HeadlessRenderer {
    fn render(&mut self, session: &Session) -> Result<(), RenderError> {
        let list = build_draw_list(session);
        self.frames += 1;
        self.last_shape_count = list.len();
        Ok(())
    }
}
