//! Canvas2D painter
//!
//! One canvas per surface. Each surface's coordinate space is scaled to fill
//! its canvas, then the draw list is filled shape by shape.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::shapes::{Color, ShapeKind, Surface, active_surfaces, build_draw_list, surface_bounds};
use super::Renderer;
use crate::error::RenderError;
use crate::sim::Session;

struct Target {
    surface: Surface,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

pub struct CanvasRenderer {
    targets: Vec<Target>,
}

fn css_color(color: Color) -> String {
    let [r, g, b, a] = color;
    format!(
        "rgba({}, {}, {}, {})",
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
        a
    )
}

impl CanvasRenderer {
    /// Look up the canvas for each surface by element id
    pub fn from_ids(document: &web_sys::Document, ids: &[(Surface, &str)]) -> Result<Self, RenderError> {
        let mut targets = Vec::with_capacity(ids.len());
        for &(surface, id) in ids {
            let canvas = document
                .get_element_by_id(id)
                .ok_or_else(|| RenderError::Context(format!("no element #{id}")))?
                .dyn_into::<HtmlCanvasElement>()
                .map_err(|_| RenderError::Context(format!("#{id} is not a canvas")))?;
            let ctx = canvas
                .get_context("2d")
                .map_err(|e| RenderError::Context(format!("{e:?}")))?
                .ok_or_else(|| RenderError::Context(format!("#{id} has no 2d context")))?
                .dyn_into::<CanvasRenderingContext2d>()
                .map_err(|_| RenderError::Context(format!("#{id} context is not 2d")))?;
            targets.push(Target { surface, canvas, ctx });
        }
        log::info!("Canvas renderer ready ({} surfaces)", targets.len());
        Ok(Self { targets })
    }
}

impl Renderer for CanvasRenderer {
    fn render(&mut self, session: &Session) -> Result<(), RenderError> {
        let list = build_draw_list(session);
        let active = active_surfaces(session);

        for target in &self.targets {
            let ctx = &target.ctx;
            let width = target.canvas.width() as f64;
            let height = target.canvas.height() as f64;

            ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
                .map_err(|e| RenderError::Paint(format!("{e:?}")))?;
            ctx.clear_rect(0.0, 0.0, width, height);
            if !active.contains(&target.surface) {
                continue;
            }

            let bounds = surface_bounds(target.surface, session);
            let sx = width / bounds.width() as f64;
            let sy = height / (bounds.max.y - bounds.min.y) as f64;
            ctx.set_transform(sx, 0.0, 0.0, sy, -bounds.min.x as f64 * sx, -bounds.min.y as f64 * sy)
                .map_err(|e| RenderError::Paint(format!("{e:?}")))?;

            for shape in list.on(target.surface) {
                ctx.set_fill_style_str(&css_color(shape.color));
                match shape.kind {
                    ShapeKind::Rect { min, size } => {
                        ctx.fill_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
                    }
                    ShapeKind::Circle { center, radius } => {
                        ctx.begin_path();
                        ctx.arc(center.x as f64, center.y as f64, radius as f64, 0.0, std::f64::consts::TAU)
                            .map_err(|e| RenderError::Paint(format!("{e:?}")))?;
                        ctx.fill();
                    }
                }
            }
        }
        Ok(())
    }
}
