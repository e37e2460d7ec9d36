//! Canvas 2D backend
//!
//! Replays a scene's draw list on a `CanvasRenderingContext2d` and owns the
//! `HtmlImageElement`s behind floating images.

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::images::ImageStore;
use super::scene::{DrawCmd, Paint};
use crate::sim::hit::{ApproxMetrics, TextMeasure};

/// A picture element together with the load callbacks it points at
struct LoadingImage {
    element: HtmlImageElement,
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

impl Drop for LoadingImage {
    fn drop(&mut self) {
        // Detach before the closures are freed so a late load cannot call them
        self.element.set_onload(None);
        self.element.set_onerror(None);
    }
}

/// Picture elements keyed by entity id
#[derive(Default)]
pub struct ImageCache {
    store: ImageStore<LoadingImage>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start fetching the picture for image `id`
    pub fn request(&mut self, id: u32, url: &str) -> Result<(), JsValue> {
        let element = HtmlImageElement::new()?;
        element.set_cross_origin(Some("anonymous"));

        let settled = self.store.settled_handle();
        let onload = Closure::wrap(Box::new(move || {
            settled.borrow_mut().push((id, true));
        }) as Box<dyn FnMut()>);
        element.set_onload(Some(onload.as_ref().unchecked_ref()));

        let settled = self.store.settled_handle();
        let src = url.to_string();
        let onerror = Closure::wrap(Box::new(move || {
            log::warn!("Image {} failed to load: {}", id, src);
            settled.borrow_mut().push((id, false));
        }) as Box<dyn FnMut()>);
        element.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        element.set_src(url);
        self.store.insert(
            id,
            LoadingImage {
                element,
                _onload: onload,
                _onerror: onerror,
            },
        );
        Ok(())
    }

    /// Drain load results since the last call
    pub fn take_settled(&self) -> Vec<(u32, bool)> {
        self.store.take_settled()
    }

    /// Forget pictures whose entity is gone, freeing their callbacks
    pub fn retain_ids(&mut self, live: impl Fn(u32) -> bool) {
        self.store.retain_ids(live);
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn get(&self, id: u32) -> Option<&HtmlImageElement> {
        self.store.get(id).map(|entry| &entry.element)
    }
}

/// Text widths from the browser's font metrics
pub struct CanvasMetrics<'a> {
    pub ctx: &'a CanvasRenderingContext2d,
}

impl TextMeasure for CanvasMetrics<'_> {
    fn text_width(&self, text: &str, font: &str, font_size: f32) -> f32 {
        self.ctx.save();
        self.ctx.set_font(font);
        let width = self.ctx.measure_text(text).map(|m| m.width() as f32);
        self.ctx.restore();
        width.unwrap_or_else(|_| ApproxMetrics.text_width(text, font, font_size))
    }
}

pub struct CanvasRenderer {
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    pub images: ImageCache,
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        Ok(Self {
            canvas,
            ctx,
            images: ImageCache::new(),
        })
    }

    pub fn metrics(&self) -> CanvasMetrics<'_> {
        CanvasMetrics { ctx: &self.ctx }
    }

    /// Resize the backing store, leaving it alone when unchanged (a resize
    /// clears the canvas)
    pub fn resize(&self, size: Vec2) {
        let (w, h) = (size.x as u32, size.y as u32);
        if self.canvas.width() != w {
            self.canvas.set_width(w);
        }
        if self.canvas.height() != h {
            self.canvas.set_height(h);
        }
    }

    pub fn draw(&self, scene: &[DrawCmd]) -> Result<(), JsValue> {
        for cmd in scene {
            self.ctx.save();
            let result = self.draw_one(cmd);
            self.ctx.restore();
            result?;
        }
        Ok(())
    }

    fn draw_one(&self, cmd: &DrawCmd) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        match cmd {
            DrawCmd::Clear { size } => {
                ctx.clear_rect(0.0, 0.0, size.x as f64, size.y as f64);
            }
            DrawCmd::Image {
                id,
                pos,
                size,
                rotation,
                outline,
                filter,
                alpha,
            } => {
                let Some(img) = self.images.get(*id) else {
                    return Ok(());
                };
                let half = *size / 2.0;
                ctx.set_global_alpha(*alpha as f64);
                ctx.translate((pos.x + half.x) as f64, (pos.y + half.y) as f64)?;
                ctx.rotate(*rotation as f64)?;
                ctx.translate(-half.x as f64, -half.y as f64)?;
                trace_path(ctx, outline, true);
                ctx.clip();
                if let Some(filter) = filter {
                    ctx.set_filter(filter);
                }
                ctx.draw_image_with_html_image_element_and_dw_and_dh(
                    img,
                    0.0,
                    0.0,
                    size.x as f64,
                    size.y as f64,
                )?;
            }
            DrawCmd::Text {
                text,
                font,
                pos,
                rotation,
                color,
                alpha,
            } => {
                ctx.set_global_alpha(*alpha as f64);
                ctx.set_font(font);
                ctx.translate(pos.x as f64, pos.y as f64)?;
                ctx.rotate(*rotation as f64)?;
                ctx.set_fill_style_str(color);
                ctx.fill_text(text, 0.0, 0.0)?;
            }
            DrawCmd::Polygon {
                points,
                color,
                alpha,
            } => {
                trace_path(ctx, points, true);
                ctx.set_fill_style_str(color);
                ctx.set_global_alpha(*alpha as f64);
                ctx.fill();
            }
            DrawCmd::Segments {
                segments,
                paint,
                width,
                alpha,
            } => {
                ctx.set_global_alpha(*alpha as f64);
                self.set_stroke(paint)?;
                ctx.set_line_width(*width as f64);
                ctx.begin_path();
                for (a, b) in segments {
                    ctx.move_to(a.x as f64, a.y as f64);
                    ctx.line_to(b.x as f64, b.y as f64);
                }
                ctx.stroke();
            }
            DrawCmd::Polyline {
                points,
                paint,
                width,
            } => {
                self.set_stroke(paint)?;
                ctx.set_line_width(*width as f64);
                ctx.set_line_cap("round");
                ctx.set_line_join("round");
                trace_path(ctx, points, false);
                ctx.stroke();
            }
            DrawCmd::Circle {
                center,
                radius,
                paint,
                stroke,
            } => {
                ctx.begin_path();
                ctx.arc(
                    center.x as f64,
                    center.y as f64,
                    *radius as f64,
                    0.0,
                    std::f64::consts::TAU,
                )?;
                match stroke {
                    Some(width) => {
                        self.set_stroke(paint)?;
                        ctx.set_line_width(*width as f64);
                        ctx.stroke();
                    }
                    None => {
                        self.set_fill(paint)?;
                        ctx.fill();
                    }
                }
            }
        }
        Ok(())
    }

    fn gradient(&self, from: Vec2, to: Vec2, stops: &[(f32, String)]) -> Result<web_sys::CanvasGradient, JsValue> {
        let gradient = self
            .ctx
            .create_linear_gradient(from.x as f64, from.y as f64, to.x as f64, to.y as f64);
        for (offset, color) in stops {
            gradient.add_color_stop(*offset, color)?;
        }
        Ok(gradient)
    }

    fn set_stroke(&self, paint: &Paint) -> Result<(), JsValue> {
        match paint {
            Paint::Solid(color) => self.ctx.set_stroke_style_str(color),
            Paint::Linear { from, to, stops } => {
                let gradient = self.gradient(*from, *to, stops)?;
                self.ctx.set_stroke_style_canvas_gradient(&gradient);
            }
        }
        Ok(())
    }

    fn set_fill(&self, paint: &Paint) -> Result<(), JsValue> {
        match paint {
            Paint::Solid(color) => self.ctx.set_fill_style_str(color),
            Paint::Linear { from, to, stops } => {
                let gradient = self.gradient(*from, *to, stops)?;
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
        }
        Ok(())
    }
}

fn trace_path(ctx: &CanvasRenderingContext2d, points: &[Vec2], close: bool) {
    ctx.begin_path();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        ctx.move_to(first.x as f64, first.y as f64);
    }
    for p in iter {
        ctx.line_to(p.x as f64, p.y as f64);
    }
    if close {
        ctx.close_path();
    }
}
