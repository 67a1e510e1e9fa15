//! Frame drawing on the plotters bitmap backend
//!
//! A [`Figure`] and its occupancy grid are drawn through a plotters
//! [`BitMapBackend`] into an RGB buffer, which is handed out as an
//! [`RgbaImage`] for the frame sinks. Text is set in the bundled DejaVu Sans
//! Mono face, registered once with the plotters font table.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::sync::OnceLock;

use image::{DynamicImage, Rgba, RgbImage, RgbaImage};
use plotters::backend::{BitMapBackend, DrawingBackend};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, DrawingAreaErrorKind, IntoDrawingArea};
use plotters::element::{DashedPathElement, PathElement, Polygon, Rectangle, Text};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, Color, FontStyle, IntoFont, RGBAColor};
use plotters::style::{ShapeStyle as PlotShape, TextStyle as PlotText};
use thiserror::Error;

use crate::figure::{Artist, Figure, Hatch, Panel, Rect, ShapeStyle, TextStyle};
use crate::occupancy::OccupancyGrid;
use crate::palette;

/// Font size in pixels at text scale 1
const FONT_SIZE: f64 = 9.0;
const FONT_FAMILY: &str = "sans-serif";
static FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

const HATCH_SPACING: i32 = 8;
const DASH_LENGTH: i32 = 4;
const TEXT_PADDING: f64 = 2.0;

type Canvas<'b> = DrawingArea<BitMapBackend<'b>, Shift>;

/// Drawing failure reported by the bitmap backend
pub type BackendError = DrawingAreaErrorKind<<BitMapBackend<'static> as DrawingBackend>::ErrorType>;

/// Error type for frame drawing
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("The bundled font could not be registered")]
    Font,

    #[error("Drawing error: {0}")]
    Drawing(#[from] BackendError),

    #[error("Frame buffer does not match {width}x{height} pixels")]
    Buffer { width: u32, height: u32 },
}

fn ensure_font() -> Result<(), PlotError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let registered = *REGISTERED.get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT_DATA).is_ok());
    registered.then_some(()).ok_or(PlotError::Font)
}

fn color(rgba: Rgba<u8>) -> RGBAColor {
    let Rgba([r, g, b, a]) = rgba;
    RGBAColor(r, g, b, f64::from(a) / 255.0)
}

fn pixel((x, y): (f32, f32)) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

fn font(scale: u32, size: u32, rgba: Rgba<u8>, pos: Pos) -> PlotText<'static> {
    (FONT_FAMILY, FONT_SIZE * f64::from(scale * size.max(1)))
        .into_font()
        .color(&color(rgba))
        .pos(pos)
}

fn top_left() -> Pos {
    Pos::new(HPos::Left, VPos::Top)
}

/// Draw the figure and the occupancy grid into a new frame
pub fn draw_frame(figure: &Figure, grid: &OccupancyGrid) -> Result<RgbaImage, PlotError> {
    ensure_font()?;
    let layout = figure.layout();
    let (width, height) = (layout.width, layout.height);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let canvas = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        canvas.fill(&color(palette::WHITE))?;

        if let Some(title) = figure.title() {
            let center = (layout.title.x + layout.title.w / 2.0, layout.title.y + layout.title.h / 2.0);
            let style = font(figure.text_scale(), 2, palette::BLACK, Pos::new(HPos::Center, VPos::Center));
            canvas.draw(&Text::new(title, pixel(center), style))?;
        }

        draw_grid(&canvas, figure, grid)?;
        if let Some(panel) = layout.resources {
            draw_resource_panel(&canvas, figure, panel)?;
        }
        for artist in figure.artists() {
            draw_artist(&canvas, figure, artist)?;
        }
        canvas.present()?;
    }
    let frame = RgbImage::from_raw(width, height, buffer).ok_or(PlotError::Buffer { width, height })?;
    Ok(DynamicImage::ImageRgb8(frame).into_rgba8())
}

fn draw_grid(canvas: &Canvas<'_>, figure: &Figure, grid: &OccupancyGrid) -> Result<(), PlotError> {
    let transform = figure.transform();
    let bounds = grid.bounds();
    let scale = figure.text_scale();

    for (x, y, cell) in grid.cells() {
        let from = pixel(transform.to_pixels(x as f32, y as f32));
        let to = pixel(transform.to_pixels(x as f32 + 1.0, y as f32 + 1.0));
        canvas.draw(&Rectangle::new([from, to], color(cell.color()).filled()))?;
    }

    let (left, top) = pixel(transform.to_pixels(bounds.xmin as f32, bounds.ymin as f32));
    let (right, bottom) = pixel(transform.to_pixels(bounds.xmax as f32 + 1.0, bounds.ymax as f32 + 1.0));
    let grid_line = color(palette::with_alpha(palette::BLACK, 0.4)).stroke_width(1);
    for x in bounds.xmin + 1..=bounds.xmax {
        let (px, _) = pixel(transform.to_pixels(x as f32, 0.0));
        canvas.draw(&DashedPathElement::new(vec![(px, top), (px, bottom)], DASH_LENGTH, DASH_LENGTH, grid_line))?;
    }
    for y in bounds.ymin + 1..=bounds.ymax {
        let (_, py) = pixel(transform.to_pixels(0.0, y as f32));
        canvas.draw(&DashedPathElement::new(vec![(left, py), (right, py)], DASH_LENGTH, DASH_LENGTH, grid_line))?;
    }
    canvas.draw(&Rectangle::new([(left, top), (right, bottom)], color(palette::BLACK).stroke_width(1)))?;

    // Tick labels along the top (x) and the left (y) edge, thinned out
    // when cells are narrower than the labels.
    let widest = bounds.xmax.max(bounds.ymax).to_string();
    let (label_w, label_h) = canvas.estimate_text_size(&widest, &font(scale, 1, palette::BLACK, top_left()))?;
    let above = font(scale, 1, palette::BLACK, Pos::new(HPos::Center, VPos::Bottom));
    let every = ((label_w as f32 + 2.0) / transform.cell).ceil().max(1.0) as usize;
    for x in (bounds.xmin..=bounds.xmax).step_by(every) {
        let (px, _) = pixel(transform.to_pixels(x as f32 + 0.5, 0.0));
        canvas.draw(&Text::new(x.to_string(), (px, top - 2), above.clone()))?;
    }
    let beside = font(scale, 1, palette::BLACK, Pos::new(HPos::Right, VPos::Center));
    let every = ((label_h as f32 + 2.0) / transform.cell).ceil().max(1.0) as usize;
    for y in (bounds.ymin..=bounds.ymax).step_by(every) {
        let (_, py) = pixel(transform.to_pixels(0.0, y as f32 + 0.5));
        canvas.draw(&Text::new(y.to_string(), (left - 2, py), beside.clone()))?;
    }
    Ok(())
}

/// Gauge area of the resource panel, leaving a band for the names
fn resource_area(figure: &Figure, panel: Rect) -> Rect {
    let band = FONT_SIZE as f32 * figure.text_scale() as f32 + 4.0;
    Rect::new(panel.x, panel.y, panel.w, (panel.h - band).max(0.0))
}

fn draw_resource_panel(canvas: &Canvas<'_>, figure: &Figure, panel: Rect) -> Result<(), PlotError> {
    let area = resource_area(figure, panel);
    let frame = [pixel((area.x, area.y)), pixel((area.right(), area.bottom()))];
    canvas.draw(&Rectangle::new(frame, color(palette::BLACK).stroke_width(1)))?;

    let names = figure.resource_names();
    let slot_w = area.w / names.len().max(1) as f32;
    let style = font(figure.text_scale(), 1, palette::BLACK, Pos::new(HPos::Center, VPos::Top));
    let (glyph_w, _) = canvas.estimate_text_size("M", &style)?;
    // Names wider than their slot are cut to the first letters
    let fit = ((slot_w / glyph_w.max(1) as f32).floor() as usize).max(1);
    for (slot, name) in names.iter().enumerate() {
        let label: String = name.chars().take(fit).collect();
        let at = pixel((area.x + slot_w * (slot as f32 + 0.5), area.bottom() + 3.0));
        canvas.draw(&Text::new(label, at, style.clone()))?;
    }
    Ok(())
}

fn panel_point(figure: &Figure, panel: Panel, x: f32, y: f32) -> Option<(f32, f32)> {
    match panel {
        Panel::Grid => Some(figure.transform().to_pixels(x, y)),
        other => {
            let rect = figure.layout().panel(other)?;
            Some((rect.x + x * rect.w, rect.y + y * rect.h))
        }
    }
}

fn panel_length(figure: &Figure, panel: Panel, length: f32) -> Option<f32> {
    match panel {
        Panel::Grid => Some(figure.transform().scale(length)),
        other => {
            let rect = figure.layout().panel(other)?;
            Some(length * rect.w.min(rect.h))
        }
    }
}

/// Vertices of a regular polygon in pixel space, first vertex pointing up
/// at zero rotation
pub fn regular_polygon(center: (f32, f32), sides: u32, radius: f32, rotation: f32) -> Vec<(f32, f32)> {
    let sides = sides.max(3);
    (0..sides)
        .map(|k| {
            let angle = (-90.0 - rotation + k as f32 * 360.0 / sides as f32).to_radians();
            (center.0 + radius * angle.cos(), center.1 + radius * angle.sin())
        })
        .collect()
}

/// Diagonal hatch line starting at column `k`, clipped to the box
/// `[left, right] x [top, bottom]`; falling lines run down-right, rising
/// lines up-right
fn hatch_diagonal(
    (left, top, right, bottom): (i32, i32, i32, i32),
    k: i32,
    rising: bool,
) -> Option<[(i32, i32); 2]> {
    let height = bottom - top;
    let (mut x0, mut x1) = (k, k + height);
    let (mut y0, mut y1) = if rising { (bottom, top) } else { (top, bottom) };
    let step = if rising { -1 } else { 1 };
    if x0 < left {
        y0 += step * (left - x0);
        x0 = left;
    }
    if x1 > right {
        y1 -= step * (x1 - right);
        x1 = right;
    }
    (x0 <= x1).then_some([(x0, y0), (x1, y1)])
}

fn draw_hatch(canvas: &Canvas<'_>, points: &[(i32, i32)], hatch: Hatch, edge: RGBAColor) -> Result<(), PlotError> {
    let left = points.iter().map(|p| p.0).min().unwrap_or(0);
    let right = points.iter().map(|p| p.0).max().unwrap_or(0);
    let top = points.iter().map(|p| p.1).min().unwrap_or(0);
    let bottom = points.iter().map(|p| p.1).max().unwrap_or(0);
    let bbox = (left, top, right, bottom);

    match hatch {
        Hatch::Cross => {
            let start = left - (bottom - top);
            for k in (start..=right).step_by(HATCH_SPACING as usize) {
                for rising in [false, true] {
                    if let Some(segment) = hatch_diagonal(bbox, k, rising) {
                        canvas.draw(&PathElement::new(segment.to_vec(), edge.stroke_width(1)))?;
                    }
                }
            }
        }
        Hatch::Dots => {
            let half = HATCH_SPACING / 2;
            for y in (top + half..bottom).step_by(HATCH_SPACING as usize) {
                for x in (left + half..right).step_by(HATCH_SPACING as usize) {
                    canvas.draw(&Rectangle::new([(x, y), (x + 1, y + 1)], edge.filled()))?;
                }
            }
        }
    }
    Ok(())
}

fn draw_shape(canvas: &Canvas<'_>, points: &[(f32, f32)], style: &ShapeStyle) -> Result<(), PlotError> {
    let points: Vec<(i32, i32)> = points.iter().copied().map(pixel).collect();
    if let Some(fill) = style.fill {
        canvas.draw(&Polygon::new(points.clone(), color(fill).filled()))?;
    }
    if let (Some(hatch), Some(edge)) = (style.hatch, style.edge) {
        draw_hatch(canvas, &points, hatch, color(edge))?;
    }
    if let Some(edge) = style.edge {
        let stroke: PlotShape = color(edge).stroke_width(style.line_width.round().max(1.0) as u32);
        let mut outline = points.clone();
        outline.extend(points.first().copied());
        if style.dashed {
            canvas.draw(&DashedPathElement::new(outline, DASH_LENGTH, DASH_LENGTH, stroke))?;
        } else {
            canvas.draw(&PathElement::new(outline, stroke))?;
        }
    }
    Ok(())
}

fn draw_text(
    canvas: &Canvas<'_>,
    figure: &Figure,
    at: (f32, f32),
    text: &str,
    style: &TextStyle,
) -> Result<(), PlotError> {
    let face = font(figure.text_scale(), style.size, style.color, top_left());
    let (x, y) = pixel(at);
    if let Some(background) = style.background {
        let (w, h) = canvas.estimate_text_size(text, &face)?;
        let pad = (TEXT_PADDING * f64::from(figure.text_scale() * style.size)).round() as i32;
        let corners = [(x - pad, y - pad), (x + w as i32 + pad, y + h as i32 + pad)];
        canvas.draw(&Rectangle::new(corners, color(background).filled()))?;
    }
    canvas.draw(&Text::new(text, (x, y), face))?;
    Ok(())
}

fn draw_arrow(
    canvas: &Canvas<'_>,
    from: (f32, f32),
    to: (f32, f32),
    head_width: f32,
    rgba: Rgba<u8>,
) -> Result<(), PlotError> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length <= f32::EPSILON {
        return Ok(());
    }
    let (ux, uy) = (dx / length, dy / length);
    let shaft = (head_width / 4.0).round().max(1.0) as u32;
    canvas.draw(&PathElement::new(vec![pixel(from), pixel(to)], color(rgba).stroke_width(shaft)))?;

    let head_length = 1.5 * head_width;
    let tip = (to.0 + ux * head_length, to.1 + uy * head_length);
    let (px, py) = (-uy * head_width, ux * head_width);
    let head = vec![pixel((to.0 + px, to.1 + py)), pixel(tip), pixel((to.0 - px, to.1 - py))];
    canvas.draw(&Polygon::new(head, color(rgba).filled()))?;
    Ok(())
}

fn draw_artist(canvas: &Canvas<'_>, figure: &Figure, artist: &Artist) -> Result<(), PlotError> {
    match artist {
        Artist::Rect { panel, x, y, w, h, style } => {
            let (Some(p0), Some(p1)) = (
                panel_point(figure, *panel, *x, *y),
                panel_point(figure, *panel, x + w, y + h),
            ) else {
                return Ok(());
            };
            draw_shape(canvas, &[p0, (p1.0, p0.1), p1, (p0.0, p1.1)], style)
        }
        Artist::Polygon { panel, center, sides, radius, rotation, style } => {
            let (Some(center), Some(radius)) = (
                panel_point(figure, *panel, center.0, center.1),
                panel_length(figure, *panel, *radius),
            ) else {
                return Ok(());
            };
            draw_shape(canvas, &regular_polygon(center, *sides, radius, *rotation), style)
        }
        Artist::Arrow { panel, start, delta, head_width, color } => {
            let (Some(from), Some(to), Some(head)) = (
                panel_point(figure, *panel, start.0, start.1),
                panel_point(figure, *panel, start.0 + delta.0, start.1 + delta.1),
                panel_length(figure, *panel, *head_width),
            ) else {
                return Ok(());
            };
            draw_arrow(canvas, from, to, head, *color)
        }
        Artist::Text { panel, x, y, text, style } => match panel_point(figure, *panel, *x, *y) {
            Some(at) => draw_text(canvas, figure, at, text, style),
            None => Ok(()),
        },
        Artist::Bar { slot, level, color: rgba } => {
            let Some(panel) = figure.layout().resources else {
                return Ok(());
            };
            let area = resource_area(figure, panel);
            let slot_w = area.w / figure.resource_names().len().max(1) as f32;
            let top = area.bottom() - area.h * (*level).clamp(0.0, 1.0);
            let left = area.x + slot_w * *slot as f32;
            let corners = [pixel((left, top)), pixel((left + slot_w, area.bottom()))];
            canvas.draw(&Rectangle::new(corners, color(*rgba).filled()))?;
            Ok(())
        }
    }
}
