//! Retained figure: panel layout plus the overlays of the current frame
//!
//! The figure is split into a main grid panel, an optional resource panel
//! and an info panel. Overlays ([`Artist`]s) are positioned in the units of
//! the panel they belong to: grid coordinates for the main panel, fractions
//! of the panel for the info panel, slot indices for the resource panel.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use image::Rgba;

use crate::occupancy::GridBounds;

const MARGIN: f32 = 10.0;
const TITLE_HEIGHT: f32 = 28.0;
const PANEL_GAP: f32 = 8.0;

/// Tick label band left of and above the grid, in units of the text scale
const TICK_BAND: f32 = 10.0;

/// Pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

/// Panels of the figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Grid,
    Resources,
    Info,
}

/// Pixel placement of the panels
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub title: Rect,
    pub grid: Rect,
    pub resources: Option<Rect>,
    pub info: Rect,
}

impl Layout {
    /// Split the canvas with width ratios 30/2/4, or 30/6 without resources
    pub fn new(width: u32, height: u32, with_resources: bool) -> Self {
        let (w, h) = (width as f32, height as f32);
        let title = Rect::new(MARGIN, MARGIN, (w - 2.0 * MARGIN).max(0.0), TITLE_HEIGHT);
        let top = title.bottom() + PANEL_GAP;
        let body_h = (h - top - MARGIN).max(0.0);
        let ratios: &[f32] = if with_resources { &[30.0, 2.0, 4.0] } else { &[30.0, 6.0] };
        let gaps = PANEL_GAP * (ratios.len() - 1) as f32;
        let body_w = (w - 2.0 * MARGIN - gaps).max(0.0);
        let total: f32 = ratios.iter().sum();

        let mut x = MARGIN;
        let mut panels = Vec::with_capacity(ratios.len());
        for ratio in ratios {
            let panel_w = body_w * ratio / total;
            panels.push(Rect::new(x, top, panel_w, body_h));
            x += panel_w + PANEL_GAP;
        }

        let (grid, resources, info) = if with_resources {
            (panels[0], Some(panels[1]), panels[2])
        } else {
            (panels[0], None, panels[1])
        };
        Self {
            width,
            height,
            title,
            grid,
            resources,
            info,
        }
    }

    pub fn panel(&self, panel: Panel) -> Option<Rect> {
        match panel {
            Panel::Grid => Some(self.grid),
            Panel::Resources => self.resources,
            Panel::Info => Some(self.info),
        }
    }
}

/// Mapping from grid coordinates to pixels inside the grid panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTransform {
    pub origin_x: f32,
    pub origin_y: f32,
    pub cell: f32,
    pub bounds: GridBounds,
}

impl GridTransform {
    /// Fit square cells into the panel, leaving room for tick labels
    pub fn fit(panel: Rect, bounds: GridBounds, text_scale: u32) -> Self {
        let band = TICK_BAND * text_scale as f32;
        let columns = bounds.width().max(1) as f32;
        let rows = bounds.height().max(1) as f32;
        let cell = ((panel.w - band) / columns).min((panel.h - band) / rows).max(1.0);
        Self {
            origin_x: panel.x + band,
            origin_y: panel.y + band,
            cell,
            bounds,
        }
    }

    /// Pixel position of grid point `(x, y)`; cell `(x, y)` spans to `(x + 1, y + 1)`
    pub fn to_pixels(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.origin_x + (x - self.bounds.xmin as f32) * self.cell,
            self.origin_y + (y - self.bounds.ymin as f32) * self.cell,
        )
    }

    pub fn scale(&self, length: f32) -> f32 {
        length * self.cell
    }
}

/// Fill pattern drawn over a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hatch {
    Cross,
    Dots,
}

/// Fill and outline of a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    pub fill: Option<Rgba<u8>>,
    pub edge: Option<Rgba<u8>>,
    pub line_width: f32,
    pub hatch: Option<Hatch>,
    pub dashed: bool,
}

impl ShapeStyle {
    pub fn filled(fill: Rgba<u8>, edge: Rgba<u8>) -> Self {
        Self {
            fill: Some(fill),
            edge: Some(edge),
            line_width: 1.0,
            hatch: None,
            dashed: false,
        }
    }

    pub fn outline(edge: Rgba<u8>, line_width: f32) -> Self {
        Self {
            fill: None,
            edge: Some(edge),
            line_width,
            hatch: None,
            dashed: false,
        }
    }

    pub fn hatched(mut self, hatch: Hatch) -> Self {
        self.hatch = Some(hatch);
        self
    }

    pub fn with_line_width(mut self, line_width: f32) -> Self {
        self.line_width = line_width;
        self
    }

    pub fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }
}

/// Appearance of a text label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Rgba<u8>,
    pub background: Option<Rgba<u8>>,
    /// Multiple of the figure text scale
    pub size: u32,
}

impl TextStyle {
    pub fn boxed(background: Rgba<u8>) -> Self {
        Self {
            color: crate::palette::BLACK,
            background: Some(background),
            size: 1,
        }
    }

    pub fn sized(mut self, size: u32) -> Self {
        self.size = size.max(1);
        self
    }
}

/// A single overlay of the current frame
#[derive(Debug, Clone, PartialEq)]
pub enum Artist {
    Rect {
        panel: Panel,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        style: ShapeStyle,
    },
    Polygon {
        panel: Panel,
        center: (f32, f32),
        sides: u32,
        radius: f32,
        /// Counter-clockwise degrees; at 0 a vertex points to decreasing y
        rotation: f32,
        style: ShapeStyle,
    },
    Arrow {
        panel: Panel,
        start: (f32, f32),
        delta: (f32, f32),
        head_width: f32,
        color: Rgba<u8>,
    },
    Text {
        panel: Panel,
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
    },
    /// Vertical gauge in the resource panel, `level` in `[0, 1]`
    Bar {
        slot: usize,
        level: f32,
        color: Rgba<u8>,
    },
}

/// Layout, static decorations and current overlays
#[derive(Debug, Clone)]
pub struct Figure {
    layout: Layout,
    transform: GridTransform,
    title: Option<String>,
    resource_names: Vec<String>,
    text_scale: u32,
    artists: Vec<Artist>,
}

impl Figure {
    pub fn new(
        width: u32,
        height: u32,
        bounds: GridBounds,
        resource_names: Vec<String>,
        text_scale: u32,
    ) -> Self {
        let layout = Layout::new(width, height, !resource_names.is_empty());
        let transform = GridTransform::fit(layout.grid, bounds, text_scale);
        Self {
            layout,
            transform,
            title: None,
            resource_names,
            text_scale,
            artists: Vec::new(),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn transform(&self) -> &GridTransform {
        &self.transform
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub fn resource_names(&self) -> &[String] {
        &self.resource_names
    }

    pub fn text_scale(&self) -> u32 {
        self.text_scale
    }

    pub fn add(&mut self, artist: Artist) {
        self.artists.push(artist);
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    /// Remove every overlay, keeping layout and title
    pub fn clear_artists(&mut self) {
        self.artists.clear();
    }
}
