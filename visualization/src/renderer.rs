//! Grid-world renderer: trace snapshots to frames
//!
//! The [`Plotter`] resolves the annotated roles of a program against a
//! built model and draws one snapshot at a time: the static cells (traps,
//! targets, landmarks, adversary goals), the ego agent with its view area,
//! adversaries, cameras, resource gauges, interactive landmarks and the
//! action legend. Frames are pushed into a [`FrameSink`] by
//! [`Plotter::record`].
//!
//! The renderer is a small state machine. It is idle after construction and
//! after [`Plotter::wipe`], and drawing once a snapshot has been rendered.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::BTreeSet;
use std::path::Path;

use image::{Rgba, RgbaImage};
use log::{debug, info, warn};
use thiserror::Error;

use gridtrace_core::annotation::{AnnotationError, BoxConstants, Direction, ProgramAnnotation};
use gridtrace_core::model::{ActionIndex, ModelError, ModelView, StateId};
use gridtrace_core::trace::{Snapshot, Trace, TraceError};

use crate::config::RenderConfig;
use crate::figure::{Artist, Figure, Hatch, Panel, ShapeStyle, TextStyle};
use crate::occupancy::{Cell, GridBounds, OccupancyGrid, OffGrid};
use crate::palette;
use crate::plot::{self, PlotError};
use crate::video::{self, FrameSink, VideoError};

/// Label drawn for the missing action of the last snapshot
const END_OF_TRACE: &str = "--end--";

/// Vertical step between info panel lines, as a fraction of the panel
const INFO_LINE: f32 = 0.07;
const EGO_INFO_TOP: f32 = 0.05;
const ADVERSARY_INFO_TOP: f32 = 0.12;
const LEGEND_TOP: f32 = 0.30;
const FRAME_LABEL_TOP: f32 = 0.92;

const ARROW_LENGTH: f32 = 0.6;
const ARROW_HEAD_WIDTH: f32 = 0.12;

/// Error type for rendering
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Annotation error: {0}")]
    Annotation(#[from] AnnotationError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    #[error("Video error: {0}")]
    Video(#[from] VideoError),

    #[error("Plot error: {0}")]
    Plot(#[from] PlotError),

    #[error("{0}")]
    OffGrid(#[from] OffGrid),

    #[error("Resource {0} has a maximum level of zero")]
    ZeroResourceMaximum(String),

    #[error("Trace is empty, there is nothing to record")]
    EmptyTrace,
}

/// Renderer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Figure built or just reset
    Idle,
    /// Overlays placed for the current frame
    Drawing,
}

/// One-frame memory of the scan action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMemory {
    #[default]
    Normal,
    ScannedLastRound,
}

impl ScanMemory {
    /// Memory for the next frame given the action taken in this one
    pub fn after_action(action: Option<&str>, scan_action: Option<&str>) -> Self {
        match (action, scan_action) {
            (Some(action), Some(scan)) if action == scan => Self::ScannedLastRound,
            _ => Self::Normal,
        }
    }
}

/// Radius of a view area around an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRadius {
    Absent,
    Bounded(i64),
    Unbounded,
}

impl ViewRadius {
    /// Radius from an optional constant; zero or negative draws no area
    pub fn from_constant(value: Option<i64>) -> Self {
        match value {
            Some(radius) if radius > 0 => Self::Bounded(radius),
            _ => Self::Absent,
        }
    }

    /// Inclusive cell box `(xmin, ymin, xmax, ymax)` seen from `(x, y)`,
    /// clamped to the grid
    pub fn area(self, x: i64, y: i64, bounds: GridBounds) -> Option<(i64, i64, i64, i64)> {
        match self {
            Self::Absent => None,
            Self::Bounded(radius) => Some((
                (x - radius).max(bounds.xmin),
                (y - radius).max(bounds.ymin),
                (x + radius).min(bounds.xmax),
                (y + radius).min(bounds.ymax),
            )),
            Self::Unbounded => Some((bounds.xmin, bounds.ymin, bounds.xmax, bounds.ymax)),
        }
    }
}

/// The ego sees everything in the frame after a scan
pub fn ego_view_radius(memory: ScanMemory, annotated: ViewRadius) -> ViewRadius {
    match memory {
        ScanMemory::ScannedLastRound => ViewRadius::Unbounded,
        ScanMemory::Normal => annotated,
    }
}

/// State of an interactive landmark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkStatus {
    Cleared,
    Positive,
    Negative,
}

impl LandmarkStatus {
    pub fn from_flags(cleared: bool, status: bool) -> Self {
        match (cleared, status) {
            (true, _) => Self::Cleared,
            (false, true) => Self::Positive,
            (false, false) => Self::Negative,
        }
    }
}

/// Whether the ego knows the status of an interactive landmark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkBelief {
    Known,
    QuestionMark,
}

impl LandmarkBelief {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Known => "!",
            Self::QuestionMark => "?",
        }
    }
}

/// Known unless some indistinguishable state disagrees on the status
pub fn landmark_belief(status: LandmarkStatus, potential: &[LandmarkStatus]) -> LandmarkBelief {
    if potential.iter().any(|other| *other != status) {
        LandmarkBelief::QuestionMark
    } else {
        LandmarkBelief::Known
    }
}

/// Legend entry colouring of an action label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStyle {
    Unavailable,
    NotAllowed,
    Selected,
    Neutral,
}

impl ActionStyle {
    pub fn background(self) -> Rgba<u8> {
        let color = match self {
            Self::Unavailable => palette::GRAY,
            Self::NotAllowed => palette::RED,
            Self::Selected => palette::GREEN,
            Self::Neutral => palette::WHEAT,
        };
        palette::with_alpha(color, 0.5)
    }
}

pub fn classify_action(
    label: &str,
    available: &BTreeSet<String>,
    considered: &BTreeSet<String>,
    selected: Option<&str>,
) -> ActionStyle {
    if !available.contains(label) {
        ActionStyle::Unavailable
    } else if !considered.contains(label) {
        ActionStyle::NotAllowed
    } else if selected == Some(label) {
        ActionStyle::Selected
    } else {
        ActionStyle::Neutral
    }
}

/// Colour of the arrow of an available action, `None` when unavailable
pub fn arrow_color(
    label: &str,
    available: &BTreeSet<String>,
    considered: &BTreeSet<String>,
    selected: Option<&str>,
) -> Option<Rgba<u8>> {
    if !available.contains(label) {
        None
    } else if selected == Some(label) {
        Some(palette::GREEN)
    } else if !considered.contains(label) {
        Some(palette::RED)
    } else {
        Some(palette::BLACK)
    }
}

/// Grid displacement of a cardinal move; y grows downwards
pub fn cardinal_offset(label: &str) -> Option<(f32, f32)> {
    match label {
        "north" => Some((0.0, -ARROW_LENGTH)),
        "south" => Some((0.0, ARROW_LENGTH)),
        "west" => Some((-ARROW_LENGTH, 0.0)),
        "east" => Some((ARROW_LENGTH, 0.0)),
        _ => None,
    }
}

fn view_area_style(color: Rgba<u8>, alpha: f32, hatch: Hatch, line_width: f32) -> ShapeStyle {
    ShapeStyle::filled(palette::with_alpha(color, alpha), palette::with_alpha(color, 0.3))
        .hatched(hatch)
        .with_line_width(line_width)
}

/// A trace can be recorded when it is well formed and has a snapshot
fn check_recordable(trace: &Trace) -> Result<(), RenderError> {
    trace.check_validity()?;
    if trace.is_empty() {
        return Err(RenderError::EmptyTrace);
    }
    Ok(())
}

/// Renderer of grid-world snapshots
pub struct Plotter<'m, M: ModelView + ?Sized> {
    model: &'m M,
    annotation: ProgramAnnotation,
    config: RenderConfig,
    bounds: GridBounds,
    /// Static cells, copied into `grid` before every frame
    base: OccupancyGrid,
    grid: OccupancyGrid,
    figure: Figure,
    phase: Phase,
    scan_memory: ScanMemory,
    ego_radius: ViewRadius,
    adv_radius: ViewRadius,
    action_labels: Vec<String>,
    resource_names: Vec<String>,
    title: Option<String>,
}

impl<'m, M: ModelView + ?Sized> Plotter<'m, M> {
    pub fn new(model: &'m M, annotation: ProgramAnnotation, config: RenderConfig) -> Result<Self, RenderError> {
        let constant_or_zero = |name: Option<&str>| name.map_or(Ok(0), |name| model.integer_constant(name));
        let bounds = GridBounds::new(
            constant_or_zero(annotation.xmin_constant())?,
            constant_or_zero(annotation.ymin_constant())?,
            model.integer_constant(annotation.xmax_constant()?)?,
            model.integer_constant(annotation.ymax_constant()?)?,
        );
        let radius = |name: Option<&str>| -> Result<ViewRadius, ModelError> {
            let value = name.map(|name| model.integer_constant(name)).transpose()?;
            Ok(ViewRadius::from_constant(value))
        };
        let ego_radius = radius(annotation.ego_radius_constant())?;
        let adv_radius = radius(annotation.adv_radius_constant())?;
        let resource_names = if annotation.has_resources() {
            annotation.resource_names()?.to_vec()
        } else {
            Vec::new()
        };
        let (width, height) = config.canvas_size();
        let figure = Figure::new(width, height, bounds, resource_names.clone(), config.text_scale());

        let mut plotter = Self {
            model,
            annotation,
            config,
            bounds,
            base: OccupancyGrid::new(bounds),
            grid: OccupancyGrid::new(bounds),
            figure,
            phase: Phase::Idle,
            scan_memory: ScanMemory::Normal,
            ego_radius,
            adv_radius,
            action_labels: model.all_choice_labels().into_iter().collect(),
            resource_names,
            title: None,
        };
        plotter.base = plotter.static_grid()?;
        plotter.grid.clone_from(&plotter.base);
        debug!("Renderer ready for grid {}", bounds);
        Ok(plotter)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.figure.set_title(Some(title.clone()));
        self.title = Some(title);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn figure(&self) -> &Figure {
        &self.figure
    }

    /// Rebuild the figure and return to the idle state
    pub fn wipe(&mut self) {
        let (width, height) = self.config.canvas_size();
        self.figure = Figure::new(
            width,
            height,
            self.bounds,
            self.resource_names.clone(),
            self.config.text_scale(),
        );
        self.figure.set_title(self.title.clone());
        self.grid.clone_from(&self.base);
        self.scan_memory = ScanMemory::Normal;
        self.phase = Phase::Idle;
    }

    /// Draw the current figure into a frame
    pub fn draw(&self) -> Result<RgbaImage, RenderError> {
        Ok(plot::draw_frame(&self.figure, &self.grid)?)
    }

    /// Place the overlays of one snapshot
    pub fn render(&mut self, snapshot: &Snapshot<'_>, frame_label: Option<usize>) -> Result<(), RenderError> {
        debug!("Rendering snapshot {}", snapshot.index());
        self.figure.clear_artists();
        self.grid.clone_from(&self.base);
        self.phase = Phase::Drawing;

        let state = snapshot.state();
        let (ego_x, ego_y) = self.ego_location(state)?;
        let radius = ego_view_radius(self.scan_memory, self.ego_radius);
        let selected = self.action_label(state, snapshot.action())?;
        self.scan_memory = ScanMemory::after_action(selected.as_deref(), self.annotation.scan_action());
        self.draw_ego(ego_x, ego_y, radius);

        if let Some(potential) = snapshot.potential_states() {
            for &alternative in potential {
                let (x, y) = self.ego_location(alternative)?;
                self.grid.set(x, y, Cell::EgoBelief)?;
            }
        }

        for camera in 0..self.annotation.nr_cameras() {
            let area = self.annotation.camera_constants(camera)?;
            let style = view_area_style(palette::BLUE, 0.05, Hatch::Dots, 3.0);
            self.draw_box(&area, style)?;
        }

        if self.annotation.has_resources() {
            self.draw_resources(state)?;
        }

        for index in 0..self.annotation.nr_adversaries() {
            if self.annotation.adv_draw_area_boundaries() {
                let area = self.annotation.adv_area(index)?;
                self.draw_box(&area, ShapeStyle::outline(palette::RED, 2.3).dashed())?;
            }
            let (x, y) = self.adversary_location(state, index)?;
            let direction = self.adversary_direction(state, index)?;
            self.draw_adversary(index, x, y, direction);
            if let Some(potential) = snapshot.potential_states() {
                for &alternative in potential {
                    let (x, y) = self.adversary_location(alternative, index)?;
                    self.grid.set(x, y, Cell::AdversaryBelief)?;
                }
            }
        }

        self.draw_actions(snapshot, ego_x, ego_y, selected.as_deref())?;

        for index in 0..self.annotation.nr_interactive_landmarks() {
            self.draw_interactive_landmark(snapshot, index)?;
        }

        if let Some(label) = frame_label {
            self.figure.add(Artist::Text {
                panel: Panel::Info,
                x: 0.05,
                y: FRAME_LABEL_TOP,
                text: label.to_string(),
                style: TextStyle::boxed(palette::with_alpha(palette::WHITE, 0.5)).sized(2),
            });
        }
        Ok(())
    }

    /// Render every snapshot of `trace` into a video file chosen by suffix
    pub fn record(&mut self, path: &Path, trace: &Trace) -> Result<usize, RenderError> {
        check_recordable(trace)?;
        let mut sink = video::open_sink(path, &self.config)?;
        let frames = self.record_frames(sink.as_mut(), trace)?;
        info!("Wrote {} frames to {}", frames, path.display());
        Ok(frames)
    }

    /// Render every snapshot of `trace` into `sink`
    pub fn record_to<S: FrameSink + ?Sized>(&mut self, sink: &mut S, trace: &Trace) -> Result<usize, RenderError> {
        check_recordable(trace)?;
        self.record_frames(sink, trace)
    }

    fn record_frames<S: FrameSink + ?Sized>(&mut self, sink: &mut S, trace: &Trace) -> Result<usize, RenderError> {
        let result = video::with_sink(sink, |sink: &mut S| -> Result<usize, RenderError> {
            let mut frames = 0;
            for snapshot in trace {
                let label = self.config.show_frame_count.then_some(snapshot.index() + 1);
                self.render(&snapshot, label)?;
                sink.grab_frame(&self.draw()?)?;
                frames += 1;
            }
            Ok(frames)
        });
        self.wipe();
        result
    }

    fn static_grid(&self) -> Result<OccupancyGrid, RenderError> {
        let mut grid = OccupancyGrid::new(self.bounds);
        if self.annotation.has_traps() {
            for state in self.model.states_with_label(self.annotation.traps_label()?)? {
                let (x, y) = self.ego_location(state)?;
                grid.set(x, y, Cell::Trap)?;
            }
        }
        if self.annotation.has_static_targets() {
            let cell = if self.annotation.has_goal_action() {
                Cell::GoalArea
            } else {
                Cell::Goal
            };
            for state in self.model.states_with_label(self.annotation.target_label()?)? {
                let (x, y) = self.ego_location(state)?;
                grid.set(x, y, cell)?;
            }
        }
        if self.annotation.has_landmarks() {
            for state in self.model.states_with_label(self.annotation.landmark_label()?)? {
                let (x, y) = self.ego_location(state)?;
                grid.set(x, y, Cell::Landmark)?;
            }
        }
        if let Some(label) = self.annotation.adv_goal_label() {
            for state in self.model.states_with_label(label)? {
                let (x, y) = self.adversary_location(state, 0)?;
                grid.set(x, y, Cell::AdversaryGoal)?;
            }
        }
        Ok(grid)
    }

    fn ego_location(&self, state: StateId) -> Result<(i64, i64), RenderError> {
        let x = self.model.integer_value(state, &self.annotation.ego_xvar_identifier()?)?;
        let y = self.model.integer_value(state, &self.annotation.ego_yvar_identifier()?)?;
        Ok(self.bounds.check(x, y)?)
    }

    fn adversary_location(&self, state: StateId, index: usize) -> Result<(i64, i64), RenderError> {
        let x = self.model.integer_value(state, &self.annotation.adv_xvar_identifier(index)?)?;
        let y = self.model.integer_value(state, &self.annotation.adv_yvar_identifier(index)?)?;
        Ok(self.bounds.check(x, y)?)
    }

    fn adversary_direction(&self, state: StateId, index: usize) -> Result<Option<Direction>, RenderError> {
        if !self.annotation.adv_has_direction() {
            return Ok(None);
        }
        let value = self.model.integer_value(state, &self.annotation.adv_dir_identifier(index)?)?;
        Ok(Some(self.annotation.adversary_direction_value_to_direction(value)?))
    }

    fn landmark_status(&self, state: StateId, index: usize) -> Result<LandmarkStatus, RenderError> {
        let status_var = self.annotation.interactive_landmark_status_identifier(index)?;
        let clearance_var = self.annotation.interactive_landmark_clearance_identifier(index)?;
        let status = self.model.boolean_value(state, &status_var)?;
        let cleared = self.model.boolean_value(state, &clearance_var)?;
        Ok(LandmarkStatus::from_flags(cleared, status))
    }

    /// First label of a choice, `None` for the end of the trace or an
    /// unlabelled choice
    fn action_label(&self, state: StateId, action: Option<ActionIndex>) -> Result<Option<String>, RenderError> {
        let Some(action) = action else {
            return Ok(None);
        };
        let labels = self.model.choice_labels(state, action)?;
        if labels.len() > 1 {
            warn!(
                "Choice {} of state {} carries {} labels, showing {:?}",
                action,
                state,
                labels.len(),
                labels.first()
            );
        }
        Ok(labels.into_iter().next())
    }

    fn action_labels_of(&self, state: StateId, actions: &[ActionIndex]) -> Result<BTreeSet<String>, RenderError> {
        let mut labels = BTreeSet::new();
        for &action in actions {
            if let Some(label) = self.action_label(state, Some(action))? {
                labels.insert(label);
            }
        }
        Ok(labels)
    }

    fn draw_box(&mut self, area: &BoxConstants, style: ShapeStyle) -> Result<(), RenderError> {
        let xmin = self.model.integer_constant(&area.xmin)?;
        let ymin = self.model.integer_constant(&area.ymin)?;
        let xmax = self.model.integer_constant(&area.xmax)?;
        let ymax = self.model.integer_constant(&area.ymax)?;
        self.figure.add(Artist::Rect {
            panel: Panel::Grid,
            x: xmin as f32,
            y: ymin as f32,
            w: (xmax - xmin + 1) as f32,
            h: (ymax - ymin + 1) as f32,
            style,
        });
        Ok(())
    }

    fn draw_view_area(&mut self, area: Option<(i64, i64, i64, i64)>, style: ShapeStyle) {
        if let Some((xmin, ymin, xmax, ymax)) = area {
            self.figure.add(Artist::Rect {
                panel: Panel::Grid,
                x: xmin as f32,
                y: ymin as f32,
                w: (xmax - xmin + 1) as f32,
                h: (ymax - ymin + 1) as f32,
                style,
            });
        }
    }

    fn draw_ego(&mut self, x: i64, y: i64, radius: ViewRadius) {
        self.figure.add(Artist::Rect {
            panel: Panel::Grid,
            x: x as f32 + 0.25,
            y: y as f32 + 0.25,
            w: 0.5,
            h: 0.5,
            style: ShapeStyle::filled(palette::BLUE, palette::BLUE),
        });
        let area = radius.area(x, y, self.bounds);
        self.draw_view_area(area, view_area_style(palette::BLUE, 0.05, Hatch::Dots, 3.0));
        self.figure.add(Artist::Text {
            panel: Panel::Info,
            x: 0.05,
            y: EGO_INFO_TOP,
            text: format!("x={},y={}", x, y),
            style: TextStyle::boxed(palette::with_alpha(palette::WHEAT, 0.5)),
        });
    }

    fn draw_adversary(&mut self, index: usize, x: i64, y: i64, direction: Option<Direction>) {
        let style = ShapeStyle::filled(palette::SIENNA, palette::SADDLE_BROWN);
        let marker = match direction {
            None => Artist::Rect {
                panel: Panel::Grid,
                x: x as f32 + 0.25,
                y: y as f32 + 0.25,
                w: 0.5,
                h: 0.5,
                style,
            },
            Some(direction) => Artist::Polygon {
                panel: Panel::Grid,
                center: (x as f32 + 0.5, y as f32 + 0.5),
                sides: 3,
                radius: 0.35,
                rotation: direction.rotation(),
                style,
            },
        };
        self.figure.add(marker);

        let area = self.adv_radius.area(x, y, self.bounds);
        self.draw_view_area(area, view_area_style(palette::RED, 0.1, Hatch::Cross, 1.0));

        let text = match direction {
            None => format!("x={},y={}", x, y),
            Some(direction) => format!("x={},y={},d={}", x, y, direction),
        };
        self.figure.add(Artist::Text {
            panel: Panel::Info,
            x: 0.05,
            y: ADVERSARY_INFO_TOP + INFO_LINE * index as f32,
            text,
            style: TextStyle::boxed(palette::with_alpha(palette::LAVENDER, 0.5)),
        });
    }

    fn draw_resources(&mut self, state: StateId) -> Result<(), RenderError> {
        let maxima = self.annotation.max_resource_level_constants()?;
        for (slot, name) in self.resource_names.iter().enumerate() {
            let level = self.model.integer_value(state, &self.annotation.resource_identifier(slot)?)?;
            let constant = maxima.get(slot).ok_or(AnnotationError::IndexOutOfRange {
                role: "resource-maximum-constant",
                index: slot,
                len: maxima.len(),
            })?;
            let maximum = self.model.integer_constant(constant)?;
            if maximum == 0 {
                return Err(RenderError::ZeroResourceMaximum(name.clone()));
            }
            self.figure.add(Artist::Bar {
                slot,
                level: level as f32 / maximum as f32,
                color: palette::BLACK,
            });
        }
        Ok(())
    }

    fn draw_actions(
        &mut self,
        snapshot: &Snapshot<'_>,
        ego_x: i64,
        ego_y: i64,
        selected: Option<&str>,
    ) -> Result<(), RenderError> {
        let state = snapshot.state();
        let available = self.action_labels_of(state, snapshot.available_actions())?;
        let considered = self.action_labels_of(state, snapshot.considered_actions())?;
        let selected = selected.or(Some(END_OF_TRACE));
        let width = self.action_labels.iter().map(|label| label.chars().count()).max().unwrap_or(0);

        for (line, label) in self.action_labels.iter().enumerate() {
            let style = classify_action(label, &available, &considered, selected);
            self.figure.add(Artist::Text {
                panel: Panel::Info,
                x: 0.05,
                y: LEGEND_TOP + INFO_LINE * line as f32,
                text: format!("{:<width$}", label, width = width),
                style: TextStyle::boxed(style.background()),
            });

            let (Some(delta), Some(color)) = (
                cardinal_offset(label),
                arrow_color(label, &available, &considered, selected),
            ) else {
                continue;
            };
            self.figure.add(Artist::Arrow {
                panel: Panel::Grid,
                start: (ego_x as f32 + 0.5, ego_y as f32 + 0.5),
                delta,
                head_width: ARROW_HEAD_WIDTH,
                color,
            });
        }
        Ok(())
    }

    fn draw_interactive_landmark(&mut self, snapshot: &Snapshot<'_>, index: usize) -> Result<(), RenderError> {
        let (x_constant, y_constant) = self.annotation.interactive_landmark_constants(index)?;
        let (x, y) = self.bounds.check(
            self.model.integer_constant(x_constant)?,
            self.model.integer_constant(y_constant)?,
        )?;
        let status = self.landmark_status(snapshot.state(), index)?;
        let potential = snapshot
            .potential_states()
            .unwrap_or(&[])
            .iter()
            .map(|&state| self.landmark_status(state, index))
            .collect::<Result<Vec<_>, _>>()?;
        let belief = landmark_belief(status, &potential);

        let color = match status {
            LandmarkStatus::Cleared => return Ok(()),
            LandmarkStatus::Positive => palette::DARK_GREEN,
            LandmarkStatus::Negative => palette::DARK_RED,
        };
        self.figure.add(Artist::Polygon {
            panel: Panel::Grid,
            center: (x as f32 + 0.5, y as f32 + 0.5),
            sides: 7,
            radius: 0.35,
            rotation: 0.0,
            style: ShapeStyle::filled(color, color),
        });
        self.figure.add(Artist::Text {
            panel: Panel::Grid,
            x: x as f32 + 0.6,
            y: y as f32 + 0.6,
            text: belief.symbol().to_string(),
            style: TextStyle::boxed(palette::YELLOW),
        });
        self.figure.add(Artist::Text {
            panel: Panel::Grid,
            x: x as f32 + 0.3,
            y: y as f32 + 0.3,
            text: (index + 1).to_string(),
            style: TextStyle::boxed(palette::with_alpha(palette::WHITE, 0.7)),
        });
        Ok(())
    }
}
