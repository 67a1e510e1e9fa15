//! gridtrace visualization: grid frames and videos of recorded traces
//!
//! Renders snapshots of POMDP grid-world traces into RGBA frames and
//! encodes them as GIF or MP4 videos, one file per recorded episode.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

#![forbid(unsafe_code)]

pub mod config;
pub mod figure;
pub mod occupancy;
pub mod palette;
pub mod plot;
pub mod recorder;
pub mod renderer;
pub mod video;

pub use self::config::RenderConfig;
pub use self::occupancy::{Cell, GridBounds, OccupancyGrid, OffGrid};
pub use self::plot::PlotError;
pub use self::recorder::VideoRecorder;
pub use self::renderer::{Phase, Plotter, RenderError};
pub use self::video::{FrameSink, MemorySink, VideoError, VideoFormat};
