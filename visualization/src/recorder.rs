//! Episode recorder that renders its traces to video files
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::path::{Path, PathBuf};

use log::{info, warn};

use gridtrace_core::model::{ActionIndex, ModelView, StateId};
use gridtrace_core::trace::{EpisodeRecorder, RecorderConfig, Trace, TraceError, TraceRecorder};

use crate::renderer::{Plotter, RenderError};
use crate::video::VideoFormat;

/// Collects traces during simulation and writes one video per kept episode
pub struct VideoRecorder<'m, M: ModelView + ?Sized> {
    traces: TraceRecorder,
    renderer: Plotter<'m, M>,
}

impl<'m, M: ModelView + ?Sized> VideoRecorder<'m, M> {
    pub fn new(renderer: Plotter<'m, M>, config: RecorderConfig) -> Self {
        Self {
            traces: TraceRecorder::new(config),
            renderer,
        }
    }

    pub fn traces(&self) -> &[Trace] {
        self.traces.traces()
    }

    pub fn renderer_mut(&mut self) -> &mut Plotter<'m, M> {
        &mut self.renderer
    }

    /// Drop the last `length` steps of every kept trace
    pub fn trim_from_end(&mut self, length: usize) {
        self.traces.trim_from_end(length);
    }

    /// Render every kept trace to `{dir}/{prefix}-{index}.{suffix}`
    ///
    /// Empty traces, e.g. after trimming them completely, are skipped and
    /// keep their index unused.
    pub fn save(&mut self, dir: &Path, prefix: &str, format: VideoFormat) -> Result<Vec<PathBuf>, RenderError> {
        let mut written = Vec::with_capacity(self.traces.traces().len());
        for (index, trace) in self.traces.traces().iter().enumerate() {
            let path = dir.join(format!("{}-{}.{}", prefix, index, format.suffix()));
            if trace.is_empty() {
                warn!("Skipping {}: trace {} is empty", path.display(), index);
                continue;
            }
            info!("Rendering {}", path.display());
            self.renderer.record(&path, trace)?;
            written.push(path);
        }
        Ok(written)
    }
}

impl<'m, M: ModelView + ?Sized> EpisodeRecorder for VideoRecorder<'m, M> {
    fn start_path(&mut self) -> Result<(), TraceError> {
        self.traces.start_path()
    }

    fn end_path(&mut self, finished: bool) -> Result<(), TraceError> {
        self.traces.end_path(finished)
    }

    fn discard_path(&mut self) {
        self.traces.discard_path()
    }

    fn record_state(&mut self, state: StateId) -> Result<(), TraceError> {
        self.traces.record_state(state)
    }

    fn record_selected_action(&mut self, action: ActionIndex) -> Result<(), TraceError> {
        self.traces.record_selected_action(action)
    }

    fn record_available_actions(&mut self, actions: Vec<ActionIndex>) -> Result<(), TraceError> {
        self.traces.record_available_actions(actions)
    }

    fn record_allowed_actions(&mut self, actions: Vec<ActionIndex>) -> Result<(), TraceError> {
        self.traces.record_allowed_actions(actions)
    }

    fn record_potential_states(&mut self, states: Vec<StateId>) -> Result<(), TraceError> {
        self.traces.record_potential_states(states)
    }
}
