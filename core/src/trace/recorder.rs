//! Collecting traces episode by episode
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::debug;
use serde::{Deserialize, Serialize};

use super::{Trace, TraceError};
use crate::model::{ActionIndex, StateId};

/// Sink for the events of a simulated episode
///
/// Implemented by [`TraceRecorder`] and by anything wrapping one, so a
/// simulation driver does not care whether traces are only stored or also
/// rendered later.
pub trait EpisodeRecorder {
    fn start_path(&mut self) -> Result<(), TraceError>;

    fn end_path(&mut self, finished: bool) -> Result<(), TraceError>;

    /// Drop the open episode without retaining it
    fn discard_path(&mut self);

    fn record_state(&mut self, state: StateId) -> Result<(), TraceError>;

    fn record_selected_action(&mut self, action: ActionIndex) -> Result<(), TraceError>;

    fn record_available_actions(&mut self, actions: Vec<ActionIndex>) -> Result<(), TraceError>;

    fn record_allowed_actions(&mut self, actions: Vec<ActionIndex>) -> Result<(), TraceError>;

    fn record_potential_states(&mut self, states: Vec<StateId>) -> Result<(), TraceError>;
}

/// Retention and trace-kind options for a recorder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Keep only episodes that reached a done state
    pub only_keep_finishers: bool,

    /// Record belief traces
    pub track_beliefs: bool,
}

/// Stores completed episodes as traces
#[derive(Debug, Default)]
pub struct TraceRecorder {
    config: RecorderConfig,
    paths: Vec<Trace>,
    path: Option<Trace>,
}

impl TraceRecorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            paths: Vec::new(),
            path: None,
        }
    }

    pub fn config(&self) -> RecorderConfig {
        self.config
    }

    /// Retained traces in recording order
    pub fn traces(&self) -> &[Trace] {
        &self.paths
    }

    pub fn into_traces(self) -> Vec<Trace> {
        self.paths
    }

    pub fn is_recording(&self) -> bool {
        self.path.is_some()
    }

    /// Remove the last `length` steps from every retained trace
    pub fn trim_from_end(&mut self, length: usize) {
        for path in &mut self.paths {
            path.trim_from_end(length);
        }
    }

    fn open_path(&mut self) -> Result<&mut Trace, TraceError> {
        self.path.as_mut().ok_or(TraceError::NoOpenPath)
    }
}

impl EpisodeRecorder for TraceRecorder {
    fn start_path(&mut self) -> Result<(), TraceError> {
        if self.path.is_some() {
            return Err(TraceError::PathAlreadyOpen);
        }
        self.path = Some(if self.config.track_beliefs {
            Trace::with_beliefs()
        } else {
            Trace::new()
        });
        Ok(())
    }

    fn end_path(&mut self, finished: bool) -> Result<(), TraceError> {
        let mut path = self.path.take().ok_or(TraceError::NoOpenPath)?;
        path.append_action(None);
        if !self.config.only_keep_finishers || finished {
            debug!("Keeping path of length {}", path.len());
            self.paths.push(path);
        } else {
            debug!("Dropping unfinished path of length {}", path.len());
        }
        Ok(())
    }

    fn discard_path(&mut self) {
        if let Some(path) = self.path.take() {
            debug!("Discarding open path of length {}", path.len());
        }
    }

    fn record_state(&mut self, state: StateId) -> Result<(), TraceError> {
        self.open_path()?.append_state(state);
        Ok(())
    }

    fn record_selected_action(&mut self, action: ActionIndex) -> Result<(), TraceError> {
        self.open_path()?.append_action(Some(action));
        Ok(())
    }

    fn record_available_actions(&mut self, actions: Vec<ActionIndex>) -> Result<(), TraceError> {
        self.open_path()?.append_available_actions(actions);
        Ok(())
    }

    fn record_allowed_actions(&mut self, actions: Vec<ActionIndex>) -> Result<(), TraceError> {
        self.open_path()?.append_considered_actions(actions);
        Ok(())
    }

    fn record_potential_states(&mut self, states: Vec<StateId>) -> Result<(), TraceError> {
        self.open_path()?.append_potential_states(states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_episode(recorder: &mut TraceRecorder, steps: u64, finished: bool) {
        recorder.start_path().unwrap();
        recorder.record_state(StateId(0)).unwrap();
        for step in 0..steps {
            recorder.record_available_actions(vec![ActionIndex(0)]).unwrap();
            recorder.record_allowed_actions(vec![ActionIndex(0)]).unwrap();
            recorder.record_selected_action(ActionIndex(0)).unwrap();
            recorder.record_state(StateId(step + 1)).unwrap();
        }
        recorder.record_available_actions(vec![]).unwrap();
        recorder.record_allowed_actions(vec![]).unwrap();
        recorder.end_path(finished).unwrap();
    }

    #[test]
    fn test_start_twice_fails() {
        let mut recorder = TraceRecorder::default();
        recorder.start_path().unwrap();
        assert_eq!(recorder.start_path(), Err(TraceError::PathAlreadyOpen));
    }

    #[test]
    fn test_record_without_path_fails() {
        let mut recorder = TraceRecorder::default();
        assert_eq!(recorder.record_state(StateId(0)), Err(TraceError::NoOpenPath));
        assert_eq!(recorder.end_path(true), Err(TraceError::NoOpenPath));
    }

    #[test]
    fn test_discard_path_reopens() {
        let mut recorder = TraceRecorder::default();
        recorder.start_path().unwrap();
        recorder.record_state(StateId(0)).unwrap();
        recorder.discard_path();
        assert!(!recorder.is_recording());
        assert!(recorder.traces().is_empty());

        record_episode(&mut recorder, 1, true);
        assert_eq!(recorder.traces().len(), 1);
        recorder.discard_path();
        assert_eq!(recorder.traces().len(), 1);
    }

    #[test]
    fn test_end_path_closes_with_sentinel() {
        let mut recorder = TraceRecorder::default();
        record_episode(&mut recorder, 2, false);
        assert!(!recorder.is_recording());

        let trace = &recorder.traces()[0];
        assert_eq!(trace.len(), 3);
        assert!(trace.check_validity().is_ok());
        assert_eq!(trace.snapshot(2).unwrap().action(), None);
    }

    #[test]
    fn test_only_keep_finishers() {
        let mut recorder = TraceRecorder::new(RecorderConfig {
            only_keep_finishers: true,
            ..RecorderConfig::default()
        });
        record_episode(&mut recorder, 2, false);
        record_episode(&mut recorder, 3, true);
        assert_eq!(recorder.traces().len(), 1);
        assert_eq!(recorder.traces()[0].len(), 4);

        let mut keep_all = TraceRecorder::default();
        record_episode(&mut keep_all, 2, false);
        record_episode(&mut keep_all, 3, true);
        assert_eq!(keep_all.traces().len(), 2);
    }

    #[test]
    fn test_trim_applies_to_all_traces() {
        let mut recorder = TraceRecorder::default();
        record_episode(&mut recorder, 2, true);
        record_episode(&mut recorder, 4, true);
        recorder.trim_from_end(1);
        let lengths: Vec<_> = recorder.traces().iter().map(Trace::len).collect();
        assert_eq!(lengths, vec![2, 4]);
        assert!(recorder.traces().iter().all(|t| t.check_validity().is_ok()));
    }

    #[test]
    fn test_belief_recording() {
        let mut recorder = TraceRecorder::new(RecorderConfig {
            track_beliefs: true,
            ..RecorderConfig::default()
        });
        recorder.start_path().unwrap();
        recorder.record_state(StateId(0)).unwrap();
        recorder.record_potential_states(vec![StateId(0), StateId(1)]).unwrap();
        recorder.record_available_actions(vec![]).unwrap();
        recorder.record_allowed_actions(vec![]).unwrap();
        recorder.end_path(true).unwrap();

        let trace = &recorder.into_traces()[0];
        assert!(trace.is_belief_trace());
        assert!(trace.check_validity().is_ok());

        let mut plain = TraceRecorder::default();
        plain.start_path().unwrap();
        assert_eq!(
            plain.record_potential_states(vec![StateId(0)]),
            Err(TraceError::NotABeliefTrace)
        );
    }
}
