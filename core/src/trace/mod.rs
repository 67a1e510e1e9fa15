//! Episode traces of simulated paths
//!
//! A [`Trace`] is an append-only log of the states visited in one episode
//! together with the selected, available and considered actions at each
//! step. Belief traces additionally record the set of states the agent
//! cannot distinguish from the true state.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod recorder;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ActionIndex, StateId};

pub use recorder::{EpisodeRecorder, RecorderConfig, TraceRecorder};

/// Error types for trace recording and validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TraceError {
    #[error("A path is already being recorded")]
    PathAlreadyOpen,

    #[error("No path is being recorded")]
    NoOpenPath,

    #[error("Potential states can only be recorded on belief traces")]
    NotABeliefTrace,

    #[error("Invalid path (nr {left} {left_len} and nr {right} {right_len} do not match)")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },
}

/// Recorded path through a model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    states: Vec<StateId>,

    /// `None` marks the end of the episode
    actions: Vec<Option<ActionIndex>>,

    available_actions: Vec<Vec<ActionIndex>>,

    considered_actions: Vec<Vec<ActionIndex>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    potential_states: Option<Vec<Vec<StateId>>>,
}

impl Trace {
    /// Create an empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty belief trace
    pub fn with_beliefs() -> Self {
        Self {
            potential_states: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn is_belief_trace(&self) -> bool {
        self.potential_states.is_some()
    }

    pub fn append_state(&mut self, state: StateId) {
        self.states.push(state);
    }

    pub fn append_action(&mut self, action: Option<ActionIndex>) {
        self.actions.push(action);
    }

    pub fn append_available_actions(&mut self, actions: Vec<ActionIndex>) {
        self.available_actions.push(actions);
    }

    pub fn append_considered_actions(&mut self, actions: Vec<ActionIndex>) {
        self.considered_actions.push(actions);
    }

    pub fn append_potential_states(&mut self, states: Vec<StateId>) -> Result<(), TraceError> {
        self.potential_states
            .as_mut()
            .ok_or(TraceError::NotABeliefTrace)?
            .push(states);
        Ok(())
    }

    /// Number of recorded states
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Drop the last `length` entries of every sequence
    pub fn trim_from_end(&mut self, length: usize) {
        fn trim<T>(items: &mut Vec<T>, length: usize) {
            items.truncate(items.len().saturating_sub(length));
        }

        trim(&mut self.states, length);
        trim(&mut self.actions, length);
        trim(&mut self.available_actions, length);
        trim(&mut self.considered_actions, length);
        if let Some(potential) = self.potential_states.as_mut() {
            trim(potential, length);
        }
    }

    /// Verify that all per-step sequences have the same length
    pub fn check_validity(&self) -> Result<(), TraceError> {
        let states = ("states", self.states.len());
        let mut others = vec![
            ("actions", self.actions.len()),
            ("available action sets", self.available_actions.len()),
            ("considered action sets", self.considered_actions.len()),
        ];
        if let Some(potential) = &self.potential_states {
            others.push(("potential state sets", potential.len()));
        }

        let mut previous = states;
        for current in others {
            if current.1 != previous.1 {
                return Err(TraceError::LengthMismatch {
                    left: previous.0,
                    left_len: previous.1,
                    right: current.0,
                    right_len: current.1,
                });
            }
            previous = current;
        }
        Ok(())
    }

    /// Snapshot of a single step, if it exists
    pub fn snapshot(&self, index: usize) -> Option<Snapshot<'_>> {
        (index < self.len()).then_some(Snapshot { trace: self, index })
    }

    /// Iterate over snapshots in recorded order
    pub fn iter(&self) -> Snapshots<'_> {
        Snapshots { trace: self, next: 0 }
    }
}

impl<'t> IntoIterator for &'t Trace {
    type Item = Snapshot<'t>;
    type IntoIter = Snapshots<'t>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Read-only view of one step of a trace
///
/// Accessors assume a trace that passed [`Trace::check_validity`]; on an
/// unvalidated trace missing entries read as empty.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'t> {
    trace: &'t Trace,
    index: usize,
}

impl<'t> Snapshot<'t> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> StateId {
        self.trace.states[self.index]
    }

    pub fn action(&self) -> Option<ActionIndex> {
        self.trace.actions.get(self.index).copied().flatten()
    }

    pub fn available_actions(&self) -> &'t [ActionIndex] {
        self.trace
            .available_actions
            .get(self.index)
            .map_or(&[], Vec::as_slice)
    }

    pub fn considered_actions(&self) -> &'t [ActionIndex] {
        self.trace
            .considered_actions
            .get(self.index)
            .map_or(&[], Vec::as_slice)
    }

    /// Indistinguishable states, `None` unless this is a belief trace
    pub fn potential_states(&self) -> Option<&'t [StateId]> {
        let potential = self.trace.potential_states.as_ref()?;
        Some(potential.get(self.index).map_or(&[], Vec::as_slice))
    }
}

/// One-shot iterator over the snapshots of a trace
#[derive(Debug, Clone)]
pub struct Snapshots<'t> {
    trace: &'t Trace,
    next: usize,
}

impl<'t> Iterator for Snapshots<'t> {
    type Item = Snapshot<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let snapshot = self.trace.snapshot(self.next)?;
        self.next += 1;
        Some(snapshot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.trace.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Snapshots<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_step_trace(beliefs: bool) -> Trace {
        let mut trace = if beliefs { Trace::with_beliefs() } else { Trace::new() };
        for step in 0..3u64 {
            trace.append_state(StateId(step));
            trace.append_available_actions(vec![ActionIndex(0), ActionIndex(1)]);
            trace.append_considered_actions(vec![ActionIndex(0)]);
            trace.append_action(if step < 2 { Some(ActionIndex(0)) } else { None });
            if beliefs {
                trace.append_potential_states(vec![StateId(step), StateId(10 + step)]).unwrap();
            }
        }
        trace
    }

    #[test]
    fn test_valid_trace() {
        let trace = three_step_trace(false);
        assert_eq!(trace.len(), 3);
        assert!(trace.check_validity().is_ok());
    }

    #[test]
    fn test_missing_action_is_invalid() {
        let mut trace = Trace::new();
        for step in 0..3u64 {
            trace.append_state(StateId(step));
            trace.append_available_actions(vec![]);
            trace.append_considered_actions(vec![]);
        }
        trace.append_action(Some(ActionIndex(0)));
        trace.append_action(Some(ActionIndex(0)));

        assert_eq!(
            trace.check_validity(),
            Err(TraceError::LengthMismatch {
                left: "states",
                left_len: 3,
                right: "actions",
                right_len: 2,
            })
        );
    }

    #[test]
    fn test_missing_available_actions_is_invalid() {
        let mut trace = three_step_trace(false);
        trace.available_actions.pop();
        assert!(matches!(
            trace.check_validity(),
            Err(TraceError::LengthMismatch { right: "available action sets", .. })
        ));
    }

    #[test]
    fn test_missing_potential_states_is_invalid() {
        let mut trace = three_step_trace(true);
        trace.potential_states.as_mut().unwrap().pop();
        assert!(trace.check_validity().is_err());
    }

    #[test]
    fn test_trim_reduces_every_sequence() {
        let mut trace = three_step_trace(true);
        trace.trim_from_end(2);
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.actions.len(), 1);
        assert_eq!(trace.available_actions.len(), 1);
        assert_eq!(trace.considered_actions.len(), 1);
        assert_eq!(trace.potential_states.as_ref().unwrap().len(), 1);
        assert!(trace.check_validity().is_ok());
    }

    #[test]
    fn test_trim_zero_is_noop() {
        let mut trace = three_step_trace(true);
        let before = trace.clone();
        trace.trim_from_end(0);
        assert_eq!(trace, before);
    }

    #[test]
    fn test_trim_beyond_length_empties() {
        let mut trace = three_step_trace(false);
        trace.trim_from_end(10);
        assert!(trace.is_empty());
        assert!(trace.check_validity().is_ok());
    }

    #[test]
    fn test_iteration_in_order_and_restartable() {
        let trace = three_step_trace(false);
        let states: Vec<_> = trace.iter().map(|s| s.state()).collect();
        assert_eq!(states, vec![StateId(0), StateId(1), StateId(2)]);

        let mut iter = trace.iter();
        assert_eq!(iter.len(), 3);
        iter.by_ref().for_each(drop);
        assert!(iter.next().is_none());

        assert_eq!(trace.iter().count(), 3);
    }

    #[test]
    fn test_snapshot_accessors() {
        let trace = three_step_trace(true);
        let first = trace.snapshot(0).unwrap();
        assert_eq!(first.action(), Some(ActionIndex(0)));
        assert_eq!(first.available_actions(), &[ActionIndex(0), ActionIndex(1)]);
        assert_eq!(first.considered_actions(), &[ActionIndex(0)]);
        assert_eq!(first.potential_states(), Some(&[StateId(0), StateId(10)][..]));

        let last = trace.snapshot(2).unwrap();
        assert_eq!(last.action(), None);
        assert!(trace.snapshot(3).is_none());

        let plain = three_step_trace(false);
        assert!(plain.snapshot(0).unwrap().potential_states().is_none());
    }

    #[test]
    fn test_potential_states_need_belief_trace() {
        let mut trace = Trace::new();
        assert_eq!(
            trace.append_potential_states(vec![StateId(0)]),
            Err(TraceError::NotABeliefTrace)
        );
    }

    #[test]
    fn test_serde_keeps_belief_sets() {
        let trace = three_step_trace(true);
        let json = serde_json::to_string(&trace).unwrap();
        let back: Trace = serde_json::from_str(&json).unwrap();
        assert!(back.is_belief_trace());
        assert_eq!(back, trace);
    }
}

#[cfg(test)]
mod proptest_trace {
    use super::*;
    use proptest::prelude::*;

    /// Well-formed trace of the given length, ending with the sentinel action
    fn arb_trace() -> impl Strategy<Value = Trace> {
        (0u64..24, any::<bool>(), prop::collection::vec(0u64..4, 24)).prop_map(|(len, beliefs, picks)| {
            let mut trace = if beliefs { Trace::with_beliefs() } else { Trace::new() };
            for step in 0..len {
                let pick = picks[step as usize];
                trace.append_state(StateId(step));
                trace.append_available_actions((0..=pick).map(ActionIndex).collect());
                trace.append_considered_actions(vec![ActionIndex(pick)]);
                trace.append_action((step + 1 < len).then_some(ActionIndex(pick)));
                if beliefs {
                    trace.append_potential_states(vec![StateId(step), StateId(step + pick)]).unwrap();
                }
            }
            trace
        })
    }

    fn sequence_lengths(trace: &Trace) -> Vec<usize> {
        let mut lengths = vec![
            trace.states.len(),
            trace.actions.len(),
            trace.available_actions.len(),
            trace.considered_actions.len(),
        ];
        if let Some(potential) = &trace.potential_states {
            lengths.push(potential.len());
        }
        lengths
    }

    proptest! {
        /// Trimming by n shortens every sequence by n, down to empty
        #[test]
        fn trim_shortens_every_sequence(trace in arb_trace(), n in 0usize..32) {
            let before = trace.len();
            let mut trimmed = trace.clone();
            trimmed.trim_from_end(n);

            let expected = before.saturating_sub(n);
            prop_assert!(sequence_lengths(&trimmed).iter().all(|len| *len == expected));
            prop_assert!(trimmed.check_validity().is_ok());
            prop_assert_eq!(trimmed.is_belief_trace(), trace.is_belief_trace());
        }

        /// Trimming keeps the surviving prefix untouched
        #[test]
        fn trim_keeps_prefix(trace in arb_trace(), n in 0usize..32) {
            let mut trimmed = trace.clone();
            trimmed.trim_from_end(n);
            for snapshot in &trimmed {
                let original = trace.snapshot(snapshot.index()).unwrap();
                prop_assert_eq!(snapshot.state(), original.state());
                prop_assert_eq!(snapshot.action(), original.action());
                prop_assert_eq!(snapshot.available_actions(), original.available_actions());
                prop_assert_eq!(snapshot.potential_states(), original.potential_states());
            }
        }

        /// Iteration yields one snapshot per state, in recorded order
        #[test]
        fn iteration_visits_every_index(trace in arb_trace()) {
            prop_assert!(trace.check_validity().is_ok());
            let indices: Vec<usize> = trace.iter().map(|snapshot| snapshot.index()).collect();
            prop_assert_eq!(indices, (0..trace.len()).collect::<Vec<_>>());
            prop_assert_eq!(trace.iter().len(), trace.len());
        }

        /// Any missing entry in a per-step sequence is reported
        #[test]
        fn dropped_entry_is_invalid(trace in arb_trace(), which in 0usize..4) {
            prop_assume!(!trace.is_empty());
            let mut broken = trace;
            match which {
                0 => { broken.actions.pop(); }
                1 => { broken.available_actions.pop(); }
                2 => { broken.considered_actions.pop(); }
                _ => { broken.states.pop(); }
            }
            let is_length_mismatch = matches!(broken.check_validity(), Err(TraceError::LengthMismatch { .. }));
            prop_assert!(is_length_mismatch);
        }
    }
}
