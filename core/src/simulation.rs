//! Driving a simulator and feeding an episode recorder
//!
//! The executor restarts the simulator for every episode, lets an
//! [`ActionSelector`] pick actions until the simulator reports a done state
//! or the step budget runs out, and records everything it sees.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ActionIndex, BeliefSupport, ModelError, Simulator, StateId};
use crate::trace::{EpisodeRecorder, TraceError};

/// Error types for simulation runs
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    #[error("No action to select in state {0}")]
    NoActions(StateId),
}

/// Chooses the action to take at each step
pub trait ActionSelector {
    /// Actions the visualised policy considers in `state`
    fn allowed_actions(&mut self, _state: StateId, available: &[ActionIndex]) -> Vec<ActionIndex> {
        available.to_vec()
    }

    /// Pick one of the allowed actions, `None` if there is nothing to pick
    fn select(&mut self, state: StateId, allowed: &[ActionIndex]) -> Option<ActionIndex>;
}

/// Uniformly random action selection with a fixed seed
#[derive(Debug)]
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ActionSelector for RandomSelector {
    fn select(&mut self, _state: StateId, allowed: &[ActionIndex]) -> Option<ActionIndex> {
        if allowed.is_empty() {
            return None;
        }
        Some(allowed[self.rng.gen_range(0..allowed.len())])
    }
}

/// Episode budget of a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Stop once this many episodes reached a done state
    pub nr_good_runs: usize,

    /// Upper bound on the number of episodes
    pub total_nr_runs: usize,

    /// Upper bound on the steps of one episode
    pub max_steps: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            nr_good_runs: 1,
            total_nr_runs: 5,
            max_steps: 200,
        }
    }
}

/// Runs episodes on a simulator
pub struct SimulationExecutor<'b, S, A> {
    simulator: S,
    selector: A,
    beliefs: Option<&'b dyn BeliefSupport>,
}

impl<'b, S: Simulator, A: ActionSelector> SimulationExecutor<'b, S, A> {
    pub fn new(simulator: S, selector: A) -> Self {
        Self {
            simulator,
            selector,
            beliefs: None,
        }
    }

    /// Record the potential states of every visited state
    pub fn with_beliefs(mut self, beliefs: &'b dyn BeliefSupport) -> Self {
        self.beliefs = Some(beliefs);
        self
    }

    fn record_state<R: EpisodeRecorder + ?Sized>(
        &self,
        recorder: &mut R,
        state: StateId,
    ) -> Result<(), SimulationError> {
        recorder.record_state(state)?;
        if let Some(beliefs) = self.beliefs {
            recorder.record_potential_states(beliefs.potential_states(state)?)?;
        }
        Ok(())
    }

    /// Simulate episodes, returning per episode whether it reached a done state
    ///
    /// An episode that fails midway is discarded from the recorder before the
    /// error is returned, so the recorder can be reused.
    pub fn simulate<R: EpisodeRecorder + ?Sized>(
        &mut self,
        recorder: &mut R,
        config: &SimulationConfig,
    ) -> Result<Vec<bool>, SimulationError> {
        let mut result = Vec::new();
        let mut good_runs = 0;
        for _ in 0..config.total_nr_runs {
            let state = self.simulator.restart()?;
            info!("Start new episode.");
            recorder.start_path()?;
            let finished = match self.run_episode(recorder, state, config.max_steps) {
                Ok(finished) => finished,
                Err(err) => {
                    recorder.discard_path();
                    return Err(err);
                }
            };
            if finished {
                good_runs += 1;
            }
            result.push(self.simulator.is_done());
            if good_runs == config.nr_good_runs {
                break;
            }
        }
        Ok(result)
    }

    fn run_episode<R: EpisodeRecorder + ?Sized>(
        &mut self,
        recorder: &mut R,
        mut state: StateId,
        max_steps: usize,
    ) -> Result<bool, SimulationError> {
        let mut finished = false;
        self.record_state(recorder, state)?;

        for step in 0..max_steps {
            let available = self.simulator.available_actions();
            let allowed = self.selector.allowed_actions(state, &available);
            let action = self
                .selector
                .select(state, &allowed)
                .ok_or(SimulationError::NoActions(state))?;
            debug!("Select action: {action}");
            state = self.simulator.step(action)?;
            recorder.record_available_actions(available)?;
            recorder.record_allowed_actions(allowed)?;
            recorder.record_selected_action(action)?;
            self.record_state(recorder, state)?;

            if self.simulator.is_done() {
                info!("Done after {step} steps!");
                finished = true;
                break;
            }
        }

        let available = self.simulator.available_actions();
        let allowed = self.selector.allowed_actions(state, &available);
        recorder.record_available_actions(available)?;
        recorder.record_allowed_actions(allowed)?;
        recorder.end_path(finished)?;
        Ok(finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExplicitModel, ExplicitSimulator};
    use crate::trace::{RecorderConfig, TraceRecorder};
    use serde_json::json;

    fn line_model() -> ExplicitModel {
        ExplicitModel::from_value(json!({
            "states": [
                {
                    "observation": 0,
                    "choices": [{ "labels": ["east"], "transitions": [{ "target": 1, "probability": 1.0 }] }]
                },
                {
                    "observation": 0,
                    "choices": [{ "labels": ["east"], "transitions": [{ "target": 2, "probability": 1.0 }] }]
                },
                { "observation": 1, "labels": ["goal"] }
            ]
        }))
        .unwrap()
    }

    struct FirstAllowed;

    impl ActionSelector for FirstAllowed {
        fn select(&mut self, _state: StateId, allowed: &[ActionIndex]) -> Option<ActionIndex> {
            allowed.first().copied()
        }
    }

    #[test]
    fn test_episode_reaches_goal() {
        let model = line_model();
        let simulator = ExplicitSimulator::new(&model, 1);
        let mut executor = SimulationExecutor::new(simulator, RandomSelector::new(42));
        let mut recorder = TraceRecorder::default();

        let outcome = executor.simulate(&mut recorder, &SimulationConfig::default()).unwrap();
        assert_eq!(outcome, vec![true]);

        let trace = &recorder.traces()[0];
        assert!(trace.check_validity().is_ok());
        let states: Vec<_> = trace.iter().map(|s| s.state()).collect();
        assert_eq!(states, vec![StateId(0), StateId(1), StateId(2)]);
        assert_eq!(trace.snapshot(2).unwrap().action(), None);
        assert!(trace.snapshot(2).unwrap().available_actions().is_empty());
    }

    #[test]
    fn test_step_budget_leaves_episode_unfinished() {
        let model = line_model();
        let simulator = ExplicitSimulator::new(&model, 1);
        let mut executor = SimulationExecutor::new(simulator, FirstAllowed);
        let mut recorder = TraceRecorder::new(RecorderConfig {
            only_keep_finishers: true,
            ..RecorderConfig::default()
        });
        let config = SimulationConfig {
            nr_good_runs: 1,
            total_nr_runs: 3,
            max_steps: 1,
        };

        let outcome = executor.simulate(&mut recorder, &config).unwrap();
        assert_eq!(outcome, vec![false, false, false]);
        assert!(recorder.traces().is_empty());
    }

    #[test]
    fn test_belief_states_recorded() {
        let model = line_model();
        let simulator = ExplicitSimulator::new(&model, 1);
        let mut executor = SimulationExecutor::new(simulator, FirstAllowed).with_beliefs(&model);
        let mut recorder = TraceRecorder::new(RecorderConfig {
            track_beliefs: true,
            ..RecorderConfig::default()
        });

        executor.simulate(&mut recorder, &SimulationConfig::default()).unwrap();
        let trace = &recorder.traces()[0];
        assert!(trace.check_validity().is_ok());
        assert_eq!(
            trace.snapshot(0).unwrap().potential_states().unwrap(),
            &[StateId(0), StateId(1)]
        );
        assert_eq!(trace.snapshot(2).unwrap().potential_states().unwrap(), &[StateId(2)]);
    }

    #[test]
    fn test_no_actions_is_an_error() {
        let model = line_model();
        let mut simulator = ExplicitSimulator::new(&model, 1);
        simulator.restart().unwrap();

        struct Nothing;
        impl ActionSelector for Nothing {
            fn select(&mut self, _state: StateId, _allowed: &[ActionIndex]) -> Option<ActionIndex> {
                None
            }
        }

        let mut executor = SimulationExecutor::new(simulator, Nothing);
        let mut recorder = TraceRecorder::default();
        let result = executor.simulate(&mut recorder, &SimulationConfig::default());
        assert!(matches!(result, Err(SimulationError::NoActions(StateId(0)))));
        assert!(!recorder.is_recording());
        assert!(recorder.traces().is_empty());
    }

    #[test]
    fn test_recorder_reusable_after_failed_episode() {
        let model = line_model();

        struct Nothing;
        impl ActionSelector for Nothing {
            fn select(&mut self, _state: StateId, _allowed: &[ActionIndex]) -> Option<ActionIndex> {
                None
            }
        }

        let mut recorder = TraceRecorder::default();
        let mut failing = SimulationExecutor::new(ExplicitSimulator::new(&model, 1), Nothing);
        assert!(failing.simulate(&mut recorder, &SimulationConfig::default()).is_err());

        let mut executor = SimulationExecutor::new(ExplicitSimulator::new(&model, 1), FirstAllowed);
        let outcome = executor.simulate(&mut recorder, &SimulationConfig::default()).unwrap();
        assert_eq!(outcome, vec![true]);
        assert_eq!(recorder.traces().len(), 1);
        assert!(recorder.traces()[0].check_validity().is_ok());
    }
}
