//! Explicit, JSON-loadable model and a sampling simulator over it
//!
//! The explicit model lists every state with its variable valuation, labels
//! and labelled choices. It is small enough to write by hand for tests and
//! demos, and it is what the command line tool loads when no external model
//! checker is attached.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{ActionIndex, BeliefSupport, ModelError, ModelView, Simulator, StateId, VariableId};

const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Value of a state variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Bool(bool),
    Int(i64),
}

/// Probabilistic successor of a choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    pub target: u64,
    pub probability: f64,
}

/// Labelled nondeterministic choice of a state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub labels: BTreeSet<String>,
    pub transitions: Vec<Transition>,
}

/// A single state of the explicit model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExplicitState {
    /// module -> variable -> value
    #[serde(default)]
    pub valuation: BTreeMap<String, BTreeMap<String, VariableValue>>,

    #[serde(default)]
    pub labels: BTreeSet<String>,

    #[serde(default)]
    pub choices: Vec<Choice>,

    /// States with equal observations are indistinguishable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<u64>,
}

/// Explicitly enumerated model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExplicitModel {
    /// Integer constants of the program
    #[serde(default)]
    pub constants: BTreeMap<String, i64>,

    /// Labels that exist even though possibly no state carries them
    #[serde(default)]
    pub labels: BTreeSet<String>,

    pub states: Vec<ExplicitState>,

    #[serde(default)]
    pub initial_state: u64,
}

impl ExplicitModel {
    /// Parse and validate a model from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_str(text)?;
        model.validate()?;
        Ok(model)
    }

    /// Parse and validate a model from a JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_value(value)?;
        model.validate()?;
        Ok(model)
    }

    /// Load and validate a model from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Number of states
    pub fn nr_states(&self) -> usize {
        self.states.len()
    }

    /// Initial state handle
    pub fn initial_state(&self) -> StateId {
        StateId(self.initial_state)
    }

    /// Check state references and transition distributions
    pub fn validate(&self) -> Result<(), ModelError> {
        self.state(self.initial_state())?;
        for (index, state) in self.states.iter().enumerate() {
            let id = StateId(index as u64);
            for choice in &state.choices {
                if choice.transitions.is_empty() {
                    return Err(ModelError::InvalidDistribution {
                        state: id,
                        detail: "choice without transitions".to_string(),
                    });
                }
                let mut total = 0.0;
                for transition in &choice.transitions {
                    self.state(StateId(transition.target))?;
                    if !(0.0..=1.0).contains(&transition.probability) {
                        return Err(ModelError::InvalidDistribution {
                            state: id,
                            detail: format!("probability {} out of range", transition.probability),
                        });
                    }
                    total += transition.probability;
                }
                if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
                    return Err(ModelError::InvalidDistribution {
                        state: id,
                        detail: format!("probabilities sum to {total}"),
                    });
                }
            }
        }
        Ok(())
    }

    fn state(&self, id: StateId) -> Result<&ExplicitState, ModelError> {
        usize::try_from(id.0)
            .ok()
            .and_then(|index| self.states.get(index))
            .ok_or(ModelError::UnknownState(id))
    }

    fn choice(&self, state: StateId, action: ActionIndex) -> Result<&Choice, ModelError> {
        usize::try_from(action.0)
            .ok()
            .and_then(|index| self.state(state).ok()?.choices.get(index))
            .ok_or(ModelError::UnknownAction { state, action })
    }

    fn value(&self, state: StateId, variable: &VariableId) -> Result<VariableValue, ModelError> {
        self.state(state)?
            .valuation
            .get(&variable.module)
            .and_then(|module| module.get(&variable.name))
            .copied()
            .ok_or_else(|| ModelError::UnknownVariable {
                state,
                variable: variable.clone(),
            })
    }
}

impl ModelView for ExplicitModel {
    fn integer_value(&self, state: StateId, variable: &VariableId) -> Result<i64, ModelError> {
        match self.value(state, variable)? {
            VariableValue::Int(value) => Ok(value),
            VariableValue::Bool(_) => Err(ModelError::TypeMismatch(variable.clone())),
        }
    }

    fn boolean_value(&self, state: StateId, variable: &VariableId) -> Result<bool, ModelError> {
        match self.value(state, variable)? {
            VariableValue::Bool(value) => Ok(value),
            VariableValue::Int(_) => Err(ModelError::TypeMismatch(variable.clone())),
        }
    }

    fn states_with_label(&self, label: &str) -> Result<Vec<StateId>, ModelError> {
        let states: Vec<StateId> = self
            .states
            .iter()
            .enumerate()
            .filter(|(_, state)| state.labels.contains(label))
            .map(|(index, _)| StateId(index as u64))
            .collect();
        if states.is_empty() && !self.labels.contains(label) {
            return Err(ModelError::UnknownLabel(label.to_string()));
        }
        Ok(states)
    }

    fn choice_labels(&self, state: StateId, action: ActionIndex) -> Result<BTreeSet<String>, ModelError> {
        Ok(self.choice(state, action)?.labels.clone())
    }

    fn all_choice_labels(&self) -> BTreeSet<String> {
        self.states
            .iter()
            .flat_map(|state| state.choices.iter())
            .flat_map(|choice| choice.labels.iter().cloned())
            .collect()
    }

    fn integer_constant(&self, name: &str) -> Result<i64, ModelError> {
        self.constants
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownConstant(name.to_string()))
    }
}

impl BeliefSupport for ExplicitModel {
    fn potential_states(&self, state: StateId) -> Result<Vec<StateId>, ModelError> {
        let Some(observation) = self.state(state)?.observation else {
            return Ok(vec![state]);
        };
        Ok(self
            .states
            .iter()
            .enumerate()
            .filter(|(_, candidate)| candidate.observation == Some(observation))
            .map(|(index, _)| StateId(index as u64))
            .collect())
    }
}

/// Seeded sampling simulator over an [`ExplicitModel`]
///
/// An episode is done once the current state carries the done label, or
/// when it has no outgoing choices.
#[derive(Debug)]
pub struct ExplicitSimulator<'m> {
    model: &'m ExplicitModel,
    rng: StdRng,
    current: StateId,
    done_label: Option<String>,
}

impl<'m> ExplicitSimulator<'m> {
    pub fn new(model: &'m ExplicitModel, seed: u64) -> Self {
        Self {
            model,
            rng: StdRng::seed_from_u64(seed),
            current: model.initial_state(),
            done_label: None,
        }
    }

    /// End episodes in states carrying `label`
    pub fn with_done_label(mut self, label: impl Into<String>) -> Self {
        self.done_label = Some(label.into());
        self
    }

    pub fn current_state(&self) -> StateId {
        self.current
    }
}

impl Simulator for ExplicitSimulator<'_> {
    fn restart(&mut self) -> Result<StateId, ModelError> {
        self.current = self.model.initial_state();
        self.model.state(self.current)?;
        Ok(self.current)
    }

    fn available_actions(&self) -> Vec<ActionIndex> {
        let nr_choices = self.model.state(self.current).map_or(0, |state| state.choices.len());
        (0..nr_choices as u64).map(ActionIndex).collect()
    }

    fn step(&mut self, action: ActionIndex) -> Result<StateId, ModelError> {
        let choice = self.model.choice(self.current, action)?;
        let sample: f64 = self.rng.gen();
        let mut cumulative = 0.0;
        let mut target = None;
        for transition in &choice.transitions {
            cumulative += transition.probability;
            target = Some(transition.target);
            if sample < cumulative {
                break;
            }
        }
        // Rounding can leave the sample just above the cumulative sum, in
        // which case the last successor is taken.
        let target = target.ok_or_else(|| ModelError::InvalidDistribution {
            state: self.current,
            detail: "choice without transitions".to_string(),
        })?;
        debug!("{} --{}--> s{}", self.current, action, target);
        self.current = StateId(target);
        Ok(self.current)
    }

    fn is_done(&self) -> bool {
        match self.model.state(self.current) {
            Ok(state) => {
                state.choices.is_empty()
                    || self
                        .done_label
                        .as_ref()
                        .is_some_and(|label| state.labels.contains(label))
            }
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn corridor() -> ExplicitModel {
        ExplicitModel::from_value(json!({
            "constants": { "N": 2 },
            "states": [
                {
                    "valuation": { "robot": { "x": 0, "done": false } },
                    "choices": [
                        { "labels": ["east"], "transitions": [{ "target": 1, "probability": 1.0 }] },
                        { "labels": ["stay"], "transitions": [{ "target": 0, "probability": 1.0 }] }
                    ]
                },
                {
                    "valuation": { "robot": { "x": 1, "done": true } },
                    "labels": ["goal"]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_valuations_and_constants() {
        let model = corridor();
        let x = VariableId::new("robot", "x");
        let done = VariableId::new("robot", "done");
        assert_eq!(model.integer_value(StateId(1), &x).unwrap(), 1);
        assert!(model.boolean_value(StateId(1), &done).unwrap());
        assert!(matches!(model.boolean_value(StateId(0), &x), Err(ModelError::TypeMismatch(_))));
        assert_eq!(model.integer_constant("N").unwrap(), 2);
        assert!(matches!(model.integer_constant("M"), Err(ModelError::UnknownConstant(_))));
    }

    #[test]
    fn test_labels() {
        let model = corridor();
        assert_eq!(model.states_with_label("goal").unwrap(), vec![StateId(1)]);
        assert!(matches!(model.states_with_label("trap"), Err(ModelError::UnknownLabel(_))));

        let labels: Vec<_> = model.all_choice_labels().into_iter().collect();
        assert_eq!(labels, vec!["east".to_string(), "stay".to_string()]);
        assert!(model.choice_labels(StateId(0), ActionIndex(0)).unwrap().contains("east"));
        assert!(model.choice_labels(StateId(1), ActionIndex(0)).is_err());
    }

    #[test]
    fn test_declared_label_without_states() {
        let mut model = corridor();
        model.labels.insert("trap".to_string());
        assert!(model.states_with_label("trap").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_distribution_rejected() {
        let result = ExplicitModel::from_value(json!({
            "states": [
                { "choices": [{ "transitions": [{ "target": 0, "probability": 0.4 }] }] }
            ]
        }));
        assert!(matches!(result, Err(ModelError::InvalidDistribution { .. })));

        let result = ExplicitModel::from_value(json!({
            "states": [
                { "choices": [{ "transitions": [{ "target": 3, "probability": 1.0 }] }] }
            ]
        }));
        assert!(matches!(result, Err(ModelError::UnknownState(StateId(3)))));
    }

    #[test]
    fn test_potential_states_share_observation() {
        let model = ExplicitModel::from_value(json!({
            "states": [
                { "observation": 1 },
                { "observation": 2 },
                { "observation": 1 },
                {}
            ]
        }))
        .unwrap();
        assert_eq!(model.potential_states(StateId(0)).unwrap(), vec![StateId(0), StateId(2)]);
        assert_eq!(model.potential_states(StateId(1)).unwrap(), vec![StateId(1)]);
        assert_eq!(model.potential_states(StateId(3)).unwrap(), vec![StateId(3)]);
        assert!(model.potential_states(StateId(9)).is_err());
    }

    #[test]
    fn test_simulator_steps_until_done() {
        let model = corridor();
        let mut simulator = ExplicitSimulator::new(&model, 7).with_done_label("goal");
        assert_eq!(simulator.restart().unwrap(), StateId(0));
        assert!(!simulator.is_done());
        assert_eq!(simulator.available_actions(), vec![ActionIndex(0), ActionIndex(1)]);

        assert_eq!(simulator.step(ActionIndex(1)).unwrap(), StateId(0));
        assert_eq!(simulator.step(ActionIndex(0)).unwrap(), StateId(1));
        assert!(simulator.is_done());
        assert!(simulator.available_actions().is_empty());
        assert!(simulator.step(ActionIndex(0)).is_err());

        assert_eq!(simulator.restart().unwrap(), StateId(0));
        assert_eq!(simulator.current_state(), StateId(0));
    }
}
