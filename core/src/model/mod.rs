//! Model interfaces consumed by the trace store and the renderer
//!
//! The probabilistic model and its simulator are external collaborators.
//! This module fixes the narrow surface the rest of the workspace needs:
//! state valuations, state labeling, choice labeling and constant lookup on
//! the built model, and restart/step on the simulator.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod explicit;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use explicit::{ExplicitModel, ExplicitSimulator};

/// Opaque handle to a state of the built model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(pub u64);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Local choice index of an action at a given state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionIndex(pub u64);

impl fmt::Display for ActionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// Variable of a module, identified by module and variable name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VariableId {
    pub module: String,
    pub name: String,
}

impl VariableId {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

/// Error types for model queries
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Unknown state: {0}")]
    UnknownState(StateId),

    #[error("Unknown variable {variable} in state {state}")]
    UnknownVariable { state: StateId, variable: VariableId },

    #[error("Variable {0} does not hold a value of the requested type")]
    TypeMismatch(VariableId),

    #[error("Unknown constant: {0}")]
    UnknownConstant(String),

    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    #[error("Action {action} is not available in state {state}")]
    UnknownAction { state: StateId, action: ActionIndex },

    #[error("Invalid transition distribution in state {state}: {detail}")]
    InvalidDistribution { state: StateId, detail: String },

    #[error("Failed to read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read access to a built model with state valuations and labels
///
/// Mirrors what a model checker exposes once a model was built with state
/// valuations, all labels and choice labels enabled.
pub trait ModelView {
    /// Value of an integer variable in a state
    fn integer_value(&self, state: StateId, variable: &VariableId) -> Result<i64, ModelError>;

    /// Value of a boolean variable in a state
    fn boolean_value(&self, state: StateId, variable: &VariableId) -> Result<bool, ModelError>;

    /// All states carrying a label
    fn states_with_label(&self, label: &str) -> Result<Vec<StateId>, ModelError>;

    /// Labels attached to a choice of a state
    fn choice_labels(&self, state: StateId, action: ActionIndex) -> Result<BTreeSet<String>, ModelError>;

    /// Every choice label occurring anywhere in the model
    fn all_choice_labels(&self) -> BTreeSet<String>;

    /// Value of an integer constant of the program
    fn integer_constant(&self, name: &str) -> Result<i64, ModelError>;
}

/// Source of the states an observer cannot tell apart from a given state
pub trait BeliefSupport {
    /// States sharing the observation of `state`, including `state` itself
    fn potential_states(&self, state: StateId) -> Result<Vec<StateId>, ModelError>;
}

/// Stepwise simulator over a model
pub trait Simulator {
    /// Reset to the initial state and return it
    fn restart(&mut self) -> Result<StateId, ModelError>;

    /// Actions enabled in the current state
    fn available_actions(&self) -> Vec<ActionIndex>;

    /// Take an action and return the successor state
    fn step(&mut self, action: ActionIndex) -> Result<StateId, ModelError>;

    /// Whether the current state ends the episode
    fn is_done(&self) -> bool;
}
