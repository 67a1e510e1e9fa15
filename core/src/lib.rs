//! gridtrace core: traces, annotations and model interfaces
//!
//! Recording simulated paths through POMDP grid worlds and resolving the
//! semantic roles of a grid-world program (ego, adversaries, landmarks,
//! resources, cameras) onto the variables, labels and constants of the
//! built model.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

#![forbid(unsafe_code)]

pub mod annotation;
pub mod model;
pub mod simulation;
pub mod trace;

pub use annotation::{AnnotationError, BoxConstants, Direction, OneOrMany, ProgramAnnotation};
pub use model::{ActionIndex, BeliefSupport, ModelError, ModelView, Simulator, StateId, VariableId};
pub use simulation::{ActionSelector, RandomSelector, SimulationConfig, SimulationError, SimulationExecutor};
pub use trace::{EpisodeRecorder, RecorderConfig, Snapshot, Trace, TraceError, TraceRecorder};
