//! Program annotations: semantic roles mapped onto model identifiers
//!
//! A grid-world program names its variables, labels and constants freely.
//! The annotation tells the renderer which variable holds the ego x
//! coordinate, which label marks traps, which constants bound the grid, and
//! so on. Roles that are repeated per adversary, camera, resource or
//! landmark accept either a single value or a list; they are resolved into
//! a list once, at construction.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::VariableId;

/// Error types for annotation lookups
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("{role} needs to be set, but has not been set")]
    Missing { role: &'static str },

    #[error("No adversary in this program")]
    NoAdversaries,

    #[error("Adversaries have no direction")]
    NoDirection,

    #[error("No interactive landmarks in this program")]
    NoInteractiveLandmarks,

    #[error("Index {index} out of range for {role} with {len} entries")]
    IndexOutOfRange {
        role: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Direction value {0} has no mapping")]
    UnmappedDirection(i64),

    #[error("Failed to read annotation: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse annotation: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Heading of a directed adversary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    North,
    East,
    West,
    South,
}

impl Direction {
    /// Counter-clockwise rotation of a north-facing marker, in degrees
    pub fn rotation(self) -> f32 {
        match self {
            Self::North => 0.0,
            Self::West => 90.0,
            Self::South => 180.0,
            Self::East => 270.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = match self {
            Self::North => "N",
            Self::West => "W",
            Self::South => "S",
            Self::East => "E",
        };
        f.write_str(short)
    }
}

/// A single value or a list of values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::One(single) => vec![single],
            OneOrMany::Many(list) => list,
        }
    }
}

/// The goal action role is either a flag or an action name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GoalAction {
    Flag(bool),
    Name(String),
}

/// Raw annotation as written in configuration files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AnnotationConfig {
    pub ego_xvar_module: Option<String>,
    pub ego_xvar_name: Option<String>,
    pub ego_yvar_module: Option<String>,
    pub ego_yvar_name: Option<String>,
    pub ego_radius_constant: Option<String>,

    pub adv_xvar_module: Option<OneOrMany<String>>,
    pub adv_xvar_name: Option<OneOrMany<String>>,
    pub adv_yvar_module: Option<OneOrMany<String>>,
    pub adv_yvar_name: Option<OneOrMany<String>>,
    pub adv_dirvar_module: Option<OneOrMany<String>>,
    pub adv_dirvar_name: Option<OneOrMany<String>>,
    pub adv_dirvalue_mapping: Option<BTreeMap<i64, Direction>>,
    pub adv_radius_constant: Option<String>,
    pub adv_area: Option<OneOrMany<String>>,
    pub adv_goals_label: Option<String>,

    pub xmin_constant: Option<String>,
    pub ymin_constant: Option<String>,
    pub xmax_constant: Option<String>,
    pub ymax_constant: Option<String>,

    pub target_label: Option<String>,
    pub traps_label: Option<String>,
    pub landmarks: Option<String>,

    pub scan_action: Option<String>,
    pub goal_action: Option<GoalAction>,

    pub camera: Option<OneOrMany<String>>,

    pub resource_name: Option<OneOrMany<String>>,
    pub resource_module: Option<OneOrMany<String>>,
    pub resource_variable: Option<OneOrMany<String>>,
    pub resource_maximum_constant: Option<OneOrMany<String>>,

    pub interactive_landmarks_x: Option<OneOrMany<String>>,
    pub interactive_landmarks_y: Option<OneOrMany<String>>,
    pub il_statusvar_module: Option<OneOrMany<String>>,
    pub il_statusvar_name: Option<OneOrMany<String>>,
    pub il_clearancevar_module: Option<OneOrMany<String>>,
    pub il_clearancevar_name: Option<OneOrMany<String>>,
}

/// Names of the four constants bounding a rectangular area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxConstants {
    pub xmin: String,
    pub ymin: String,
    pub xmax: String,
    pub ymax: String,
}

impl BoxConstants {
    /// Expand `P` into `PXMIN`, `PYMIN`, `PXMAX`, `PYMAX`
    pub fn from_prefix(prefix: &str) -> Self {
        Self {
            xmin: format!("{prefix}XMIN"),
            ymin: format!("{prefix}YMIN"),
            xmax: format!("{prefix}XMAX"),
            ymax: format!("{prefix}YMAX"),
        }
    }
}

/// A list-valued role together with its key
#[derive(Debug, Clone, Default)]
struct ListRole {
    key: &'static str,
    values: Option<Vec<String>>,
}

impl ListRole {
    fn new(key: &'static str, values: Option<OneOrMany<String>>) -> Self {
        Self {
            key,
            values: values.map(Vec::from),
        }
    }

    fn len(&self) -> usize {
        self.values.as_ref().map_or(0, Vec::len)
    }

    fn all(&self) -> Result<&[String], AnnotationError> {
        self.values
            .as_deref()
            .ok_or(AnnotationError::Missing { role: self.key })
    }

    fn get(&self, index: usize) -> Result<&str, AnnotationError> {
        let values = self.all()?;
        values
            .get(index)
            .map(String::as_str)
            .ok_or(AnnotationError::IndexOutOfRange {
                role: self.key,
                index,
                len: values.len(),
            })
    }
}

fn require<'a>(value: &'a Option<String>, role: &'static str) -> Result<&'a str, AnnotationError> {
    value.as_deref().ok_or(AnnotationError::Missing { role })
}

fn identifier(module: &ListRole, name: &ListRole, index: usize) -> Result<VariableId, AnnotationError> {
    Ok(VariableId::new(module.get(index)?, name.get(index)?))
}

/// Resolved, immutable annotation of a grid-world program
#[derive(Debug, Clone, Default)]
pub struct ProgramAnnotation {
    ego_xvar_module: Option<String>,
    ego_xvar_name: Option<String>,
    ego_yvar_module: Option<String>,
    ego_yvar_name: Option<String>,
    ego_radius_constant: Option<String>,

    adv_xvar_module: ListRole,
    adv_xvar_name: ListRole,
    adv_yvar_module: ListRole,
    adv_yvar_name: ListRole,
    adv_dirvar_module: ListRole,
    adv_dirvar_name: ListRole,
    adv_dirvalue_mapping: Option<BTreeMap<i64, Direction>>,
    adv_radius_constant: Option<String>,
    adv_area: ListRole,
    adv_goals_label: Option<String>,

    xmin_constant: Option<String>,
    ymin_constant: Option<String>,
    xmax_constant: Option<String>,
    ymax_constant: Option<String>,

    target_label: Option<String>,
    traps_label: Option<String>,
    landmarks: Option<String>,

    scan_action: Option<String>,
    goal_action: Option<GoalAction>,

    camera: ListRole,

    resource_name: ListRole,
    resource_module: ListRole,
    resource_variable: ListRole,
    resource_maximum_constant: ListRole,

    interactive_landmarks_x: ListRole,
    interactive_landmarks_y: ListRole,
    il_statusvar_module: ListRole,
    il_statusvar_name: ListRole,
    il_clearancevar_module: ListRole,
    il_clearancevar_name: ListRole,
}

impl From<AnnotationConfig> for ProgramAnnotation {
    fn from(config: AnnotationConfig) -> Self {
        Self {
            ego_xvar_module: config.ego_xvar_module,
            ego_xvar_name: config.ego_xvar_name,
            ego_yvar_module: config.ego_yvar_module,
            ego_yvar_name: config.ego_yvar_name,
            ego_radius_constant: config.ego_radius_constant,

            adv_xvar_module: ListRole::new("adv-xvar-module", config.adv_xvar_module),
            adv_xvar_name: ListRole::new("adv-xvar-name", config.adv_xvar_name),
            adv_yvar_module: ListRole::new("adv-yvar-module", config.adv_yvar_module),
            adv_yvar_name: ListRole::new("adv-yvar-name", config.adv_yvar_name),
            adv_dirvar_module: ListRole::new("adv-dirvar-module", config.adv_dirvar_module),
            adv_dirvar_name: ListRole::new("adv-dirvar-name", config.adv_dirvar_name),
            adv_dirvalue_mapping: config.adv_dirvalue_mapping,
            adv_radius_constant: config.adv_radius_constant,
            adv_area: ListRole::new("adv-area", config.adv_area),
            adv_goals_label: config.adv_goals_label,

            xmin_constant: config.xmin_constant,
            ymin_constant: config.ymin_constant,
            xmax_constant: config.xmax_constant,
            ymax_constant: config.ymax_constant,

            target_label: config.target_label,
            traps_label: config.traps_label,
            landmarks: config.landmarks,

            scan_action: config.scan_action,
            goal_action: config.goal_action,

            camera: ListRole::new("camera", config.camera),

            resource_name: ListRole::new("resource-name", config.resource_name),
            resource_module: ListRole::new("resource-module", config.resource_module),
            resource_variable: ListRole::new("resource-variable", config.resource_variable),
            resource_maximum_constant: ListRole::new(
                "resource-maximum-constant",
                config.resource_maximum_constant,
            ),

            interactive_landmarks_x: ListRole::new("interactive-landmarks-x", config.interactive_landmarks_x),
            interactive_landmarks_y: ListRole::new("interactive-landmarks-y", config.interactive_landmarks_y),
            il_statusvar_module: ListRole::new("il-statusvar-module", config.il_statusvar_module),
            il_statusvar_name: ListRole::new("il-statusvar-name", config.il_statusvar_name),
            il_clearancevar_module: ListRole::new("il-clearancevar-module", config.il_clearancevar_module),
            il_clearancevar_name: ListRole::new("il-clearancevar-name", config.il_clearancevar_name),
        }
    }
}

impl ProgramAnnotation {
    pub fn new(config: AnnotationConfig) -> Self {
        config.into()
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, AnnotationError> {
        let config: AnnotationConfig = serde_json::from_value(value)?;
        Ok(config.into())
    }

    pub fn from_json_str(text: &str) -> Result<Self, AnnotationError> {
        let config: AnnotationConfig = serde_json::from_str(text)?;
        Ok(config.into())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnnotationError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    // Ego

    pub fn ego_xvar_identifier(&self) -> Result<VariableId, AnnotationError> {
        Ok(VariableId::new(
            require(&self.ego_xvar_module, "ego-xvar-module")?,
            require(&self.ego_xvar_name, "ego-xvar-name")?,
        ))
    }

    pub fn ego_yvar_identifier(&self) -> Result<VariableId, AnnotationError> {
        Ok(VariableId::new(
            require(&self.ego_yvar_module, "ego-yvar-module")?,
            require(&self.ego_yvar_name, "ego-yvar-name")?,
        ))
    }

    pub fn ego_radius_constant(&self) -> Option<&str> {
        self.ego_radius_constant.as_deref()
    }

    // Adversaries

    pub fn nr_adversaries(&self) -> usize {
        self.adv_xvar_module.len()
    }

    pub fn adv_xvar_identifier(&self, index: usize) -> Result<VariableId, AnnotationError> {
        if self.nr_adversaries() == 0 {
            return Err(AnnotationError::NoAdversaries);
        }
        identifier(&self.adv_xvar_module, &self.adv_xvar_name, index)
    }

    pub fn adv_yvar_identifier(&self, index: usize) -> Result<VariableId, AnnotationError> {
        if self.nr_adversaries() == 0 {
            return Err(AnnotationError::NoAdversaries);
        }
        identifier(&self.adv_yvar_module, &self.adv_yvar_name, index)
    }

    pub fn adv_has_direction(&self) -> bool {
        self.adv_dirvar_name.values.is_some()
    }

    pub fn adv_dir_identifier(&self, index: usize) -> Result<VariableId, AnnotationError> {
        if self.nr_adversaries() == 0 {
            return Err(AnnotationError::NoAdversaries);
        }
        if !self.adv_has_direction() {
            return Err(AnnotationError::NoDirection);
        }
        identifier(&self.adv_dirvar_module, &self.adv_dirvar_name, index)
    }

    pub fn adversary_direction_value_to_direction(&self, value: i64) -> Result<Direction, AnnotationError> {
        let mapping = self
            .adv_dirvalue_mapping
            .as_ref()
            .ok_or(AnnotationError::Missing { role: "adv-dirvalue-mapping" })?;
        mapping
            .get(&value)
            .copied()
            .ok_or(AnnotationError::UnmappedDirection(value))
    }

    pub fn adv_radius_constant(&self) -> Option<&str> {
        self.adv_radius_constant.as_deref()
    }

    pub fn adv_draw_area_boundaries(&self) -> bool {
        self.adv_area.values.is_some()
    }

    pub fn adv_area(&self, index: usize) -> Result<BoxConstants, AnnotationError> {
        Ok(BoxConstants::from_prefix(self.adv_area.get(index)?))
    }

    pub fn adv_goal_label(&self) -> Option<&str> {
        self.adv_goals_label.as_deref()
    }

    // Grid bounds

    pub fn xmax_constant(&self) -> Result<&str, AnnotationError> {
        require(&self.xmax_constant, "xmax-constant")
    }

    pub fn ymax_constant(&self) -> Result<&str, AnnotationError> {
        require(&self.ymax_constant, "ymax-constant")
    }

    /// Lower x bound constant; the bound is 0 when unset
    pub fn xmin_constant(&self) -> Option<&str> {
        self.xmin_constant.as_deref()
    }

    /// Lower y bound constant; the bound is 0 when unset
    pub fn ymin_constant(&self) -> Option<&str> {
        self.ymin_constant.as_deref()
    }

    // Static labels

    pub fn has_static_targets(&self) -> bool {
        self.target_label.is_some()
    }

    pub fn target_label(&self) -> Result<&str, AnnotationError> {
        require(&self.target_label, "target-label")
    }

    pub fn has_traps(&self) -> bool {
        self.traps_label.is_some()
    }

    pub fn traps_label(&self) -> Result<&str, AnnotationError> {
        require(&self.traps_label, "traps-label")
    }

    pub fn has_landmarks(&self) -> bool {
        self.landmarks.is_some()
    }

    pub fn landmark_label(&self) -> Result<&str, AnnotationError> {
        require(&self.landmarks, "landmarks")
    }

    // Actions

    pub fn scan_action(&self) -> Option<&str> {
        self.scan_action.as_deref()
    }

    pub fn has_goal_action(&self) -> bool {
        match &self.goal_action {
            Some(GoalAction::Flag(flag)) => *flag,
            Some(GoalAction::Name(name)) => !name.is_empty(),
            None => false,
        }
    }

    // Cameras

    pub fn nr_cameras(&self) -> usize {
        self.camera.len()
    }

    pub fn camera_constants(&self, index: usize) -> Result<BoxConstants, AnnotationError> {
        Ok(BoxConstants::from_prefix(self.camera.get(index)?))
    }

    // Resources

    pub fn has_resources(&self) -> bool {
        self.nr_resources() > 0
    }

    pub fn nr_resources(&self) -> usize {
        self.resource_name.len()
    }

    pub fn resource_names(&self) -> Result<&[String], AnnotationError> {
        self.resource_name.all()
    }

    pub fn max_resource_level_constants(&self) -> Result<&[String], AnnotationError> {
        self.resource_maximum_constant.all()
    }

    pub fn resource_identifier(&self, index: usize) -> Result<VariableId, AnnotationError> {
        identifier(&self.resource_module, &self.resource_variable, index)
    }

    pub fn resource_identifiers(&self) -> Result<Vec<VariableId>, AnnotationError> {
        (0..self.nr_resources())
            .map(|index| self.resource_identifier(index))
            .collect()
    }

    // Interactive landmarks

    pub fn nr_interactive_landmarks(&self) -> usize {
        self.interactive_landmarks_x.len()
    }

    /// Names of the constants holding the location of a landmark
    pub fn interactive_landmark_constants(&self, index: usize) -> Result<(&str, &str), AnnotationError> {
        Ok((
            self.interactive_landmarks_x.get(index)?,
            self.interactive_landmarks_y.get(index)?,
        ))
    }

    pub fn interactive_landmark_status_identifier(&self, index: usize) -> Result<VariableId, AnnotationError> {
        if self.nr_interactive_landmarks() == 0 {
            return Err(AnnotationError::NoInteractiveLandmarks);
        }
        identifier(&self.il_statusvar_module, &self.il_statusvar_name, index)
    }

    pub fn interactive_landmark_clearance_identifier(&self, index: usize) -> Result<VariableId, AnnotationError> {
        if self.nr_interactive_landmarks() == 0 {
            return Err(AnnotationError::NoInteractiveLandmarks);
        }
        identifier(&self.il_clearancevar_module, &self.il_clearancevar_name, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ego_only() -> serde_json::Value {
        json!({
            "ego-xvar-module": "robot",
            "ego-xvar-name": "ax",
            "ego-yvar-module": "robot",
            "ego-yvar-name": "ay",
            "xmax-constant": "N",
            "ymax-constant": "N"
        })
    }

    fn with(mut base: serde_json::Value, extra: serde_json::Value) -> serde_json::Value {
        let map = base.as_object_mut().unwrap();
        for (key, value) in extra.as_object().unwrap() {
            map.insert(key.clone(), value.clone());
        }
        base
    }

    #[test]
    fn test_ego_identifiers() {
        let annotation = ProgramAnnotation::from_value(ego_only()).unwrap();
        assert_eq!(annotation.ego_xvar_identifier().unwrap(), VariableId::new("robot", "ax"));
        assert_eq!(annotation.ego_yvar_identifier().unwrap(), VariableId::new("robot", "ay"));
        assert_eq!(annotation.xmax_constant().unwrap(), "N");
        assert!(annotation.ego_radius_constant().is_none());
    }

    #[test]
    fn test_scalar_adversary_matches_list() {
        let scalar = ProgramAnnotation::from_value(with(
            ego_only(),
            json!({
                "adv-xvar-module": "obstacle",
                "adv-xvar-name": "ox",
                "adv-yvar-module": "obstacle",
                "adv-yvar-name": "oy"
            }),
        ))
        .unwrap();
        let list = ProgramAnnotation::from_value(with(
            ego_only(),
            json!({
                "adv-xvar-module": ["obstacle"],
                "adv-xvar-name": ["ox"],
                "adv-yvar-module": ["obstacle"],
                "adv-yvar-name": ["oy"]
            }),
        ))
        .unwrap();

        for annotation in [&scalar, &list] {
            assert_eq!(annotation.nr_adversaries(), 1);
            assert_eq!(annotation.adv_xvar_identifier(0).unwrap(), VariableId::new("obstacle", "ox"));
            assert_eq!(annotation.adv_yvar_identifier(0).unwrap(), VariableId::new("obstacle", "oy"));
        }
    }

    #[test]
    fn test_absent_roles_count_zero() {
        let annotation = ProgramAnnotation::from_value(ego_only()).unwrap();
        assert_eq!(annotation.nr_adversaries(), 0);
        assert_eq!(annotation.nr_cameras(), 0);
        assert_eq!(annotation.nr_interactive_landmarks(), 0);
        assert_eq!(annotation.nr_resources(), 0);
        assert!(!annotation.has_resources());
        assert!(!annotation.has_landmarks());
        assert!(!annotation.adv_has_direction());
        assert!(!annotation.adv_draw_area_boundaries());
    }

    #[test]
    fn test_identifier_on_zero_count_fails() {
        let annotation = ProgramAnnotation::from_value(ego_only()).unwrap();
        assert!(matches!(annotation.adv_xvar_identifier(0), Err(AnnotationError::NoAdversaries)));
        assert!(matches!(annotation.adv_dir_identifier(0), Err(AnnotationError::NoAdversaries)));
        assert!(matches!(
            annotation.interactive_landmark_status_identifier(0),
            Err(AnnotationError::NoInteractiveLandmarks)
        ));
        assert!(matches!(
            annotation.camera_constants(0),
            Err(AnnotationError::Missing { role: "camera" })
        ));
        assert!(matches!(
            annotation.target_label(),
            Err(AnnotationError::Missing { role: "target-label" })
        ));
    }

    #[test]
    fn test_missing_required_role() {
        let annotation = ProgramAnnotation::from_value(json!({ "ego-xvar-module": "robot" })).unwrap();
        let error = annotation.ego_xvar_identifier().unwrap_err();
        assert!(matches!(error, AnnotationError::Missing { role: "ego-xvar-name" }));
        assert_eq!(error.to_string(), "ego-xvar-name needs to be set, but has not been set");
        assert!(annotation.xmax_constant().is_err());
    }

    #[test]
    fn test_adversary_index_out_of_range() {
        let annotation = ProgramAnnotation::from_value(with(
            ego_only(),
            json!({
                "adv-xvar-module": ["a", "b"],
                "adv-xvar-name": ["x", "x"],
                "adv-yvar-module": ["a", "b"],
                "adv-yvar-name": ["y"]
            }),
        ))
        .unwrap();
        assert_eq!(annotation.nr_adversaries(), 2);
        assert_eq!(annotation.adv_xvar_identifier(1).unwrap(), VariableId::new("b", "x"));
        assert!(matches!(
            annotation.adv_yvar_identifier(1),
            Err(AnnotationError::IndexOutOfRange { role: "adv-yvar-name", index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_directions() {
        let annotation = ProgramAnnotation::from_value(with(
            ego_only(),
            json!({
                "adv-xvar-module": "guard",
                "adv-xvar-name": "gx",
                "adv-yvar-module": "guard",
                "adv-yvar-name": "gy",
                "adv-dirvar-module": "guard",
                "adv-dirvar-name": "dir",
                "adv-dirvalue-mapping": { "0": "NORTH", "1": "EAST", "2": "SOUTH", "3": "WEST" }
            }),
        ))
        .unwrap();
        assert!(annotation.adv_has_direction());
        assert_eq!(annotation.adv_dir_identifier(0).unwrap(), VariableId::new("guard", "dir"));
        assert_eq!(annotation.adversary_direction_value_to_direction(1).unwrap(), Direction::East);
        assert!(matches!(
            annotation.adversary_direction_value_to_direction(4),
            Err(AnnotationError::UnmappedDirection(4))
        ));
        assert_eq!(Direction::East.to_string(), "E");
        assert_eq!(Direction::West.rotation(), 90.0);
    }

    #[test]
    fn test_cameras_and_areas() {
        let annotation = ProgramAnnotation::from_value(with(
            ego_only(),
            json!({ "camera": ["CAMA", "CAMB"], "adv-area": "AREA" }),
        ))
        .unwrap();
        assert_eq!(annotation.nr_cameras(), 2);
        let camera = annotation.camera_constants(1).unwrap();
        assert_eq!(camera.xmin, "CAMBXMIN");
        assert_eq!(camera.ymax, "CAMBYMAX");
        assert!(annotation.adv_draw_area_boundaries());
        assert_eq!(annotation.adv_area(0).unwrap().xmax, "AREAXMAX");
        assert!(annotation.camera_constants(2).is_err());
    }

    #[test]
    fn test_resources() {
        let annotation = ProgramAnnotation::from_value(with(
            ego_only(),
            json!({
                "resource-name": "fuel",
                "resource-module": "robot",
                "resource-variable": "fuel",
                "resource-maximum-constant": "MAXFUEL"
            }),
        ))
        .unwrap();
        assert_eq!(annotation.nr_resources(), 1);
        assert_eq!(annotation.resource_names().unwrap(), ["fuel".to_string()]);
        assert_eq!(annotation.max_resource_level_constants().unwrap(), ["MAXFUEL".to_string()]);
        assert_eq!(annotation.resource_identifiers().unwrap(), vec![VariableId::new("robot", "fuel")]);
    }

    #[test]
    fn test_interactive_landmarks() {
        let annotation = ProgramAnnotation::from_value(with(
            ego_only(),
            json!({
                "interactive-landmarks-x": ["R1X", "R2X"],
                "interactive-landmarks-y": ["R1Y", "R2Y"],
                "il-statusvar-module": ["rock", "rock"],
                "il-statusvar-name": ["r1good", "r2good"],
                "il-clearancevar-module": ["rock", "rock"],
                "il-clearancevar-name": ["r1taken", "r2taken"]
            }),
        ))
        .unwrap();
        assert_eq!(annotation.nr_interactive_landmarks(), 2);
        assert_eq!(annotation.interactive_landmark_constants(1).unwrap(), ("R2X", "R2Y"));
        assert_eq!(
            annotation.interactive_landmark_status_identifier(0).unwrap(),
            VariableId::new("rock", "r1good")
        );
        assert_eq!(
            annotation.interactive_landmark_clearance_identifier(1).unwrap(),
            VariableId::new("rock", "r2taken")
        );
    }

    #[test]
    fn test_goal_action_forms() {
        let flag = ProgramAnnotation::from_value(with(ego_only(), json!({ "goal-action": true }))).unwrap();
        let name = ProgramAnnotation::from_value(with(ego_only(), json!({ "goal-action": "done" }))).unwrap();
        let empty = ProgramAnnotation::from_value(with(ego_only(), json!({ "goal-action": "" }))).unwrap();
        assert!(flag.has_goal_action());
        assert!(name.has_goal_action());
        assert!(!empty.has_goal_action());
        assert!(!ProgramAnnotation::from_value(ego_only()).unwrap().has_goal_action());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result = ProgramAnnotation::from_value(with(ego_only(), json!({ "ego-xvar-nmae": "ax" })));
        assert!(matches!(result, Err(AnnotationError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotation.json");
        std::fs::write(&path, ego_only().to_string()).unwrap();
        let annotation = ProgramAnnotation::from_path(&path).unwrap();
        assert_eq!(annotation.ymax_constant().unwrap(), "N");

        let missing = ProgramAnnotation::from_path(dir.path().join("absent.json"));
        assert!(matches!(missing, Err(AnnotationError::Io(_))));
    }
}
