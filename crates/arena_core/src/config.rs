use crate::types::RewardKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Typed value held in an event config's mode-parameter bag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    StrList(Vec<String>),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Bool(_) => ParamKind::Bool,
            ParamValue::Int(_) => ParamKind::Int,
            ParamValue::Float(_) => ParamKind::Float,
            ParamValue::Str(_) => ParamKind::Str,
            ParamValue::StrList(_) => ParamKind::StrList,
        }
    }
}

/// Data type a mode parameter declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    Bool,
    Int,
    Float,
    Str,
    StrList,
}

/// A mode-declared extra config field: name, type, whether it is required,
/// the default, and an optional source the admin surface can query for
/// selectable values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventParameter {
    /// Human-readable name shown by the admin surface.
    pub name: String,
    /// Key of the field inside the config parameter bag.
    pub field: String,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<ParamValue>,
    /// Collaborator hook that lists selectable values, if any.
    pub selector_source: Option<String>,
    pub select_multiple: bool,
}

impl EventParameter {
    pub fn new(name: &str, field: &str, kind: ParamKind) -> Self {
        Self {
            name: name.to_string(),
            field: field.to_string(),
            kind,
            required: false,
            default: None,
            selector_source: None,
            select_multiple: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: ParamValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn selector(mut self, source: &str) -> Self {
        self.selector_source = Some(source.to_string());
        self
    }
}

/// Per-team slice of an event config.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TeamConfig {
    pub name: String,
    /// Six digit hex color; invalid values fall back to a per-side default.
    pub color: String,
    pub spawn_file: String,
    /// Kit that replaces worn clothing after the weapon kit is issued.
    pub clothing_kit: String,
    pub kits: Vec<String>,
}

/// Reward payouts issued through the reward collaborator.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RewardConfig {
    pub kill_amount: u32,
    pub win_amount: u32,
    pub headshot_amount: u32,
    pub kind: RewardKind,
}

/// Immutable-after-validation descriptor of one named event.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventConfig {
    pub event_name: String,
    /// Registered mode identifier this event runs under.
    pub event_type: String,
    pub zone_id: String,
    pub permission: String,
    pub description: String,
    /// Seconds per round; 0 disables the round timer.
    pub time_limit: u32,
    pub score_limit: u32,
    pub minimum_players: u32,
    pub maximum_players: u32,
    pub allow_class_selection: bool,
    /// Persisted flag gating auto-open.
    pub disabled: bool,
    pub rounds_to_play: u32,
    pub team_a: TeamConfig,
    pub team_b: TeamConfig,
    pub rewards: RewardConfig,
    /// Mode-specific parameter bag, seeded from the mode's declarations.
    pub params: BTreeMap<String, ParamValue>,
}

impl EventConfig {
    /// Create a config for the given mode, seeding parameter defaults from
    /// the mode's declarations.
    pub fn new(event_name: &str, event_type: &str, parameters: &[EventParameter]) -> Self {
        let mut config = Self {
            event_name: event_name.to_string(),
            event_type: event_type.to_string(),
            ..Default::default()
        };

        for parameter in parameters {
            if let Some(default) = &parameter.default {
                config
                    .params
                    .insert(parameter.field.clone(), default.clone());
            }
        }

        config
    }

    pub fn param(&self, field: &str) -> Option<&ParamValue> {
        self.params.get(field)
    }

    pub fn param_bool(&self, field: &str) -> bool {
        matches!(self.params.get(field), Some(ParamValue::Bool(true)))
    }

    pub fn param_int(&self, field: &str) -> Option<i64> {
        match self.params.get(field) {
            Some(ParamValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn param_float(&self, field: &str) -> Option<f64> {
        match self.params.get(field) {
            Some(ParamValue::Float(value)) => Some(*value),
            Some(ParamValue::Int(value)) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn param_str(&self, field: &str) -> Option<&str> {
        match self.params.get(field) {
            Some(ParamValue::Str(value)) if !value.is_empty() => Some(value),
            _ => None,
        }
    }

    pub fn param_list(&self, field: &str) -> Option<&[String]> {
        match self.params.get(field) {
            Some(ParamValue::StrList(values)) => Some(values),
            _ => None,
        }
    }

    pub fn team(&self, team: crate::types::Team) -> &TeamConfig {
        match team {
            crate::types::Team::B => &self.team_b,
            _ => &self.team_a,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Team;

    #[test]
    fn new_config_seeds_parameter_defaults() {
        let parameters = vec![
            EventParameter::new("Close On Start", "closeOnStart", ParamKind::Bool)
                .default_value(ParamValue::Bool(false)),
            EventParameter::new("Weapon Set", "weaponSet", ParamKind::StrList).required(),
        ];

        let config = EventConfig::new("event", "mode", &parameters);
        assert_eq!(
            config.param("closeOnStart"),
            Some(&ParamValue::Bool(false))
        );
        assert_eq!(config.param("weaponSet"), None);
    }

    #[test]
    fn typed_accessors_reject_mismatched_kinds() {
        let mut config = EventConfig::default();
        config
            .params
            .insert("lives".into(), ParamValue::Int(3));

        assert_eq!(config.param_int("lives"), Some(3));
        assert_eq!(config.param_str("lives"), None);
        assert!(!config.param_bool("lives"));
    }

    #[test]
    fn team_accessor_defaults_to_side_a() {
        let mut config = EventConfig::default();
        config.team_a.spawn_file = "spawns_a".into();
        config.team_b.spawn_file = "spawns_b".into();

        assert_eq!(config.team(Team::A).spawn_file, "spawns_a");
        assert_eq!(config.team(Team::None).spawn_file, "spawns_a");
        assert_eq!(config.team(Team::B).spawn_file, "spawns_b");
    }

    #[test]
    fn param_values_round_trip_as_plain_json() {
        let value: ParamValue = serde_json::from_str("3").unwrap();
        assert_eq!(value, ParamValue::Int(3));

        let value: ParamValue = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(
            value,
            ParamValue::StrList(vec!["a".into(), "b".into()])
        );
    }
}
