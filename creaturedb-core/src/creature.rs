//! The creature record — one designer-authored set of creature attributes.

use serde::{Deserialize, Serialize};

use crate::config::CreatureDefaults;
use crate::types::{AssetRef, CreatureId};

/// A single creature record as stored in the database asset.
///
/// Plain data: no field is validated, so negative health or a zero sprint
/// multiplier are stored as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    /// Unique identifier, fixed at creation.
    pub id: CreatureId,
    /// Display name shown in the editor list.
    pub name: String,
    /// Hit points.
    #[serde(with = "lossless_f32")]
    pub health: f32,
    /// Whether the creature ignores lethal damage.
    #[serde(default)]
    pub is_immortal: bool,
    /// Portrait sprite, if one has been assigned.
    #[serde(default)]
    pub portrait: Option<AssetRef>,
    /// Animation controller, if one has been assigned.
    #[serde(default)]
    pub animator: Option<AssetRef>,
    /// Walking speed in world units per second.
    #[serde(with = "lossless_f32")]
    pub base_speed: f32,
    /// Factor applied to `base_speed` while sprinting.
    #[serde(with = "lossless_f32")]
    pub sprint_multiplier: f32,
}

impl Creature {
    /// Create a record with explicit stats; not immortal, no assets.
    #[must_use]
    pub fn with_stats(
        id: impl Into<CreatureId>,
        name: impl Into<String>,
        health: f32,
        base_speed: f32,
        sprint_multiplier: f32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            health,
            is_immortal: false,
            portrait: None,
            animator: None,
            base_speed,
            sprint_multiplier,
        }
    }

    /// Create a fresh record with a random id and the configured defaults.
    #[must_use]
    pub fn new_default(defaults: &CreatureDefaults) -> Self {
        Self::with_stats(
            CreatureId::new(),
            defaults.name.clone(),
            defaults.health,
            defaults.base_speed,
            defaults.sprint_multiplier,
        )
    }

    /// Case-insensitive substring match on the name. An empty term matches.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        term.is_empty() || self.name.to_lowercase().contains(&term.to_lowercase())
    }

    /// Effective speed while sprinting.
    #[must_use]
    pub fn sprint_speed(&self) -> f32 {
        self.base_speed * self.sprint_multiplier
    }
}

impl Default for Creature {
    fn default() -> Self {
        Self::new_default(&CreatureDefaults::default())
    }
}

/// Serde adapter that keeps non-finite floats.
///
/// JSON has no literal for infinity or NaN, so those are written as the
/// strings `"inf"`, `"-inf"` and `"NaN"`; finite values stay plain numbers.
mod lossless_f32 {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f32(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        deserializer.deserialize_any(F32Visitor)
    }

    struct F32Visitor;

    impl<'de> Visitor<'de> for F32Visitor {
        type Value = f32;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or one of \"inf\", \"-inf\", \"NaN\"")
        }

        #[allow(clippy::cast_possible_truncation)]
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f32, E> {
            Ok(v as f32)
        }

        #[allow(clippy::cast_precision_loss)]
        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f32, E> {
            Ok(v as f32)
        }

        #[allow(clippy::cast_precision_loss)]
        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f32, E> {
            Ok(v as f32)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f32, E> {
            match v {
                "inf" | "Infinity" => Ok(f32::INFINITY),
                "-inf" | "-Infinity" => Ok(f32::NEG_INFINITY),
                "NaN" | "nan" => Ok(f32::NAN),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_uses_placeholder_values() {
        let c = Creature::default();
        assert_eq!(c.name, "New creature");
        assert!((c.health - 100.0).abs() < f32::EPSILON);
        assert!(!c.is_immortal);
        assert!(c.portrait.is_none());
        assert!(c.animator.is_none());
        assert!((c.base_speed - 5.0).abs() < f32::EPSILON);
        assert!((c.sprint_multiplier - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn fresh_records_get_unique_ids() {
        let a = Creature::default();
        let b = Creature::default();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn search_is_case_insensitive() {
        let wolf = Creature::with_stats("a", "Dire Wolf", 100.0, 5.0, 1.5);
        assert!(wolf.matches_search("wolf"));
        assert!(wolf.matches_search("DIRE"));
        assert!(wolf.matches_search(""));
        assert!(!wolf.matches_search("bear"));
    }

    #[test]
    fn no_validation_on_stats() {
        let odd = Creature::with_stats("x", "Glitch", -10.0, 0.0, -2.0);
        assert!(odd.health < 0.0);
        assert!(odd.sprint_speed().abs() < f32::EPSILON);
    }

    #[test]
    fn missing_optional_fields_deserialize() {
        let json = r#"{"id":"a","name":"Wolf","health":100.0,"base_speed":5.0,"sprint_multiplier":1.5}"#;
        let c: Creature = serde_json::from_str(json).expect("parse");
        assert_eq!(c, Creature::with_stats("a", "Wolf", 100.0, 5.0, 1.5));
    }

    #[test]
    fn non_finite_stats_survive_json() {
        let mut c = Creature::with_stats("g", "God", f32::INFINITY, f32::NEG_INFINITY, f32::NAN);
        c.is_immortal = true;
        let json = serde_json::to_string(&c).expect("serialize");
        assert!(json.contains(r#""health":"inf""#));
        assert!(json.contains(r#""base_speed":"-inf""#));
        assert!(json.contains(r#""sprint_multiplier":"NaN""#));

        let back: Creature = serde_json::from_str(&json).expect("parse");
        assert_eq!(back.health, f32::INFINITY);
        assert_eq!(back.base_speed, f32::NEG_INFINITY);
        assert!(back.sprint_multiplier.is_nan());
    }

    #[test]
    fn unknown_float_string_is_rejected() {
        let json = r#"{"id":"a","name":"Wolf","health":"lots","base_speed":5.0,"sprint_multiplier":1.5}"#;
        assert!(serde_json::from_str::<Creature>(json).is_err());
    }
}
