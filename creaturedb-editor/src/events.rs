//! Change notifications and field edits exchanged with the editor panel.

use creaturedb_core::{AssetRef, Creature, CreatureId};

/// Something the panel should react to, usually by re-rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// A creature was appended.
    Added { id: CreatureId },
    /// A creature was deleted.
    Removed { id: CreatureId },
    /// A creature's fields changed.
    Updated { id: CreatureId },
    /// The selection changed; `None` means nothing is selected.
    Selected { id: Option<CreatureId> },
    /// The search term changed.
    FilterChanged { term: String },
}

impl StoreEvent {
    /// Whether the list contents (not just the details panel) are stale.
    #[must_use]
    pub fn invalidates_list(&self) -> bool {
        !matches!(self, Self::Selected { .. })
    }
}

/// One committed field value from the details panel.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    /// Name text field.
    Name(String),
    /// Health float field.
    Health(f32),
    /// Immortal toggle.
    Immortal(bool),
    /// Portrait object picker; `None` clears it.
    Portrait(Option<AssetRef>),
    /// Animator object picker; `None` clears it.
    Animator(Option<AssetRef>),
    /// Base speed float field.
    BaseSpeed(f32),
    /// Sprint multiplier float field.
    SprintMultiplier(f32),
}

impl FieldEdit {
    /// Write this value into `creature`.
    pub fn apply(self, creature: &mut Creature) {
        match self {
            Self::Name(name) => creature.name = name,
            Self::Health(health) => creature.health = health,
            Self::Immortal(immortal) => creature.is_immortal = immortal,
            Self::Portrait(portrait) => creature.portrait = portrait,
            Self::Animator(animator) => creature.animator = animator,
            Self::BaseSpeed(speed) => creature.base_speed = speed,
            Self::SprintMultiplier(multiplier) => creature.sprint_multiplier = multiplier,
        }
    }

    /// Label of the field this edit targets.
    #[must_use]
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Health(_) => "health",
            Self::Immortal(_) => "is_immortal",
            Self::Portrait(_) => "portrait",
            Self::Animator(_) => "animator",
            Self::BaseSpeed(_) => "base_speed",
            Self::SprintMultiplier(_) => "sprint_multiplier",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_edit_touches_only_its_field() {
        let base = Creature::with_stats("a", "Wolf", 100.0, 5.0, 1.5);

        let mut c = base.clone();
        FieldEdit::Health(42.0).apply(&mut c);
        assert!((c.health - 42.0).abs() < f32::EPSILON);
        assert_eq!(c.name, base.name);

        let mut c = base.clone();
        FieldEdit::Portrait(Some(AssetRef::new("wolf.png"))).apply(&mut c);
        assert_eq!(c.portrait, Some(AssetRef::new("wolf.png")));
        assert_eq!(c.animator, None);

        let mut c = base.clone();
        FieldEdit::Immortal(true).apply(&mut c);
        assert!(c.is_immortal);
        assert_eq!(c.id, base.id);
    }

    #[test]
    fn selection_does_not_invalidate_list() {
        assert!(!StoreEvent::Selected { id: None }.invalidates_list());
        assert!(StoreEvent::FilterChanged { term: "w".into() }.invalidates_list());
    }
}
