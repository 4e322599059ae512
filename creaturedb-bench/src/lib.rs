//! Shared fixtures for the creature database benchmarks.

use creaturedb_core::persistence::MemoryAsset;
use creaturedb_core::{AssetRef, Creature, CreatureStore};

/// A deterministic creature; every tenth one has a portrait.
#[must_use]
pub fn make_creature(i: u32) -> Creature {
    let mut creature = Creature::with_stats(
        format!("creature-{i:04}"),
        format!("Creature number {i}"),
        50.0 + i as f32,
        3.0 + (i % 5) as f32,
        1.5,
    );
    if i % 10 == 0 {
        creature.portrait = Some(AssetRef::new(format!("Sprites/creature_{i}.png")));
    }
    creature
}

/// A store pre-filled with `n` creatures over an in-memory asset.
///
/// # Panics
///
/// Panics if the in-memory asset rejects a save, which it never does
/// unless told to.
#[must_use]
pub fn populated_store(n: u32) -> CreatureStore {
    let mut store = CreatureStore::load(MemoryAsset::new()).expect("load");
    for i in 0..n {
        store.add(make_creature(i)).expect("add");
    }
    store
}
