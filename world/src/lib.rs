#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Memory Spheres.
//!
//! The world owns the sphere registry, the two selection slots and the
//! scoreboard. Every mutation arrives as a [`Command`] through [`apply`], and
//! every observable change leaves as an [`Event`].

mod selection;

use memory_spheres_core::{
    Command, EntityId, Event, GridCell, Position, SphereColor, MAX_SPHERES, WELCOME_BANNER,
};
use tracing::{debug, info};

use self::selection::SelectionSlots;
pub use self::selection::SelectionPhase;

#[derive(Clone, Copy, Debug)]
struct Sphere {
    id: EntityId,
    cell: GridCell,
    position: Position,
    color: SphereColor,
}

/// Represents the authoritative Memory Spheres session state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    spheres: Vec<Sphere>,
    next_entity: u32,
    spawned: u32,
    selection: SelectionSlots,
    score: u32,
    remaining: Option<i32>,
    all_cleared: bool,
    tick_index: u64,
}

impl World {
    /// Creates an empty session ready for spawning.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            spheres: Vec::new(),
            next_entity: 0,
            spawned: 0,
            selection: SelectionSlots::default(),
            score: 0,
            remaining: None,
            all_cleared: false,
            tick_index: 0,
        }
    }

    fn sphere(&self, id: EntityId) -> Option<&Sphere> {
        self.spheres.iter().find(|sphere| sphere.id == id)
    }

    fn remove_sphere(&mut self, id: EntityId) {
        if let Some(index) = self.spheres.iter().position(|sphere| sphere.id == id) {
            let _ = self.spheres.remove(index);
        }
    }

    fn spawn(
        &mut self,
        cell: GridCell,
        position: Position,
        color: SphereColor,
        out_events: &mut Vec<Event>,
    ) {
        if self.spawned >= MAX_SPHERES {
            debug!(spawned = self.spawned, "spawn rejected, session is full");
            return;
        }

        let id = EntityId::new(self.next_entity);
        self.next_entity = self.next_entity.saturating_add(1);
        self.spawned += 1;
        self.spheres.push(Sphere {
            id,
            cell,
            position,
            color,
        });
        out_events.push(Event::SphereSpawned {
            id,
            cell,
            position,
            color,
            spawned: self.spawned,
        });
    }

    fn click(&mut self, hit: Option<EntityId>, out_events: &mut Vec<Event>) {
        let Some(id) = hit else {
            if self.selection.clear() {
                out_events.push(Event::SelectionCleared);
            }
            return;
        };

        if self.sphere(id).is_none() {
            debug!(entity = id.get(), "click on a sphere that left the registry");
            return;
        }

        out_events.push(Event::SphereClicked { id });
        if self.selection.click(id) {
            let snapshot = self.selection.snapshot();
            out_events.push(Event::SelectionChanged {
                first: snapshot.first,
                second: snapshot.second,
            });
        }
    }

    fn resolve_selection(&mut self, out_events: &mut Vec<Event>) {
        if self.remaining.is_none() {
            let remaining = i32::try_from(self.spawned).unwrap_or(i32::MAX);
            self.remaining = Some(remaining);
            out_events.push(Event::RemainingInitialized { remaining });
        }

        let Some((first, second)) = self.selection.take_pair() else {
            return;
        };

        let colors = self
            .sphere(first)
            .map(|sphere| sphere.color)
            .zip(self.sphere(second).map(|sphere| sphere.color));

        match colors {
            Some((first_color, second_color)) if first_color == second_color => {
                self.remove_sphere(first);
                self.remove_sphere(second);
                self.score = self.score.saturating_add(1);
                let remaining = self.remaining.unwrap_or_default().saturating_sub(2);
                self.remaining = Some(remaining);
                info!(
                    first = first.get(),
                    second = second.get(),
                    color = %format!("#{:06x}", first_color.to_hex()),
                    score = self.score,
                    remaining,
                    "pair matched"
                );
                out_events.push(Event::PairMatched {
                    first,
                    second,
                    color: first_color,
                    score: self.score,
                    remaining,
                });
            }
            _ => out_events.push(Event::PairMismatched { first, second }),
        }
        out_events.push(Event::SelectionCleared);

        if !self.all_cleared && self.spawned >= MAX_SPHERES && self.spheres.is_empty() {
            self.all_cleared = true;
            info!(score = self.score, "all pairs cleared");
            out_events.push(Event::AllPairsCleared { score: self.score });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnSphere {
            cell,
            position,
            color,
        } => world.spawn(cell, position, color, out_events),
        Command::Click { hit } => world.click(hit, out_events),
        Command::ResolveSelection => world.resolve_selection(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use memory_spheres_core::{EntityId, SelectionSnapshot, SphereSnapshot, SphereView};

    use super::{SelectionPhase, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Captures a read-only view of the live spheres.
    #[must_use]
    pub fn sphere_view(world: &World) -> SphereView {
        SphereView::from_snapshots(
            world
                .spheres
                .iter()
                .map(|sphere| SphereSnapshot {
                    id: sphere.id,
                    cell: sphere.cell,
                    position: sphere.position,
                    color: sphere.color,
                })
                .collect(),
        )
    }

    /// Reports whether the sphere is still present in the registry.
    #[must_use]
    pub fn is_live(world: &World, id: EntityId) -> bool {
        world.sphere(id).is_some()
    }

    /// Current contents of the selection slots.
    #[must_use]
    pub fn selection(world: &World) -> SelectionSnapshot {
        world.selection.snapshot()
    }

    /// Current phase of the selection state machine.
    #[must_use]
    pub fn selection_phase(world: &World) -> SelectionPhase {
        world.selection.phase()
    }

    /// Number of matched pairs credited so far.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Remaining counter, unset until the first resolution frame.
    #[must_use]
    pub fn remaining(world: &World) -> Option<i32> {
        world.remaining
    }

    /// Total number of spheres spawned since the session began.
    #[must_use]
    pub fn spawned_count(world: &World) -> u32 {
        world.spawned
    }

    /// Number of ticks processed since the session began.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_spheres_core::{SelectionSnapshot, PALETTE};

    fn spawn(world: &mut World, color: SphereColor) -> EntityId {
        let mut events = Vec::new();
        let index = query::spawned_count(world);
        apply(
            world,
            Command::SpawnSphere {
                cell: GridCell::from_spawn_index(index),
                position: Position::default(),
                color,
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::SphereSpawned { id, .. }] => *id,
            other => panic!("unexpected spawn events: {other:?}"),
        }
    }

    fn click(world: &mut World, hit: Option<EntityId>) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::Click { hit }, &mut events);
        events
    }

    fn resolve(world: &mut World) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::ResolveSelection, &mut events);
        events
    }

    #[test]
    fn spawning_allocates_sequential_ids() {
        let mut world = World::new();
        let first = spawn(&mut world, PALETTE[0]);
        let second = spawn(&mut world, PALETTE[1]);

        assert_eq!(first, EntityId::new(0));
        assert_eq!(second, EntityId::new(1));
        assert_eq!(query::spawned_count(&world), 2);
        assert_eq!(query::sphere_view(&world).len(), 2);
    }

    #[test]
    fn spawning_stops_at_session_capacity() {
        let mut world = World::new();
        for _ in 0..MAX_SPHERES {
            let _ = spawn(&mut world, PALETTE[0]);
        }

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnSphere {
                cell: GridCell::new(0, 0, 0),
                position: Position::default(),
                color: PALETTE[0],
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::spawned_count(&world), MAX_SPHERES);
    }

    #[test]
    fn tick_broadcasts_time_advanced() {
        let mut world = World::new();
        let mut events = Vec::new();
        let dt = std::time::Duration::from_millis(16);
        apply(&mut world, Command::Tick { dt }, &mut events);

        assert_eq!(events, vec![Event::TimeAdvanced { dt }]);
        assert_eq!(query::tick_index(&world), 1);
    }

    #[test]
    fn clicking_empty_space_without_selection_is_a_no_op() {
        let mut world = World::new();
        let _ = spawn(&mut world, PALETTE[0]);

        assert!(click(&mut world, None).is_empty());
        assert_eq!(query::selection(&world), SelectionSnapshot::default());
    }

    #[test]
    fn click_on_removed_sphere_is_ignored() {
        let mut world = World::new();
        let a = spawn(&mut world, PALETTE[2]);
        let b = spawn(&mut world, PALETTE[2]);
        let _ = click(&mut world, Some(a));
        let _ = click(&mut world, Some(b));
        let _ = resolve(&mut world);

        assert!(click(&mut world, Some(a)).is_empty());
        assert_eq!(query::selection_phase(&world), SelectionPhase::Idle);
    }

    #[test]
    fn matching_pair_is_removed_and_scored() {
        let mut world = World::new();
        let a = spawn(&mut world, PALETTE[1]);
        let b = spawn(&mut world, PALETTE[1]);
        let _ = spawn(&mut world, PALETTE[3]);
        let _ = spawn(&mut world, PALETTE[4]);

        assert_eq!(
            click(&mut world, Some(a)),
            vec![
                Event::SphereClicked { id: a },
                Event::SelectionChanged {
                    first: Some(a),
                    second: None,
                },
            ]
        );
        let _ = click(&mut world, Some(b));
        let events = resolve(&mut world);

        assert_eq!(
            events,
            vec![
                Event::RemainingInitialized { remaining: 4 },
                Event::PairMatched {
                    first: a,
                    second: b,
                    color: PALETTE[1],
                    score: 1,
                    remaining: 2,
                },
                Event::SelectionCleared,
            ]
        );
        assert!(!query::is_live(&world, a));
        assert!(!query::is_live(&world, b));
        assert_eq!(query::score(&world), 1);
        assert_eq!(query::remaining(&world), Some(2));
    }

    #[test]
    fn mismatched_pair_is_released() {
        let mut world = World::new();
        let a = spawn(&mut world, PALETTE[1]);
        let b = spawn(&mut world, PALETTE[2]);
        let _ = resolve(&mut world);

        let _ = click(&mut world, Some(a));
        let _ = click(&mut world, Some(b));
        let events = resolve(&mut world);

        assert_eq!(
            events,
            vec![
                Event::PairMismatched {
                    first: a,
                    second: b,
                },
                Event::SelectionCleared,
            ]
        );
        assert!(query::is_live(&world, a));
        assert!(query::is_live(&world, b));
        assert_eq!(query::score(&world), 0);
        assert_eq!(query::remaining(&world), Some(2));
    }

    #[test]
    fn remaining_is_captured_at_first_resolution_only() {
        let mut world = World::new();
        let a = spawn(&mut world, PALETTE[5]);
        let b = spawn(&mut world, PALETTE[5]);
        let _ = resolve(&mut world);
        assert_eq!(query::remaining(&world), Some(2));

        let _ = spawn(&mut world, PALETTE[0]);
        let _ = spawn(&mut world, PALETTE[0]);
        let _ = click(&mut world, Some(a));
        let _ = click(&mut world, Some(b));
        let _ = resolve(&mut world);

        assert_eq!(query::remaining(&world), Some(0));
        assert_eq!(query::sphere_view(&world).len(), 2);
    }

    #[test]
    fn single_selection_survives_resolution() {
        let mut world = World::new();
        let a = spawn(&mut world, PALETTE[0]);
        let _ = click(&mut world, Some(a));
        let _ = resolve(&mut world);

        assert_eq!(query::selection(&world).first, Some(a));
        assert_eq!(query::selection_phase(&world), SelectionPhase::OneSelected);
    }

    #[test]
    fn clearing_every_sphere_announces_terminal_state_once() {
        let mut world = World::new();
        let ids: Vec<EntityId> = (0..MAX_SPHERES)
            .map(|_| spawn(&mut world, PALETTE[6]))
            .collect();

        let mut cleared = 0;
        for pair in ids.chunks(2) {
            let _ = click(&mut world, Some(pair[0]));
            let _ = click(&mut world, Some(pair[1]));
            cleared += resolve(&mut world)
                .iter()
                .filter(|event| matches!(event, Event::AllPairsCleared { .. }))
                .count();
        }
        cleared += resolve(&mut world)
            .iter()
            .filter(|event| matches!(event, Event::AllPairsCleared { .. }))
            .count();

        assert_eq!(cleared, 1);
        assert_eq!(query::score(&world), MAX_SPHERES / 2);
        assert!(query::sphere_view(&world).is_empty());
    }
}
