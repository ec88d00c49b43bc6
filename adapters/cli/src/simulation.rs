//! Frame driver wiring the world, the systems and the rendering scene.

use std::time::Duration;

use memory_spheres_core::{Command, Event, SphereMaterial};
use memory_spheres_rendering::{
    picking, position_to_vec3, AudioCue, Color, FrameInput, HudPresentation, PickedObject, Scene,
    SpherePresentation,
};
use memory_spheres_system_highlighting::{HighlightedSphere, Highlighting};
use memory_spheres_system_spawning::{Config as SpawningConfig, Spawning};
use memory_spheres_world::{self as world, query, World};

/// Owns the session state and advances it one frame at a time.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    spawning: Spawning,
    highlighting: Highlighting,
    frame_events: Vec<Event>,
    commands: Vec<Command>,
    materials: Vec<HighlightedSphere>,
}

impl Simulation {
    pub(crate) fn new(config: SpawningConfig) -> Self {
        Self {
            world: World::new(),
            spawning: Spawning::new(config),
            highlighting: Highlighting::new(),
            frame_events: Vec::new(),
            commands: Vec::new(),
            materials: Vec::new(),
        }
    }

    pub(crate) fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    /// Runs one frame: time and spawning, the pending click, selection
    /// resolution, hover highlighting and finally the scene refresh.
    pub(crate) fn advance(&mut self, dt: Duration, input: FrameInput, scene: &mut Scene) {
        self.frame_events.clear();

        world::apply(&mut self.world, Command::Tick { dt }, &mut self.frame_events);
        self.pump_spawning(0);
        self.rebuild_spheres(scene);

        if input.click {
            let hit = input
                .pointer_ndc
                .and_then(|ndc| scene.pointer_ray(ndc))
                .and_then(|ray| picking::pick_sphere(scene, &ray));
            world::apply(&mut self.world, Command::Click { hit }, &mut self.frame_events);
        }

        world::apply(
            &mut self.world,
            Command::ResolveSelection,
            &mut self.frame_events,
        );
        self.rebuild_spheres(scene);

        let hovered = input
            .pointer_ndc
            .and_then(|ndc| scene.pointer_ray(ndc))
            .and_then(|ray| picking::pick_frontmost(scene, &ray))
            .and_then(|object| match object {
                PickedObject::Sphere(id) => Some(id),
                PickedObject::Platform => None,
            });
        self.materials.clear();
        self.highlighting.handle(
            &query::sphere_view(&self.world),
            query::selection(&self.world),
            hovered,
            &mut self.materials,
        );
        for highlighted in &self.materials {
            if let Some(sphere) = scene
                .spheres
                .iter_mut()
                .find(|sphere| sphere.id == highlighted.id)
            {
                sphere.material = highlighted.material;
            }
        }

        scene.hud = HudPresentation {
            spawned: query::spawned_count(&self.world),
            score: query::score(&self.world),
            remaining: query::remaining(&self.world),
        };
        scene.cues.clear();
        scene
            .cues
            .extend(self.frame_events.iter().filter_map(|event| match event {
                Event::SphereClicked { .. } => Some(AudioCue::Click),
                Event::PairMatched { .. } => Some(AudioCue::Correct),
                _ => None,
            }));
    }

    /// Feeds events recorded from `from` onwards to the spawning system until
    /// it stops issuing commands.
    fn pump_spawning(&mut self, mut from: usize) {
        loop {
            self.commands.clear();
            self.spawning
                .handle(&self.frame_events[from..], &mut self.commands);
            if self.commands.is_empty() {
                break;
            }

            from = self.frame_events.len();
            for command in self.commands.drain(..) {
                world::apply(&mut self.world, command, &mut self.frame_events);
            }
        }
    }

    fn rebuild_spheres(&self, scene: &mut Scene) {
        scene.spheres.clear();
        scene
            .spheres
            .extend(query::sphere_view(&self.world).iter().map(|sphere| {
                SpherePresentation::new(
                    sphere.id,
                    position_to_vec3(sphere.position),
                    Color::from(sphere.color),
                    SphereMaterial::OPAQUE,
                )
            }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};
    use memory_spheres_core::{EntityId, GridCell, Position, SphereColor, PALETTE};
    use memory_spheres_rendering::CameraRig;
    use memory_spheres_world::SelectionPhase;

    const FRAME: Duration = Duration::from_millis(16);
    const RED: SphereColor = PALETTE[1];
    const BLUE: SphereColor = PALETTE[2];

    struct Harness {
        simulation: Simulation,
        scene: Scene,
    }

    impl Harness {
        /// Session with the scheduler stopped so only hand-placed spheres exist.
        fn manual() -> Self {
            let mut simulation = Simulation::new(SpawningConfig::new(11));
            assert!(simulation.spawning.cancel());
            Self {
                simulation,
                scene: Scene::new(CameraRig::standard().expect("standard rig")),
            }
        }

        fn place(&mut self, color: SphereColor, x: f32) -> EntityId {
            let mut events = Vec::new();
            let index = query::spawned_count(&self.simulation.world);
            world::apply(
                &mut self.simulation.world,
                Command::SpawnSphere {
                    cell: GridCell::from_spawn_index(index),
                    position: Position::new(x, 0.0, 0.0),
                    color,
                },
                &mut events,
            );
            match events.as_slice() {
                [Event::SphereSpawned { id, .. }] => *id,
                other => panic!("unexpected spawn events: {other:?}"),
            }
        }

        fn ndc_of(&self, x: f32) -> Vec2 {
            self.scene
                .camera
                .view_projection()
                .project_point3(Vec3::new(x, 0.0, 0.0))
                .truncate()
        }

        fn frame(&mut self, pointer_ndc: Option<Vec2>, click: bool) {
            self.simulation.advance(
                FRAME,
                FrameInput { pointer_ndc, click },
                &mut self.scene,
            );
        }

        fn click_at(&mut self, x: f32) {
            let ndc = self.ndc_of(x);
            self.frame(Some(ndc), true);
        }

        fn material_of(&self, id: EntityId) -> SphereMaterial {
            self.scene
                .spheres
                .iter()
                .find(|sphere| sphere.id == id)
                .map(|sphere| sphere.material)
                .expect("sphere must be in the scene")
        }

        fn scene_ids(&self) -> Vec<EntityId> {
            self.scene.spheres.iter().map(|sphere| sphere.id).collect()
        }
    }

    #[test]
    fn first_frame_spawns_and_populates_scene() {
        let mut simulation = Simulation::new(SpawningConfig::new(3));
        let mut scene = Scene::new(CameraRig::standard().expect("standard rig"));

        simulation.advance(Duration::ZERO, FrameInput::default(), &mut scene);

        assert_eq!(scene.spheres.len(), 1);
        assert_eq!(scene.hud.spawned, 1);
        assert_eq!(scene.hud.remaining, Some(1));
        assert!(scene.cues.is_empty());
    }

    #[test]
    fn matching_pair_is_removed_with_correct_cue() {
        let mut harness = Harness::manual();
        let a = harness.place(RED, 0.0);
        let b = harness.place(RED, 30.0);
        let c = harness.place(BLUE, -30.0);
        harness.frame(None, false);
        assert_eq!(harness.scene.hud.remaining, Some(3));

        harness.click_at(0.0);
        assert_eq!(harness.scene.cues, vec![AudioCue::Click]);
        assert_eq!(harness.material_of(a), SphereMaterial::HIGHLIGHTED);

        harness.click_at(30.0);
        assert_eq!(
            harness.scene.cues,
            vec![AudioCue::Click, AudioCue::Correct]
        );
        assert_eq!(harness.scene_ids(), vec![c]);
        assert!(!query::is_live(&harness.simulation.world, b));
        assert_eq!(harness.scene.hud.score, 1);
        assert_eq!(harness.scene.hud.remaining, Some(1));
        assert_eq!(
            query::selection_phase(&harness.simulation.world),
            SelectionPhase::Idle
        );
    }

    #[test]
    fn mismatched_pair_stays_and_selection_clears() {
        let mut harness = Harness::manual();
        let a = harness.place(RED, 0.0);
        let b = harness.place(BLUE, 30.0);

        harness.click_at(0.0);
        harness.click_at(30.0);

        assert_eq!(harness.scene.cues, vec![AudioCue::Click]);
        assert_eq!(harness.scene_ids(), vec![a, b]);
        assert_eq!(harness.scene.hud.score, 0);
        assert_eq!(
            query::selection_phase(&harness.simulation.world),
            SelectionPhase::Idle
        );
        harness.frame(None, false);
        assert_eq!(harness.material_of(a), SphereMaterial::OPAQUE);
        assert_eq!(harness.material_of(b), SphereMaterial::OPAQUE);
    }

    #[test]
    fn clicking_empty_space_clears_selection() {
        let mut harness = Harness::manual();
        let a = harness.place(RED, 0.0);

        harness.click_at(0.0);
        assert_eq!(
            query::selection_phase(&harness.simulation.world),
            SelectionPhase::OneSelected
        );

        harness.frame(Some(Vec2::new(0.95, 0.95)), true);

        assert!(harness.scene.cues.is_empty());
        assert_eq!(
            query::selection_phase(&harness.simulation.world),
            SelectionPhase::Idle
        );
        assert_eq!(harness.scene_ids(), vec![a]);
        assert_eq!(harness.material_of(a), SphereMaterial::OPAQUE);
    }

    #[test]
    fn hover_highlights_without_selecting() {
        let mut harness = Harness::manual();
        let a = harness.place(RED, 0.0);
        let b = harness.place(BLUE, 30.0);

        let pointer = harness.ndc_of(30.0);
        harness.frame(Some(pointer), false);

        assert_eq!(harness.material_of(b), SphereMaterial::HIGHLIGHTED);
        assert_eq!(harness.material_of(a), SphereMaterial::OPAQUE);
        assert_eq!(
            query::selection_phase(&harness.simulation.world),
            SelectionPhase::Idle
        );
    }
}
