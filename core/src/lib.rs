#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Memory Spheres engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Memory Spheres.";

/// Number of grid columns filled before the cursor moves one step deeper.
pub const GRID_WIDTH: u32 = 6;

/// Number of spheres that compose a single horizontal layer of the grid.
pub const LAYER_SIZE: u32 = GRID_WIDTH * GRID_WIDTH;

/// Total number of spheres a session ever spawns.
pub const MAX_SPHERES: u32 = LAYER_SIZE * 6;

/// Colors a sphere may be assigned, in draw order.
pub const PALETTE: [SphereColor; 7] = [
    SphereColor::from_rgb(0xa1, 0x55, 0xb9),
    SphereColor::from_rgb(0x8e, 0x05, 0x05),
    SphereColor::from_rgb(0x16, 0x5b, 0xaa),
    SphereColor::from_rgb(0xff, 0xf7, 0xe0),
    SphereColor::from_rgb(0xff, 0xe6, 0x99),
    SphereColor::from_rgb(0xff, 0x92, 0x92),
    SphereColor::from_rgb(0xb2, 0xf9, 0xfc),
];

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new sphere be placed into the registry.
    SpawnSphere {
        /// Grid cell the sphere was scheduled for.
        cell: GridCell,
        /// World-space centre of the sphere, jitter included.
        position: Position,
        /// Appearance assigned to the sphere.
        color: SphereColor,
    },
    /// Reports a pointer click together with the sphere under the pointer, if any.
    Click {
        /// Frontmost sphere intersected by the click ray.
        hit: Option<EntityId>,
    },
    /// Evaluates a fully staged selection and clears both slots.
    ResolveSelection,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a sphere entered the registry.
    SphereSpawned {
        /// Identifier allocated to the sphere by the world.
        id: EntityId,
        /// Grid cell the sphere occupies.
        cell: GridCell,
        /// World-space centre of the sphere.
        position: Position,
        /// Appearance applied to the sphere.
        color: SphereColor,
        /// Total number of spheres spawned so far, this one included.
        spawned: u32,
    },
    /// Reports that a click ray hit a live sphere.
    SphereClicked {
        /// Identifier of the sphere that was hit.
        id: EntityId,
    },
    /// Announces the new contents of the selection slots.
    SelectionChanged {
        /// Sphere held by the first slot.
        first: Option<EntityId>,
        /// Sphere held by the second slot.
        second: Option<EntityId>,
    },
    /// Announces that both selection slots were emptied.
    SelectionCleared,
    /// Reports that the remaining counter received its initial value.
    RemainingInitialized {
        /// Value the counter starts from.
        remaining: i32,
    },
    /// Confirms that two spheres of equal color were matched and removed.
    PairMatched {
        /// Sphere that occupied the first slot.
        first: EntityId,
        /// Sphere that occupied the second slot.
        second: EntityId,
        /// Shared color of the matched spheres.
        color: SphereColor,
        /// Score after the match was credited.
        score: u32,
        /// Remaining counter after the match was debited.
        remaining: i32,
    },
    /// Reports that two selected spheres differed in color and were released.
    PairMismatched {
        /// Sphere that occupied the first slot.
        first: EntityId,
        /// Sphere that occupied the second slot.
        second: EntityId,
    },
    /// Announces that every sphere of a fully spawned session has been matched.
    AllPairsCleared {
        /// Final score of the session.
        score: u32,
    },
}

/// Visual appearance applied to a sphere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SphereColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl SphereColor {
    /// Creates a new sphere color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Packs the color into a `0xRRGGBB` integer.
    #[must_use]
    pub const fn to_hex(&self) -> u32 {
        (self.red as u32) << 16 | (self.green as u32) << 8 | self.blue as u32
    }
}

/// Unique identifier assigned to a sphere.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Discrete slot of the spawn grid, expressed as column, depth and layer indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    column: u32,
    depth: u32,
    layer: u32,
}

impl GridCell {
    /// Creates a new grid cell.
    #[must_use]
    pub const fn new(column: u32, depth: u32, layer: u32) -> Self {
        Self {
            column,
            depth,
            layer,
        }
    }

    /// Cell occupied by the sphere with the provided zero-based spawn index.
    ///
    /// Columns wrap every [`GRID_WIDTH`] spawns and advance the depth; every
    /// [`LAYER_SIZE`] spawns the layer advances and column and depth restart.
    #[must_use]
    pub const fn from_spawn_index(index: u32) -> Self {
        Self {
            column: index % GRID_WIDTH,
            depth: (index / GRID_WIDTH) % GRID_WIDTH,
            layer: index / LAYER_SIZE,
        }
    }

    /// Zero-based column index along the x axis.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based depth index along the z axis.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Zero-based layer index along the y axis.
    #[must_use]
    pub const fn layer(&self) -> u32 {
        self.layer
    }
}

/// Point in world space measured in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset.
    pub x: f32,
    /// Vertical offset.
    pub y: f32,
    /// Depth offset.
    pub z: f32,
}

impl Position {
    /// Creates a new world-space position.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Immutable representation of a single sphere used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereSnapshot {
    /// Unique identifier assigned to the sphere.
    pub id: EntityId,
    /// Grid cell the sphere was spawned into.
    pub cell: GridCell,
    /// World-space centre of the sphere.
    pub position: Position,
    /// Appearance assigned to the sphere.
    pub color: SphereColor,
}

/// Read-only snapshot describing all live spheres.
#[derive(Clone, Debug, Default)]
pub struct SphereView {
    snapshots: Vec<SphereSnapshot>,
}

impl SphereView {
    /// Creates a new sphere view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<SphereSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured sphere snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &SphereSnapshot> {
        self.snapshots.iter()
    }

    /// Number of live spheres captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no spheres.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Contents of the two selection slots at a point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SelectionSnapshot {
    /// Sphere held by the first slot.
    pub first: Option<EntityId>,
    /// Sphere held by the second slot.
    pub second: Option<EntityId>,
}

impl SelectionSnapshot {
    /// Reports whether the provided sphere occupies either slot.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.first == Some(id) || self.second == Some(id)
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn occupied(&self) -> usize {
        usize::from(self.first.is_some()) + usize::from(self.second.is_some())
    }
}

/// Per-frame material state applied to a sphere's renderable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereMaterial {
    /// Opacity in the range 0.0..=1.0.
    pub opacity: f32,
    /// Whether the renderable must be blended rather than drawn opaque.
    pub translucent: bool,
}

impl SphereMaterial {
    /// Opacity used for selected and hovered spheres.
    pub const HIGHLIGHT_OPACITY: f32 = 0.6;

    /// Fully opaque material.
    pub const OPAQUE: Self = Self {
        opacity: 1.0,
        translucent: false,
    };

    /// Material used for selected and hovered spheres.
    pub const HIGHLIGHTED: Self = Self {
        opacity: Self::HIGHLIGHT_OPACITY,
        translucent: true,
    };
}

impl Default for SphereMaterial {
    fn default() -> Self {
        Self::OPAQUE
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityId, GridCell, Position, SphereColor, MAX_SPHERES, PALETTE};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn grid_cell_wraps_columns_into_depth() {
        assert_eq!(GridCell::from_spawn_index(5), GridCell::new(5, 0, 0));
        assert_eq!(GridCell::from_spawn_index(6), GridCell::new(0, 1, 0));
        assert_eq!(GridCell::from_spawn_index(35), GridCell::new(5, 5, 0));
    }

    #[test]
    fn grid_cell_starts_new_layer_every_thirty_six_spawns() {
        assert_eq!(GridCell::from_spawn_index(36), GridCell::new(0, 0, 1));
        assert_eq!(
            GridCell::from_spawn_index(MAX_SPHERES - 1),
            GridCell::new(5, 5, 5)
        );
    }

    #[test]
    fn palette_colors_are_distinct() {
        for (index, color) in PALETTE.iter().enumerate() {
            assert!(PALETTE[index + 1..].iter().all(|other| other != color));
        }
    }

    #[test]
    fn sphere_color_packs_into_hex() {
        assert_eq!(PALETTE[0].to_hex(), 0x00a1_55b9);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn entity_id_round_trips_through_bincode() {
        assert_round_trip(&EntityId::new(42));
    }

    #[test]
    fn sphere_placement_round_trips_through_bincode() {
        assert_round_trip(&GridCell::new(3, 1, 2));
        assert_round_trip(&Position::new(-60.0, -30.0, 12.5));
        assert_round_trip(&SphereColor::from_rgb(0x16, 0x5b, 0xaa));
    }
}
