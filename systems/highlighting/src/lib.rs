#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure highlighting system that derives per-sphere materials each frame.
//!
//! Selected spheres render at [`SphereMaterial::HIGHLIGHT_OPACITY`] and every
//! other live sphere renders opaque. The sphere under the pointer is then
//! made translucent on top of that rule for the current frame only.

use memory_spheres_core::{EntityId, SelectionSnapshot, SphereMaterial, SphereView};
use tracing::trace;

/// Material chosen for a single live sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightedSphere {
    /// Sphere the material applies to.
    pub id: EntityId,
    /// Material to apply to the sphere's renderable this frame.
    pub material: SphereMaterial,
}

/// Stateless apart from remembering the previous hover target for tracing.
#[derive(Debug, Default)]
pub struct Highlighting {
    hovered: Option<EntityId>,
}

impl Highlighting {
    /// Creates a new highlighting system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sphere that received the hover highlight during the last call.
    #[must_use]
    pub fn hovered(&self) -> Option<EntityId> {
        self.hovered
    }

    /// Emits one material per live sphere in view order.
    ///
    /// `hovered` is the frontmost sphere under the pointer; callers pass
    /// `None` when nothing or only the platform lies under the pointer.
    pub fn handle(
        &mut self,
        spheres: &SphereView,
        selection: SelectionSnapshot,
        hovered: Option<EntityId>,
        out: &mut Vec<HighlightedSphere>,
    ) {
        let hovered = hovered.filter(|id| spheres.iter().any(|sphere| sphere.id == *id));
        if hovered != self.hovered {
            trace!(
                from = self.hovered.map(|id| id.get()),
                to = hovered.map(|id| id.get()),
                "hover target changed"
            );
            self.hovered = hovered;
        }

        out.extend(spheres.iter().map(|sphere| {
            let material = if selection.contains(sphere.id) || hovered == Some(sphere.id) {
                SphereMaterial::HIGHLIGHTED
            } else {
                SphereMaterial::OPAQUE
            };
            HighlightedSphere {
                id: sphere.id,
                material,
            }
        }));
    }
}
