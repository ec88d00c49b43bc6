#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Memory Spheres adapters.
//!
//! The scene description, camera rig and pointer picking live here so the
//! simulation can hit-test and the backends can draw without either side
//! depending on a concrete graphics library.

pub mod camera;
pub mod picking;

use anyhow::Result as AnyResult;
use glam::{Vec2, Vec3};
use memory_spheres_core::{EntityId, Position, SphereColor, SphereMaterial};
use std::time::Duration;
use thiserror::Error;

pub use self::camera::{CameraRig, OrbitControls, PerspectiveCamera};
pub use self::picking::{Intersection, PickedObject, Ray};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with its alpha channel replaced.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

impl From<SphereColor> for Color {
    fn from(color: SphereColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

/// Audible feedback requested by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// A click ray hit a live sphere.
    Click,
    /// Two selected spheres matched.
    Correct,
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Pointer position in normalised device coordinates, `y` pointing up.
    pub pointer_ndc: Option<Vec2>,
    /// Whether a click completed on this frame at [`FrameInput::pointer_ndc`].
    pub click: bool,
}

/// Sphere renderable derived from a live entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpherePresentation {
    /// Entity the renderable belongs to.
    pub id: EntityId,
    /// World-space centre.
    pub center: Vec3,
    /// Radius in world units.
    pub radius: f32,
    /// Base color of the sphere.
    pub color: Color,
    /// Material state for the current frame.
    pub material: SphereMaterial,
}

impl SpherePresentation {
    /// Radius shared by every sphere.
    pub const RADIUS: f32 = 5.0;

    /// Creates a sphere renderable with the standard radius.
    #[must_use]
    pub fn new(id: EntityId, center: Vec3, color: Color, material: SphereMaterial) -> Self {
        Self {
            id,
            center,
            radius: Self::RADIUS,
            color,
            material,
        }
    }

    /// Color to draw with, alpha taken from the material.
    #[must_use]
    pub fn fill(&self) -> Color {
        self.color.with_alpha(self.material.opacity)
    }
}

/// Converts a world position into a renderable centre.
#[must_use]
pub fn position_to_vec3(position: Position) -> Vec3 {
    Vec3::new(position.x, position.y, position.z)
}

/// Box-shaped ground platform the spheres rest above.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlatformPresentation {
    /// World-space centre of the box.
    pub center: Vec3,
    /// Edge lengths along each axis.
    pub size: Vec3,
    /// Fill color.
    pub color: Color,
}

impl PlatformPresentation {
    /// Platform used by the game.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            center: Vec3::new(7.5, -42.0, 0.0),
            size: Vec3::new(180.0, 5.0, 180.0),
            color: Color::from_rgb_u8(0x5e, 0x45, 0x4b),
        }
    }
}

/// Counters shown on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HudPresentation {
    /// Total spheres spawned so far.
    pub spawned: u32,
    /// Matched pairs.
    pub score: u32,
    /// Remaining counter, absent until the first resolution frame.
    pub remaining: Option<i32>,
}

/// Scene shared between the simulation and the rendering backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Camera the backend renders with and the simulation picks through.
    pub camera: CameraRig,
    /// Ground platform.
    pub platform: PlatformPresentation,
    /// Live spheres with their materials for this frame.
    pub spheres: Vec<SpherePresentation>,
    /// Counters shown on screen.
    pub hud: HudPresentation,
    /// Audio cues to play, drained by the backend every frame.
    pub cues: Vec<AudioCue>,
}

impl Scene {
    /// Creates an empty scene over the standard platform.
    #[must_use]
    pub fn new(camera: CameraRig) -> Self {
        Self {
            camera,
            platform: PlatformPresentation::standard(),
            spheres: Vec::new(),
            hud: HudPresentation::default(),
            cues: Vec::new(),
        }
    }

    /// Casts a ray from the pointer through the scene camera.
    #[must_use]
    pub fn pointer_ray(&self, pointer_ndc: Vec2) -> Option<Ray> {
        Ray::from_ndc(pointer_ndc, self.camera.view_projection())
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Memory Spheres scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// Each frame the backend handles surface resizes and camera controls,
    /// then invokes `update_scene` with the frame delta and the pointer input
    /// so the simulation can mutate the scene before it is drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum RenderingError {
    /// The vertical field of view must lie strictly between 0 and 180 degrees.
    #[error("field of view must lie between 0 and 180 degrees (received {degrees})")]
    InvalidFieldOfView {
        /// Provided field of view in degrees.
        degrees: f32,
    },
    /// Clip planes must satisfy `0 < near < far`.
    #[error("clip planes must satisfy 0 < near < far (received near {near}, far {far})")]
    InvalidClipPlanes {
        /// Provided near plane distance.
        near: f32,
        /// Provided far plane distance.
        far: f32,
    },
    /// The aspect ratio must be positive and finite.
    #[error("aspect ratio must be positive (received {aspect})")]
    InvalidAspect {
        /// Provided aspect ratio.
        aspect: f32,
    },
    /// Render targets must have a positive area.
    #[error("surface must have a positive area (received {width}x{height})")]
    DegenerateSurface {
        /// Provided width in pixels.
        width: f32,
        /// Provided height in pixels.
        height: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_spheres_core::PALETTE;

    #[test]
    fn sphere_fill_takes_alpha_from_material() {
        let sphere = SpherePresentation::new(
            EntityId::new(0),
            Vec3::ZERO,
            Color::from(PALETTE[2]),
            SphereMaterial::HIGHLIGHTED,
        );
        let fill = sphere.fill();
        assert_eq!(fill.alpha, SphereMaterial::HIGHLIGHT_OPACITY);
        assert_eq!(fill.blue, 0xaa as f32 / 255.0);
        assert_eq!(
            Color::from_rgb_u8(255, 0, 255).with_alpha(0.25),
            Color::new(1.0, 0.0, 1.0, 0.25)
        );
    }

    #[test]
    fn scene_new_starts_empty_over_standard_platform() {
        let scene = Scene::new(CameraRig::standard().expect("standard rig"));
        assert!(scene.spheres.is_empty());
        assert!(scene.cues.is_empty());
        assert_eq!(scene.hud, HudPresentation::default());
        assert_eq!(scene.platform, PlatformPresentation::standard());
    }

    #[test]
    fn rendering_error_messages_name_the_offending_value() {
        let error = RenderingError::DegenerateSurface {
            width: 640.0,
            height: 0.0,
        };
        assert_eq!(
            error.to_string(),
            "surface must have a positive area (received 640x0)"
        );
    }

    #[test]
    fn position_converts_component_wise() {
        let center = position_to_vec3(Position::new(1.0, -2.0, 3.5));
        assert_eq!(center, Vec3::new(1.0, -2.0, 3.5));
    }
}
