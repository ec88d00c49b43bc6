use glam::Vec2;
use memory_spheres_rendering::FrameInput;

/// Pointer travel in pixels below which a press and release count as a click.
pub const CLICK_SLOP_PIXELS: f32 = 4.0;

/// Tracks a single mouse button so drags steer the camera and short presses
/// register as clicks.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerDrag {
    last: Option<Vec2>,
    travelled: f32,
}

impl PointerDrag {
    /// Starts tracking a press at the provided window position.
    pub fn press(&mut self, position: Vec2) {
        self.last = Some(position);
        self.travelled = 0.0;
    }

    /// Whether a press is currently being tracked.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.last.is_some()
    }

    /// Returns the pointer movement since the previous sample while pressed.
    pub fn drag(&mut self, position: Vec2) -> Vec2 {
        let Some(last) = self.last else {
            return Vec2::ZERO;
        };
        let delta = position - last;
        self.last = Some(position);
        self.travelled += delta.length();
        delta
    }

    /// Ends the press, returning whether it qualifies as a click.
    pub fn release(&mut self) -> bool {
        self.last.take().is_some() && self.travelled < CLICK_SLOP_PIXELS
    }
}

/// Maps a window position in pixels to normalised device coordinates.
///
/// Returns `None` while the surface has no area.
#[must_use]
pub fn pointer_to_ndc(position: Vec2, surface: Vec2) -> Option<Vec2> {
    if surface.x <= 0.0 || surface.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        position.x / surface.x * 2.0 - 1.0,
        1.0 - position.y / surface.y * 2.0,
    ))
}

/// Builds the per-frame input from raw pointer observations.
#[must_use]
pub fn frame_input_from_observations(position: Vec2, surface: Vec2, click: bool) -> FrameInput {
    let pointer_ndc = pointer_to_ndc(position, surface);
    FrameInput {
        pointer_ndc,
        click: click && pointer_ndc.is_some(),
    }
}
