//! Ray casting from the pointer through the camera into the scene.

use std::cmp::Ordering;

use glam::{Mat4, Vec2, Vec3};
use memory_spheres_core::EntityId;

use crate::{PlatformPresentation, Scene, SpherePresentation};

/// Half-line starting at `origin` travelling along a unit `direction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Start of the ray in world space.
    pub origin: Vec3,
    /// Unit direction of travel.
    pub direction: Vec3,
}

impl Ray {
    /// Casts a ray through normalised device coordinates (`-1..=1` on both
    /// axes, `y` pointing up) using the inverse of a view-projection matrix.
    ///
    /// Returns `None` when the matrix cannot be inverted.
    #[must_use]
    pub fn from_ndc(ndc: Vec2, view_projection: Mat4) -> Option<Self> {
        if view_projection.determinant().abs() <= f32::EPSILON {
            return None;
        }
        let inverse = view_projection.inverse();
        let near = inverse.project_point3(ndc.extend(-1.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        let direction = (far - near).try_normalize()?;
        Some(Self {
            origin: near,
            direction,
        })
    }

    /// Point reached after travelling `distance` along the ray.
    #[must_use]
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Object that a ray may intersect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PickedObject {
    /// A live sphere.
    Sphere(EntityId),
    /// The ground platform.
    Platform,
}

/// Single ray hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    /// Object that was hit.
    pub object: PickedObject,
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
}

/// Distance along the ray to the first point on the sphere, if any.
#[must_use]
pub fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let offset = ray.origin - center;
    let half_b = offset.dot(ray.direction);
    let c = offset.length_squared() - radius * radius;
    let discriminant = half_b * half_b - c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let near = -half_b - root;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -half_b + root;
    (far >= 0.0).then_some(far)
}

/// Distance along the ray to the first point on an axis-aligned box, if any.
#[must_use]
pub fn intersect_box(ray: &Ray, center: Vec3, size: Vec3) -> Option<f32> {
    let half = size * 0.5;
    let inverse = ray.direction.recip();
    let t0 = (center - half - ray.origin) * inverse;
    let t1 = (center + half - ray.origin) * inverse;
    let entry = t0.min(t1).max_element();
    let exit = t0.max(t1).min_element();

    if exit < entry.max(0.0) {
        return None;
    }
    Some(entry.max(0.0))
}

/// All objects in the scene intersected by the ray, nearest first.
#[must_use]
pub fn intersections(scene: &Scene, ray: &Ray) -> Vec<Intersection> {
    let mut hits: Vec<Intersection> = scene
        .spheres
        .iter()
        .filter_map(|sphere| sphere_hit(ray, sphere))
        .collect();
    if let Some(hit) = platform_hit(ray, &scene.platform) {
        hits.push(hit);
    }
    hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
    hits
}

/// Frontmost object under the ray; the platform occludes spheres behind it.
#[must_use]
pub fn pick_frontmost(scene: &Scene, ray: &Ray) -> Option<PickedObject> {
    intersections(scene, ray).first().map(|hit| hit.object)
}

/// Frontmost sphere under the ray, ignoring the platform entirely.
#[must_use]
pub fn pick_sphere(scene: &Scene, ray: &Ray) -> Option<EntityId> {
    scene
        .spheres
        .iter()
        .filter_map(|sphere| sphere_hit(ray, sphere))
        .min_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal))
        .and_then(|hit| match hit.object {
            PickedObject::Sphere(id) => Some(id),
            PickedObject::Platform => None,
        })
}

fn sphere_hit(ray: &Ray, sphere: &SpherePresentation) -> Option<Intersection> {
    intersect_sphere(ray, sphere.center, sphere.radius).map(|distance| Intersection {
        object: PickedObject::Sphere(sphere.id),
        distance,
    })
}

fn platform_hit(ray: &Ray, platform: &PlatformPresentation) -> Option<Intersection> {
    intersect_box(ray, platform.center, platform.size).map(|distance| Intersection {
        object: PickedObject::Platform,
        distance,
    })
}
