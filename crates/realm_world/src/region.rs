//! # Regions
//!
//! Immutable ground-plane shapes used for spawn placement and zone checks.
//!
//! Every shape answers the same two questions:
//! - `contains(point)` - is the point inside, boundary included? Height is ignored.
//! - `random_point()` - a uniformly distributed point inside, at `y = 0`.
//!
//! [`Region`] dispatches over the shapes with `match`. Regions are plain
//! values: build once from zone configuration, then share freely.

use rand::Rng;
use realm_shared::{Vec2, Vec3};

use crate::error::{WorldError, WorldResult};

/// Rejection-sampling budget for circles and polygons.
pub const MAX_SAMPLE_ATTEMPTS: u32 = 256;

/// Axis-aligned rectangle on the ground plane.
///
/// Stored as origin plus extents. Construction takes the far corner, so the
/// extents are always `far - origin` and never negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rectangle {
    x: f32,
    z: f32,
    width: f32,
    length: f32,
}

impl Rectangle {
    /// Builds a rectangle from its origin corner and its far corner.
    ///
    /// # Arguments
    ///
    /// * `x`, `z` - Origin (minimum) corner
    /// * `far_x`, `far_z` - Opposite (maximum) corner, absolute coordinates
    ///
    /// # Errors
    ///
    /// - [`WorldError::InvertedRegion`] if the far corner is before the
    ///   origin on either axis, or any coordinate is NaN. Zero extents are
    ///   allowed.
    /// - [`WorldError::NonFiniteRegion`] if a coordinate is infinite or an
    ///   extent exceeds half the `f32` range.
    pub fn from_corners(x: f32, z: f32, far_x: f32, far_z: f32) -> WorldResult<Self> {
        // Negated comparison so NaN is rejected too.
        if !(far_x >= x && far_z >= z) {
            return Err(WorldError::InvertedRegion { x, z, far_x, far_z });
        }
        let rect = Self {
            x,
            z,
            width: far_x - x,
            length: far_z - z,
        };
        // Sampling scales the extents; keep headroom below f32::MAX.
        let far = rect.far_corner();
        let sane = [x, z, far.x, far.z, rect.width * 2.0, rect.length * 2.0]
            .iter()
            .all(|v| v.is_finite());
        if !sane {
            return Err(WorldError::NonFiniteRegion);
        }
        Ok(rect)
    }

    /// Origin x.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Origin z.
    #[inline]
    #[must_use]
    pub const fn z(&self) -> f32 {
        self.z
    }

    /// Extent along x.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Extent along z.
    #[inline]
    #[must_use]
    pub const fn length(&self) -> f32 {
        self.length
    }

    /// Far corner.
    #[inline]
    #[must_use]
    pub fn far_corner(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.z + self.length)
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.z + self.length * 0.5)
    }

    /// Ground-plane containment, inclusive on all four edges.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        self.contains_xz(point.xz())
    }

    #[inline]
    fn contains_xz(&self, point: Vec2) -> bool {
        let far = self.far_corner();
        point.x >= self.x && point.x <= far.x && point.z >= self.z && point.z <= far.z
    }

    /// Uniform point inside the rectangle, `y = 0`.
    pub fn random_point_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        self.random_xz(rng).with_height(0.0)
    }

    fn random_xz<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        let far = self.far_corner();
        Vec2::new(rng.gen_range(self.x..=far.x), rng.gen_range(self.z..=far.z))
    }
}

/// Disc on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    center: Vec2,
    radius: f32,
    bounds: Rectangle,
}

impl Circle {
    /// Creates a circle.
    ///
    /// # Errors
    ///
    /// - [`WorldError::InvalidRadius`] if `radius` is negative or not finite
    /// - [`WorldError::NonFiniteRegion`] if the center is not finite or the
    ///   bounding square does not fit in `f32`
    pub fn new(center: Vec2, radius: f32) -> WorldResult<Self> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(WorldError::InvalidRadius(radius));
        }
        if !center.x.is_finite() || !center.z.is_finite() {
            return Err(WorldError::NonFiniteRegion);
        }
        let bounds = Rectangle::from_corners(
            center.x - radius,
            center.z - radius,
            center.x + radius,
            center.z + radius,
        )?;
        Ok(Self {
            center,
            radius,
            bounds,
        })
    }

    /// Center point.
    #[inline]
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Radius.
    #[inline]
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Ground-plane containment, boundary included.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        self.contains_xz(point.xz())
    }

    fn contains_xz(&self, point: Vec2) -> bool {
        let dx = f64::from(point.x) - f64::from(self.center.x);
        let dz = f64::from(point.z) - f64::from(self.center.z);
        let radius = f64::from(self.radius);
        dx * dx + dz * dz <= radius * radius
    }

    /// Smallest axis-aligned rectangle around the circle.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> Rectangle {
        self.bounds
    }

    /// Uniform point inside the circle, `y = 0`.
    ///
    /// Samples the bounding square and keeps the first hit. Falls back to the
    /// center if every attempt misses.
    pub fn random_point_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        (0..MAX_SAMPLE_ATTEMPTS)
            .map(|_| self.bounds.random_xz(rng))
            .find(|candidate| self.contains_xz(*candidate))
            .unwrap_or(self.center)
            .with_height(0.0)
    }
}

/// Simple polygon on the ground plane.
///
/// Vertices are in order, either winding; the last vertex connects back to
/// the first.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
    bounds: Rectangle,
}

impl Polygon {
    /// Creates a polygon.
    ///
    /// # Errors
    ///
    /// - [`WorldError::DegeneratePolygon`] for fewer than three vertices, zero
    ///   area, or non-finite coordinates
    /// - [`WorldError::NonFiniteRegion`] if the bounding rectangle does not
    ///   fit in `f32`
    pub fn new(vertices: Vec<Vec2>) -> WorldResult<Self> {
        let degenerate = WorldError::DegeneratePolygon {
            vertices: vertices.len(),
        };
        if vertices.len() < 3 || vertices.iter().any(|v| !v.x.is_finite() || !v.z.is_finite()) {
            return Err(degenerate);
        }

        let first = vertices[0];
        let doubled_area: f32 = vertices
            .windows(2)
            .map(|pair| first.cross(pair[0], pair[1]))
            .sum();
        if doubled_area == 0.0 {
            return Err(degenerate);
        }

        let (min, max) = vertices.iter().fold((first, first), |(min, max), v| {
            (
                Vec2::new(min.x.min(v.x), min.z.min(v.z)),
                Vec2::new(max.x.max(v.x), max.z.max(v.z)),
            )
        });
        let bounds = Rectangle::from_corners(min.x, min.z, max.x, max.z)?;

        Ok(Self { vertices, bounds })
    }

    /// Vertices in order.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Axis-aligned bounding rectangle.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> Rectangle {
        self.bounds
    }

    /// Ground-plane containment, edges and vertices included.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        self.contains_xz(point.xz())
    }

    fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    fn contains_xz(&self, point: Vec2) -> bool {
        if !self.bounds.contains_xz(point) {
            return false;
        }

        let mut inside = false;
        for (a, b) in self.edges() {
            if on_segment(point, a, b) {
                return true;
            }
            // Crossing number: count edges straddling the horizontal ray.
            if (a.z > point.z) != (b.z > point.z) {
                let crossing_x = a.x + (point.z - a.z) / (b.z - a.z) * (b.x - a.x);
                if point.x < crossing_x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Uniform point inside the polygon, `y = 0`.
    ///
    /// Samples the bounding rectangle and keeps the first hit. Falls back to
    /// the first vertex (which is on the boundary) if every attempt misses.
    pub fn random_point_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let hit = (0..MAX_SAMPLE_ATTEMPTS)
            .map(|_| self.bounds.random_xz(rng))
            .find(|candidate| self.contains_xz(*candidate));

        hit.unwrap_or_else(|| {
            tracing::warn!(
                vertices = self.vertices.len(),
                attempts = MAX_SAMPLE_ATTEMPTS,
                "polygon sampling missed, using first vertex"
            );
            self.vertices[0]
        })
        .with_height(0.0)
    }
}

fn on_segment(point: Vec2, a: Vec2, b: Vec2) -> bool {
    point.cross(a, b) == 0.0
        && point.x >= a.x.min(b.x)
        && point.x <= a.x.max(b.x)
        && point.z >= a.z.min(b.z)
        && point.z <= a.z.max(b.z)
}

/// A ground-plane zone shape.
///
/// # Example
///
/// ```rust,ignore
/// let region = Region::rectangle(0.0, 0.0, 100.0, 50.0)?;
/// let spawn_at = region.random_point();
/// assert!(region.contains(spawn_at));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Region {
    /// Axis-aligned rectangle.
    Rectangle(Rectangle),
    /// Disc.
    Circle(Circle),
    /// Simple polygon.
    Polygon(Polygon),
}

impl Region {
    /// Rectangle from origin and far corner. See [`Rectangle::from_corners`].
    ///
    /// # Errors
    ///
    /// [`WorldError::InvertedRegion`] if the corners are inverted,
    /// [`WorldError::NonFiniteRegion`] if the extents overflow.
    pub fn rectangle(x: f32, z: f32, far_x: f32, far_z: f32) -> WorldResult<Self> {
        Rectangle::from_corners(x, z, far_x, far_z).map(Self::Rectangle)
    }

    /// Circle around `(center_x, center_z)`.
    ///
    /// # Errors
    ///
    /// [`WorldError::InvalidRadius`] for a negative or non-finite radius,
    /// [`WorldError::NonFiniteRegion`] if the circle does not fit in `f32`.
    pub fn circle(center_x: f32, center_z: f32, radius: f32) -> WorldResult<Self> {
        Circle::new(Vec2::new(center_x, center_z), radius).map(Self::Circle)
    }

    /// Polygon through `vertices`.
    ///
    /// # Errors
    ///
    /// [`WorldError::DegeneratePolygon`] for fewer than three vertices or zero area.
    pub fn polygon(vertices: impl IntoIterator<Item = Vec2>) -> WorldResult<Self> {
        Polygon::new(vertices.into_iter().collect()).map(Self::Polygon)
    }

    /// Returns `true` if `point` lies inside, boundary included. `y` is ignored.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        match self {
            Self::Rectangle(rect) => rect.contains(point),
            Self::Circle(circle) => circle.contains(point),
            Self::Polygon(polygon) => polygon.contains(point),
        }
    }

    /// Uniform random point inside, `y = 0`, using the thread-local generator.
    #[must_use]
    pub fn random_point(&self) -> Vec3 {
        self.random_point_with(&mut rand::thread_rng())
    }

    /// Uniform random point inside, `y = 0`, drawn from `rng`.
    pub fn random_point_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        match self {
            Self::Rectangle(rect) => rect.random_point_with(rng),
            Self::Circle(circle) => circle.random_point_with(rng),
            Self::Polygon(polygon) => polygon.random_point_with(rng),
        }
    }

    /// Smallest axis-aligned rectangle containing the region.
    #[must_use]
    pub fn bounds(&self) -> Rectangle {
        match self {
            Self::Rectangle(rect) => *rect,
            Self::Circle(circle) => circle.bounds(),
            Self::Polygon(polygon) => polygon.bounds(),
        }
    }

    /// Shape name for logs.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Rectangle(_) => "rectangle",
            Self::Circle(_) => "circle",
            Self::Polygon(_) => "polygon",
        }
    }
}

impl From<Rectangle> for Region {
    fn from(rect: Rectangle) -> Self {
        Self::Rectangle(rect)
    }
}
