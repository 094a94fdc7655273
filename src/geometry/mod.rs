//! Coordinate triples and the geometric primitives the pipeline stages need:
//! distance, angle, circle fitting, circle intersection, and the cross-product
//! direction test.

use crate::decimal::ExactNum;
use crate::lexer::Token;

bitflags::bitflags! {
    /// Which axes of a [`Coord`] are actually populated. A plain struct field
    /// would force every consumer to carry three `Option<f64>`s; this keeps
    /// presence and value separate from a plain struct of three f64s.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AxisSet: u8 {
        const X = 0b001;
        const Y = 0b010;
        const Z = 0b100;
    }
}

/// The plane selected by G17/G18/G19, used to pick which axis a circle fit
/// drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Xy,
    Xz,
    Yz,
}

impl Plane {
    pub fn dropped_axis(self) -> AxisSet {
        match self {
            Plane::Xy => AxisSet::Z,
            Plane::Xz => AxisSet::Y,
            Plane::Yz => AxisSet::X,
        }
    }

    pub fn from_modal_code(code: &str) -> Option<Plane> {
        match code {
            "G17" => Some(Plane::Xy),
            "G18" => Some(Plane::Xz),
            "G19" => Some(Plane::Yz),
            _ => None,
        }
    }
}

/// A 3-D point with per-axis presence tracking.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub set: AxisSet,
}

impl Coord {
    pub fn new(x: f64, y: f64, z: f64, set: AxisSet) -> Self {
        Self { x, y, z, set }
    }

    pub fn has(&self, axis: AxisSet) -> bool {
        self.set.contains(axis)
    }

    /// Builds a `Coord` by reading X/Y/Z argument tokens out of a token
    /// sequence, leaving unset axes at `0.0`.
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> Coord {
        let mut c = Coord::default();
        for t in tokens {
            if t.kind() != crate::lexer::TokenKind::Argument {
                continue;
            }
            let Some(v) = t.value() else { continue };
            match t.code() {
                'X' => {
                    c.x = v.value();
                    c.set.insert(AxisSet::X);
                }
                'Y' => {
                    c.y = v.value();
                    c.set.insert(AxisSet::Y);
                }
                'Z' => {
                    c.z = v.value();
                    c.set.insert(AxisSet::Z);
                }
                _ => {}
            }
        }
        c
    }

    /// Per-axis difference `self - other`, ignoring presence.
    pub fn diff(&self, other: &Coord) -> (f64, f64, f64) {
        (self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// 3-D Euclidean distance between two coordinates.
    pub fn distance(&self, other: &Coord) -> f64 {
        let (dx, dy, dz) = self.diff(other);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Projects away one axis, returning the remaining two components in
    /// `(first, second)` order matching the conventional right-hand pairing
    /// for the plane that keeps the other two axes (XY for Z dropped, and so
    /// on).
    pub fn project(&self, drop: AxisSet) -> (f64, f64) {
        match drop {
            AxisSet::Z => (self.x, self.y),
            AxisSet::Y => (self.x, self.z),
            AxisSet::X => (self.y, self.z),
            _ => (self.x, self.y),
        }
    }

    /// Given a collection of coords, returns the set of axes on which every
    /// member shares the same value ("orthogonality").
    pub fn shared_axes<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> AxisSet {
        let mut iter = coords.into_iter();
        let Some(first) = iter.next() else {
            return AxisSet::empty();
        };
        let mut shared = AxisSet::X | AxisSet::Y | AxisSet::Z;
        for c in iter {
            if (c.x - first.x).abs() > f64::EPSILON {
                shared.remove(AxisSet::X);
            }
            if (c.y - first.y).abs() > f64::EPSILON {
                shared.remove(AxisSet::Y);
            }
            if (c.z - first.z).abs() > f64::EPSILON {
                shared.remove(AxisSet::Z);
            }
        }
        shared
    }
}

/// 2-D Euclidean distance.
pub fn distance_2d(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Angle of vector `(dx, dy)` in degrees, in `(-180, 180]`.
pub fn angle((dx, dy): (f64, f64)) -> f64 {
    let deg = dy.atan2(dx).to_degrees();
    if deg <= -180.0 {
        deg + 360.0
    } else {
        deg
    }
}

/// Counts trailing-significant digits after the decimal point of a decimal
/// literal's normalized text.
pub fn decimal_places(n: &ExactNum) -> usize {
    n.decimal_places()
}

/// Millimetre/inch-aware tolerance clamp bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Metric,
    Imperial,
}

/// Clamps a general tolerance value into its legal range for `units`:
/// `[0.001, 0.01]` mm or the inch equivalent `[0.00005, 0.2]`.
pub fn constrain_tolerance(t: f64, units: Units) -> f64 {
    let (lo, hi) = match units {
        Units::Metric => (0.001, 0.01),
        Units::Imperial => (0.00005, 0.2),
    };
    t.clamp(lo, hi)
}

/// Clamps a vertical-axis (Z) clamp height into its legal range for `units`:
/// `[0.5, 10]` mm or `[0.02, 0.5]` inch.
pub fn constrain_z_clamp(z: f64, units: Units) -> f64 {
    let (lo, hi) = match units {
        Units::Metric => (0.5, 10.0),
        Units::Imperial => (0.02, 0.5),
    };
    z.clamp(lo, hi)
}

/// The unique circle through three coplanar points, dropping `plane`'s axis.
/// `a`, `b`, `c` must agree on that axis's value or no circle is returned
/// (collinear points have no unique circle through them).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub centre: (f64, f64),
    pub radius: f64,
    pub clockwise: bool,
}

pub fn find_circle(a: &Coord, b: &Coord, c: &Coord, plane: Plane) -> Option<Circle> {
    let drop = plane.dropped_axis();
    let shared = Coord::shared_axes([a, b, c]);
    if !shared.contains(drop) {
        return None;
    }

    let (ax, ay) = a.project(drop);
    let (bx, by) = b.project(drop);
    let (cx, cy) = c.project(drop);

    // Standard linear solve for the circle through three points:
    // (x-g)^2 + (y-f)^2 = r^2 expanded and differenced pairwise.
    let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
    if d.abs() < 1e-9 {
        return None; // collinear
    }
    let a_sq = ax * ax + ay * ay;
    let b_sq = bx * bx + by * by;
    let c_sq = cx * cx + cy * cy;

    let ux = (a_sq * (by - cy) + b_sq * (cy - ay) + c_sq * (ay - by)) / d;
    let uy = (a_sq * (cx - bx) + b_sq * (ax - cx) + c_sq * (bx - ax)) / d;

    let radius = distance_2d((ax, ay), (ux, uy));
    let clockwise = direction_of_point((ax, ay), (bx, by), (ux, uy)) < 0;

    Some(Circle {
        centre: (ux, uy),
        radius,
        clockwise,
    })
}

/// Intersection points of two circles of radius `r` centred on `a` and `b`
/// (used to recover an arc's centre from its radius form). Returns 0, 1, or 2
/// points in the plane selected by `plane`.
pub fn find_intersections(a: (f64, f64), b: (f64, f64), r: f64, _plane: Plane) -> Vec<(f64, f64)> {
    let d = distance_2d(a, b);
    if d > 2.0 * r + 1e-9 || d < 1e-12 {
        return Vec::new();
    }
    let d = d.min(2.0 * r);
    let a_dist = d / 2.0;
    let h_sq = r * r - a_dist * a_dist;
    let h = if h_sq < 0.0 { 0.0 } else { h_sq.sqrt() };

    let mx = a.0 + a_dist * (b.0 - a.0) / d;
    let my = a.1 + a_dist * (b.1 - a.1) / d;

    if h < 1e-9 {
        return vec![(mx, my)];
    }

    let rx = -(b.1 - a.1) * (h / d);
    let ry = (b.0 - a.0) * (h / d);

    vec![(mx + rx, my + ry), (mx - rx, my - ry)]
}

/// Sign of the 2-D cross product `(pB - pA) x (pC - pA)`.
pub fn direction_of_point(p_a: (f64, f64), p_b: (f64, f64), p_c: (f64, f64)) -> i32 {
    let cross = (p_b.0 - p_a.0) * (p_c.1 - p_a.1) - (p_b.1 - p_a.1) * (p_c.0 - p_a.0);
    if cross > 1e-12 {
        1
    } else if cross < -1e-12 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64, z: f64) -> Coord {
        Coord::new(x, y, z, AxisSet::X | AxisSet::Y | AxisSet::Z)
    }

    #[test]
    fn distance_pythagorean() {
        let a = c(0.0, 0.0, 0.0);
        let b = c(3.0, 4.0, 0.0);
        assert_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn angle_of_east_is_zero() {
        assert_eq!(angle((1.0, 0.0)), 0.0);
    }

    #[test]
    fn angle_of_south_is_minus_ninety() {
        assert!((angle((0.0, -1.0)) + 90.0).abs() < 1e-9);
    }

    #[test]
    fn angle_of_west_is_180_not_minus_180() {
        assert_eq!(angle((-1.0, 0.0)), 180.0);
    }

    #[test]
    fn tolerance_clamped_to_metric_bounds() {
        assert_eq!(constrain_tolerance(0.0001, Units::Metric), 0.001);
        assert_eq!(constrain_tolerance(1.0, Units::Metric), 0.01);
        assert_eq!(constrain_tolerance(0.005, Units::Metric), 0.005);
    }

    #[test]
    fn z_clamp_clamped_to_imperial_bounds() {
        assert_eq!(constrain_z_clamp(0.0, Units::Imperial), 0.02);
        assert_eq!(constrain_z_clamp(100.0, Units::Imperial), 0.5);
    }

    #[test]
    fn find_circle_through_three_points_on_unit_circle() {
        let a = c(1.0, 0.0, 0.0);
        let b = c(0.0, 1.0, 0.0);
        let d = c(-1.0, 0.0, 0.0);
        let circle = find_circle(&a, &b, &d, Plane::Xy).expect("circle exists");
        assert!((circle.radius - 1.0).abs() < 1e-9);
        assert!(circle.centre.0.abs() < 1e-9 && circle.centre.1.abs() < 1e-9);
    }

    #[test]
    fn find_circle_collinear_points_returns_none() {
        let a = c(0.0, 0.0, 0.0);
        let b = c(1.0, 0.0, 0.0);
        let d = c(2.0, 0.0, 0.0);
        assert!(find_circle(&a, &b, &d, Plane::Xy).is_none());
    }

    #[test]
    fn find_circle_requires_shared_dropped_axis() {
        let a = c(1.0, 0.0, 0.0);
        let b = c(0.0, 1.0, 1.0);
        let d = c(-1.0, 0.0, 0.0);
        assert!(find_circle(&a, &b, &d, Plane::Xy).is_none());
    }

    #[test]
    fn find_intersections_two_points_symmetric() {
        let pts = find_intersections((0.0, 0.0), (10.0, 0.0), 5.0 * std::f64::consts::SQRT_2, Plane::Xy);
        assert_eq!(pts.len(), 2);
    }

    #[test]
    fn find_intersections_tangent_circles_one_point() {
        let pts = find_intersections((0.0, 0.0), (10.0, 0.0), 5.0, Plane::Xy);
        assert_eq!(pts.len(), 1);
    }

    #[test]
    fn find_intersections_too_far_apart_empty() {
        let pts = find_intersections((0.0, 0.0), (100.0, 0.0), 1.0, Plane::Xy);
        assert!(pts.is_empty());
    }

    #[test]
    fn direction_of_point_ccw_positive() {
        assert_eq!(direction_of_point((0.0, 0.0), (1.0, 0.0), (0.0, 1.0)), 1);
    }

    #[test]
    fn direction_of_point_cw_negative() {
        assert_eq!(direction_of_point((0.0, 0.0), (0.0, 1.0), (1.0, 0.0)), -1);
    }

    #[test]
    fn direction_of_point_collinear_zero() {
        assert_eq!(direction_of_point((0.0, 0.0), (1.0, 0.0), (2.0, 0.0)), 0);
    }
}
