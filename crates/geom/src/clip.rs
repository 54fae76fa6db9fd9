//! Clipping convex polygons against half-planes.
//!
//! A clip equation `eq` is stored as a 3D vector. A point `p` is on the
//! visible side of the plane when `eq.x * p.x + eq.y * p.y + eq.z >= 0`.

use crate::math::{Point, Transform, Vector3D};
use alloc::vec::Vec;
use core::mem;

/// Reusable buffers for [`clip_against_planes`].
///
/// Each concurrent query needs its own scratch space.
#[derive(Clone, Debug, Default)]
pub struct ClipScratch {
    src: Vec<Point>,
    dst: Vec<Point>,
}

impl ClipScratch {
    pub fn new() -> Self {
        ClipScratch::default()
    }
}

#[inline]
fn signed_distance(eq: &Vector3D, p: Point) -> f32 {
    eq.x * p.x + eq.y * p.y + eq.z
}

/// Clips the convex polygon `src` against a single half-plane and writes the
/// result into `dst`.
///
/// Returns true if no point of `src` was clipped, in which case `dst` is a
/// copy of `src`. An empty `dst` means the polygon is entirely outside.
pub fn clip_against_plane(eq: &Vector3D, src: &[Point], dst: &mut Vec<Point>) -> bool {
    dst.clear();
    if src.is_empty() {
        return false;
    }

    let mut all_inside = true;
    let mut all_outside = true;
    for p in src {
        let d = signed_distance(eq, *p);
        all_inside &= d >= 0.0;
        all_outside &= d < 0.0;
    }

    if all_outside {
        return false;
    }

    if all_inside {
        dst.extend_from_slice(src);
        return true;
    }

    let n = src.len();
    for i in 0..n {
        let a = src[i];
        let b = src[(i + 1) % n];
        let da = signed_distance(eq, a);
        let db = signed_distance(eq, b);

        if da >= 0.0 {
            dst.push(a);
        }

        if (da >= 0.0) != (db >= 0.0) {
            let t = da / (da - db);
            dst.push(a.lerp(b, t));
        }
    }

    false
}

/// Clips the convex polygon against every plane in turn, leaving the result
/// in `out`.
///
/// Returns true if none of the planes clipped anything.
pub fn clip_against_planes(
    equations: &[Vector3D],
    polygon: &[Point],
    out: &mut Vec<Point>,
    scratch: &mut ClipScratch,
) -> bool {
    let mut unclipped = true;

    scratch.src.clear();
    scratch.src.extend_from_slice(polygon);
    for eq in equations {
        unclipped &= clip_against_plane(eq, &scratch.src, &mut scratch.dst);
        mem::swap(&mut scratch.src, &mut scratch.dst);
        if scratch.src.is_empty() {
            unclipped = false;
            break;
        }
    }

    out.clear();
    out.extend_from_slice(&scratch.src);

    unclipped
}

/// A 3x3 matrix mapping homogeneous local coordinates `(x, y, 1)` to clip
/// coordinates, stored row-major (`m[row][column]`) for column vectors.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ClipMatrix {
    pub m: [[f32; 3]; 3],
}

impl ClipMatrix {
    pub const IDENTITY: Self = ClipMatrix {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    pub fn new(m: [[f32; 3]; 3]) -> Self {
        ClipMatrix { m }
    }

    /// Builds the projective matrix equivalent to an affine transform.
    pub fn from_transform(t: &Transform) -> Self {
        ClipMatrix {
            m: [
                [t.m11, t.m21, t.m31],
                [t.m12, t.m22, t.m32],
                [0.0, 0.0, 1.0],
            ],
        }
    }

    /// Maps a clip-space plane equation into local space.
    ///
    /// This is the row vector `eq` multiplied by the matrix, so that
    /// `dot(eq, M * p) == dot(eq * M, p)`.
    pub fn transform_equation(&self, eq: &Vector3D) -> Vector3D {
        let e = [eq.x, eq.y, eq.z];
        let mut r = [0.0; 3];
        for (j, r) in r.iter_mut().enumerate() {
            *r = e[0] * self.m[0][j] + e[1] * self.m[1][j] + e[2] * self.m[2][j];
        }

        Vector3D::new(r[0], r[1], r[2])
    }

    pub fn transform_point(&self, p: Point) -> Point {
        let x = self.m[0][0] * p.x + self.m[0][1] * p.y + self.m[0][2];
        let y = self.m[1][0] * p.x + self.m[1][1] * p.y + self.m[1][2];
        let w = self.m[2][0] * p.x + self.m[2][1] * p.y + self.m[2][2];

        Point::new(x / w, y / w)
    }
}

impl Default for ClipMatrix {
    fn default() -> Self {
        ClipMatrix::IDENTITY
    }
}

#[cfg(test)]
use crate::math::{point, vector3};

#[cfg(test)]
fn unit_square() -> [Point; 4] {
    [
        point(0.0, 0.0),
        point(1.0, 0.0),
        point(1.0, 1.0),
        point(0.0, 1.0),
    ]
}

#[test]
fn clip_square_in_half() {
    // Keep x <= 0.5.
    let eq = vector3(-1.0, 0.0, 0.5);
    let mut out = Vec::new();
    assert!(!clip_against_plane(&eq, &unit_square(), &mut out));
    assert_eq!(out.len(), 4);
    for p in &out {
        assert!(p.x <= 0.5 + 1e-6);
    }
}

#[test]
fn clip_fully_inside_and_outside() {
    let mut out = Vec::new();

    let keep_all = vector3(1.0, 0.0, 1.0);
    assert!(clip_against_plane(&keep_all, &unit_square(), &mut out));
    assert_eq!(&out[..], &unit_square()[..]);

    let reject_all = vector3(1.0, 0.0, -5.0);
    assert!(!clip_against_plane(&reject_all, &unit_square(), &mut out));
    assert!(out.is_empty());
}

#[test]
fn clip_against_several_planes() {
    let mut scratch = ClipScratch::new();
    let mut out = Vec::new();

    let inside = [vector3(1.0, 0.0, 2.0), vector3(0.0, 1.0, 2.0)];
    assert!(clip_against_planes(&inside, &unit_square(), &mut out, &mut scratch));
    assert_eq!(out.len(), 4);

    let partial = [vector3(1.0, 0.0, 2.0), vector3(0.0, -1.0, 0.5)];
    assert!(!clip_against_planes(&partial, &unit_square(), &mut out, &mut scratch));
    assert!(!out.is_empty());

    let outside = [vector3(0.0, -1.0, 0.5), vector3(0.0, 1.0, -0.75)];
    assert!(!clip_against_planes(&outside, &unit_square(), &mut out, &mut scratch));
    assert!(out.is_empty());
}

#[test]
fn equation_follows_the_transform() {
    let transform = Transform::translation(10.0, 0.0);
    let matrix = ClipMatrix::from_transform(&transform);

    // In clip space, keep x >= 10.
    let eq = vector3(1.0, 0.0, -10.0);
    let local = matrix.transform_equation(&eq);

    // In local space this is x >= 0.
    assert_eq!(local, vector3(1.0, 0.0, 0.0));
    assert_eq!(matrix.transform_point(point(1.0, 2.0)), point(11.0, 2.0));
}
