use crate::bounding_box::BoundingBox;
use crate::math::{vector, Point, Vector};

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// The point where two consecutive edges of a contour meet.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Join {
    pub position: Point,
    /// Unit tangent of the edge going into the join.
    pub enter_unit_vector: Vector,
    /// Unit tangent of the edge leaving the join.
    pub leaving_unit_vector: Vector,
    /// Signed angle from the entering normal to the leaving normal.
    pub join_angle: f32,
    /// -1 or 1, selects the outer side of the join.
    pub lambda: f32,
    pub distance_from_previous_join: f32,
    pub distance_from_contour_start: f32,
    pub contour_length: f32,
    /// Position of the join in the path's join list. Stable across
    /// partitioning.
    pub source_index: u32,
}

impl Join {
    /// Creates a join and derives its angle and outer side from the two
    /// tangents.
    pub fn new(position: Point, enter_unit_vector: Vector, leaving_unit_vector: Vector) -> Self {
        let n0 = vector(-enter_unit_vector.y, enter_unit_vector.x);
        let n1 = vector(-leaving_unit_vector.y, leaving_unit_vector.x);

        // n1 * conj(n0) as complex numbers.
        let re = n1.x * n0.x + n1.y * n0.y;
        let im = n1.y * n0.x - n1.x * n0.y;

        let lambda = if leaving_unit_vector.dot(n0) > 0.0 {
            -1.0
        } else {
            1.0
        };

        Join {
            position,
            enter_unit_vector,
            leaving_unit_vector,
            join_angle: im.atan2(re),
            lambda,
            distance_from_previous_join: 0.0,
            distance_from_contour_start: 0.0,
            contour_length: 0.0,
            source_index: 0,
        }
    }

    pub fn enter_normal(&self) -> Vector {
        vector(-self.enter_unit_vector.y, self.enter_unit_vector.x)
    }

    pub fn leaving_normal(&self) -> Vector {
        vector(-self.leaving_unit_vector.y, self.leaving_unit_vector.x)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_corners(self.position, self.position)
    }
}

/// The end of an open contour.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Cap {
    pub position: Point,
    /// Unit vector pointing away from the contour.
    pub unit_vector: Vector,
    pub is_starting_cap: bool,
    pub edge_length: f32,
    pub contour_length: f32,
    pub distance_from_edge_start: f32,
    pub distance_from_contour_start: f32,
    /// Position of the cap in the path's cap list. Stable across
    /// partitioning.
    pub source_index: u32,
}

impl Cap {
    pub fn new(position: Point, unit_vector: Vector, is_starting_cap: bool) -> Self {
        Cap {
            position,
            unit_vector,
            is_starting_cap,
            edge_length: 0.0,
            contour_length: 0.0,
            distance_from_edge_start: 0.0,
            distance_from_contour_start: 0.0,
            source_index: 0,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_corners(self.position, self.position)
    }
}

#[test]
fn join_angle_and_side() {
    use crate::math::point;
    use core::f32::consts::FRAC_PI_2;

    // Going right then up: counter-clockwise turn.
    let j = Join::new(point(0.0, 0.0), vector(1.0, 0.0), vector(0.0, 1.0));
    assert!((j.join_angle - FRAC_PI_2).abs() < 1e-5);
    assert_eq!(j.lambda, -1.0);

    // Going right then down: clockwise turn.
    let j = Join::new(point(0.0, 0.0), vector(1.0, 0.0), vector(0.0, -1.0));
    assert!((j.join_angle + FRAC_PI_2).abs() < 1e-5);
    assert_eq!(j.lambda, 1.0);
}
