//! Small helpers shared by the stroking and partitioning code.

use alloc::vec::Vec;
use core::f32::consts::PI;

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// Number of line segments needed to approximate an arc of `angle` radians
/// so that the distance to the true curve stays below `threshold` (expressed
/// relative to a unit radius).
///
/// A non-positive threshold yields a single segment.
pub fn number_segments_for_tessellation(angle: f32, threshold: f32) -> u32 {
    if threshold <= 0.0 {
        return 1;
    }

    let num_half_circles = (angle / PI).abs().floor();
    let angle = angle.abs().min(PI);
    let d = (0.5 * threshold).sqrt().min(1.0);
    let theta = (2.0 * d.asin()).max(1e-5);
    let needed = ((PI * num_half_circles + angle) / theta) as u32;

    1 + needed.max(3)
}

/// Appends a triangle fan over the vertices `begin..end` to `indices`.
///
/// `begin` is the pivot. Ranges of fewer than three vertices produce
/// nothing.
pub fn add_triangle_fan(begin: u32, end: u32, indices: &mut Vec<u32>) {
    if end < begin + 3 {
        return;
    }

    for i in begin + 1..end - 1 {
        indices.push(begin);
        indices.push(i);
        indices.push(i + 1);
    }
}

/// Writes a triangle fan over the vertices `begin..end` into `out`, returning
/// the number of indices written.
///
/// `out` must hold at least `3 * (end - begin - 2)` indices.
pub fn write_triangle_fan(begin: u32, end: u32, out: &mut [u32]) -> usize {
    if end < begin + 3 {
        return 0;
    }

    let mut n = 0;
    for i in begin + 1..end - 1 {
        out[n] = begin;
        out[n + 1] = i;
        out[n + 2] = i + 1;
        n += 3;
    }

    n
}

#[test]
fn tessellation_counts() {
    assert_eq!(number_segments_for_tessellation(PI, 0.0), 1);
    assert_eq!(number_segments_for_tessellation(PI, -1.0), 1);

    // Never fewer than four segments.
    assert_eq!(number_segments_for_tessellation(0.01, 0.5), 4);

    let coarse = number_segments_for_tessellation(PI, 0.1);
    let fine = number_segments_for_tessellation(PI, 0.001);
    assert!(fine > coarse);

    // A full circle needs more than a half circle.
    assert!(number_segments_for_tessellation(2.0 * PI, 0.01) > number_segments_for_tessellation(PI, 0.01));
}

#[test]
fn triangle_fans() {
    let mut indices = Vec::new();
    add_triangle_fan(4, 8, &mut indices);
    assert_eq!(indices, alloc::vec![4, 5, 6, 4, 6, 7]);

    indices.clear();
    add_triangle_fan(0, 2, &mut indices);
    assert!(indices.is_empty());

    let mut out = [0; 6];
    assert_eq!(write_triangle_fan(1, 5, &mut out), 6);
    assert_eq!(out, [1, 2, 3, 1, 3, 4]);
}
