use crate::game_logic::CURVE_SEGMENTS;
use bevy::prelude::*;
use std::f32::consts::{PI, TAU};

/// Distance from `p` to the segment `a`-`b`.
///
/// Projections falling outside the segment clamp to the nearest endpoint, and a
/// zero-length segment degrades to the plain point distance.
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }

    let t = (p - a).dot(ab) / len_sq;
    let closest = if t < 0.0 {
        a
    } else if t > 1.0 {
        b
    } else {
        a + ab * t
    };
    p.distance(closest)
}

/// Point on the quadratic Bézier at parameter `t`
pub fn point_on_quadratic_curve(start: Vec2, control: Vec2, end: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    start * (u * u) + control * (2.0 * u * t) + end * (t * t)
}

/// Distance from `p` to a quadratic Bézier, approximated by `CURVE_SEGMENTS` chords.
pub fn distance_to_quadratic_curve(p: Vec2, start: Vec2, control: Vec2, end: Vec2) -> f32 {
    curve_chords(start, control, end)
        .map(|(a, b)| distance_to_segment(p, a, b))
        .fold(f32::INFINITY, f32::min)
}

/// Curve length as the sum of the same chords used for distance queries
pub fn quadratic_curve_length(start: Vec2, control: Vec2, end: Vec2) -> f32 {
    curve_chords(start, control, end)
        .map(|(a, b)| a.distance(b))
        .sum()
}

fn curve_chords(start: Vec2, control: Vec2, end: Vec2) -> impl Iterator<Item = (Vec2, Vec2)> {
    (0..CURVE_SEGMENTS).map(move |i| {
        let t1 = i as f32 / CURVE_SEGMENTS as f32;
        let t2 = (i + 1) as f32 / CURVE_SEGMENTS as f32;
        (
            point_on_quadratic_curve(start, control, end, t1),
            point_on_quadratic_curve(start, control, end, t2),
        )
    })
}

/// Even-odd ray cast. The polygon is closed implicitly (last vertex joins the first).
pub fn point_in_polygon(p: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (vi, vj) = (polygon[i], polygon[j]);
        if (vi.y > p.y) != (vj.y > p.y)
            && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Wrap an angle into (-PI, PI]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Heading (clockwise from north, screen y pointing down) that faces `to` from `from`
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.x.atan2(-delta.y)
}
