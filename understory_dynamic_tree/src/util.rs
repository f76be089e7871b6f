// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle helpers over [`kurbo::Rect`] used by the tree and its callers.
//!
//! All helpers treat `x0`/`y0` as the lower bound and `x1`/`y1` as the upper bound
//! and assume finite, non-inverted boxes.

use kurbo::{Rect, Vec2};

use crate::types::{RayCastInput, RayCastOutput};

/// Perimeter of a box, used as the cost metric when choosing where leaves go.
#[inline]
pub fn perimeter(r: &Rect) -> f64 {
    2.0 * ((r.x1 - r.x0) + (r.y1 - r.y0))
}

/// Smallest box enclosing both inputs.
#[inline]
pub fn union(a: &Rect, b: &Rect) -> Rect {
    Rect {
        x0: a.x0.min(b.x0),
        y0: a.y0.min(b.y0),
        x1: a.x1.max(b.x1),
        y1: a.y1.max(b.y1),
    }
}

/// Whether `outer` fully contains `inner` (boundaries included).
#[inline]
pub fn contains(outer: &Rect, inner: &Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// Inclusive overlap test: boxes that only touch on an edge or corner overlap.
#[inline]
pub fn test_overlap(a: &Rect, b: &Rect) -> bool {
    !(b.x0 > a.x1 || b.y0 > a.y1 || a.x0 > b.x1 || a.y0 > b.y1)
}

/// Expand a box by `margin` on every side.
#[inline]
pub fn fatten(r: &Rect, margin: f64) -> Rect {
    Rect {
        x0: r.x0 - margin,
        y0: r.y0 - margin,
        x1: r.x1 + margin,
        y1: r.y1 + margin,
    }
}

/// Stretch a box along `d`, growing only the sides it moves toward.
#[inline]
pub fn extend_along(r: &Rect, d: Vec2) -> Rect {
    let mut out = *r;
    if d.x < 0.0 {
        out.x0 += d.x;
    } else {
        out.x1 += d.x;
    }
    if d.y < 0.0 {
        out.y0 += d.y;
    } else {
        out.y1 += d.y;
    }
    out
}

/// Translate a box by `-origin`.
#[inline]
pub(crate) fn shift(r: &Rect, origin: Vec2) -> Rect {
    Rect {
        x0: r.x0 - origin.x,
        y0: r.y0 - origin.y,
        x1: r.x1 - origin.x,
        y1: r.y1 - origin.y,
    }
}

/// Bounding box of the segment `p1 .. p1 + max_fraction * (p2 - p1)`.
#[inline]
pub(crate) fn segment_bounds(input: &RayCastInput, max_fraction: f64) -> Rect {
    let t = input.point_at(max_fraction);
    Rect {
        x0: input.p1.x.min(t.x),
        y0: input.p1.y.min(t.y),
        x1: input.p1.x.max(t.x),
        y1: input.p1.y.max(t.y),
    }
}

/// Cast a ray against a single box using the slab method.
///
/// Returns `None` when the ray misses, starts inside the box, or would hit beyond
/// `input.max_fraction`.
pub fn ray_cast_rect(r: &Rect, input: &RayCastInput) -> Option<RayCastOutput> {
    let mut tmin = f64::MIN;
    let mut tmax = f64::MAX;
    let mut normal = Vec2::ZERO;

    let p = [input.p1.x, input.p1.y];
    let d = [input.p2.x - input.p1.x, input.p2.y - input.p1.y];
    let lower = [r.x0, r.y0];
    let upper = [r.x1, r.y1];

    for axis in 0..2 {
        if d[axis].abs() < f64::EPSILON {
            // Parallel to this slab.
            if p[axis] < lower[axis] || upper[axis] < p[axis] {
                return None;
            }
            continue;
        }

        let inv_d = 1.0 / d[axis];
        let mut t1 = (lower[axis] - p[axis]) * inv_d;
        let mut t2 = (upper[axis] - p[axis]) * inv_d;
        let mut s = -1.0;
        if t1 > t2 {
            core::mem::swap(&mut t1, &mut t2);
            s = 1.0;
        }

        if t1 > tmin {
            normal = if axis == 0 {
                Vec2::new(s, 0.0)
            } else {
                Vec2::new(0.0, s)
            };
            tmin = t1;
        }
        tmax = tmax.min(t2);

        if tmin > tmax {
            return None;
        }
    }

    if tmin < 0.0 || input.max_fraction < tmin {
        return None;
    }

    Some(RayCastOutput {
        normal,
        fraction: tmin,
    })
}
