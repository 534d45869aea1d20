//! Robust orientation predicates.
//!
//! Both predicates first evaluate the determinant in plain floating point
//! and accept the result when it clears a forward error bound. Otherwise
//! the determinant is re-evaluated exactly with floating-point expansion
//! arithmetic, so the returned sign is always the sign of the true
//! determinant of the input coordinates.

use crate::{Point2, Point3};

/// Sign of an orientation determinant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    /// Determinant is negative.
    Negative,
    /// Determinant is exactly zero.
    Zero,
    /// Determinant is positive.
    Positive,
}

impl Sign {
    /// Sign of a floating-point value.
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            Sign::Positive
        } else if value < 0.0 {
            Sign::Negative
        } else {
            Sign::Zero
        }
    }

    /// Returns true if negative.
    pub fn is_negative(self) -> bool {
        self == Sign::Negative
    }

    /// Returns true if positive.
    pub fn is_positive(self) -> bool {
        self == Sign::Positive
    }

    /// Returns true if zero.
    pub fn is_zero(self) -> bool {
        self == Sign::Zero
    }

    /// Flip the sign.
    pub fn negate(self) -> Self {
        match self {
            Sign::Negative => Sign::Positive,
            Sign::Zero => Sign::Zero,
            Sign::Positive => Sign::Negative,
        }
    }
}

const EPSILON: f64 = f64::EPSILON * 0.5;
const O2D_ERRBOUND_A: f64 = (3.0 + 16.0 * EPSILON) * EPSILON;
const O3D_ERRBOUND_A: f64 = (7.0 + 56.0 * EPSILON) * EPSILON;

/// Orientation of three points in the plane.
///
/// Positive when `a`, `b`, `c` wind counterclockwise, negative when
/// clockwise, zero when collinear.
pub fn orient2d(a: &Point2, b: &Point2, c: &Point2) -> Sign {
    let detleft = (a.x - c.x) * (b.y - c.y);
    let detright = (a.y - c.y) * (b.x - c.x);
    let det = detleft - detright;

    let errbound = O2D_ERRBOUND_A * (detleft.abs() + detright.abs());
    if det > errbound || -det > errbound {
        return Sign::of(det);
    }
    orient2d_exact(a, b, c)
}

/// Orientation of `d` relative to the plane through `a`, `b`, `c`.
///
/// Evaluates the sign of `det[a - d; b - d; c - d]`. The result is
/// negative when `d` lies on the side the right-handed normal of
/// `(a, b, c)` points to, positive on the other side, and zero when the
/// four points are coplanar.
pub fn orient3d(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> Sign {
    let adx = a.x - d.x;
    let ady = a.y - d.y;
    let adz = a.z - d.z;
    let bdx = b.x - d.x;
    let bdy = b.y - d.y;
    let bdz = b.z - d.z;
    let cdx = c.x - d.x;
    let cdy = c.y - d.y;
    let cdz = c.z - d.z;

    let bdycdz = bdy * cdz;
    let bdzcdy = bdz * cdy;
    let cdyadz = cdy * adz;
    let cdzady = cdz * ady;
    let adybdz = ady * bdz;
    let adzbdy = adz * bdy;

    let det = adx * (bdycdz - bdzcdy) + bdx * (cdyadz - cdzady) + cdx * (adybdz - adzbdy);

    let permanent = (bdycdz.abs() + bdzcdy.abs()) * adx.abs()
        + (cdyadz.abs() + cdzady.abs()) * bdx.abs()
        + (adybdz.abs() + adzbdy.abs()) * cdx.abs();
    let errbound = O3D_ERRBOUND_A * permanent;
    if det > errbound || -det > errbound {
        return Sign::of(det);
    }
    orient3d_exact(a, b, c, d)
}

fn orient2d_exact(a: &Point2, b: &Point2, c: &Point2) -> Sign {
    let acx = two_diff(a.x, c.x);
    let acy = two_diff(a.y, c.y);
    let bcx = two_diff(b.x, c.x);
    let bcy = two_diff(b.y, c.y);

    let left = expansion_product(&acx, &bcy);
    let right = expansion_product(&acy, &bcx);
    expansion_sign(&expansion_sum(&left, &negate(&right)))
}

fn orient3d_exact(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> Sign {
    let adx = two_diff(a.x, d.x);
    let ady = two_diff(a.y, d.y);
    let adz = two_diff(a.z, d.z);
    let bdx = two_diff(b.x, d.x);
    let bdy = two_diff(b.y, d.y);
    let bdz = two_diff(b.z, d.z);
    let cdx = two_diff(c.x, d.x);
    let cdy = two_diff(c.y, d.y);
    let cdz = two_diff(c.z, d.z);

    let minor = |p: &[f64], q: &[f64], r: &[f64], s: &[f64]| {
        expansion_sum(&expansion_product(p, q), &negate(&expansion_product(r, s)))
    };

    let t0 = expansion_product(&adx, &minor(&bdy, &cdz, &bdz, &cdy));
    let t1 = expansion_product(&bdx, &minor(&cdy, &adz, &cdz, &ady));
    let t2 = expansion_product(&cdx, &minor(&ady, &bdz, &adz, &bdy));
    expansion_sign(&expansion_sum(&expansion_sum(&t0, &t1), &t2))
}

// Expansion arithmetic. An expansion is a list of non-overlapping doubles
// in increasing magnitude whose exact sum is the represented value.

fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let x = a + b;
    let bv = x - a;
    let av = x - bv;
    let br = b - bv;
    let ar = a - av;
    (x, ar + br)
}

fn two_product(a: f64, b: f64) -> (f64, f64) {
    let x = a * b;
    (x, a.mul_add(b, -x))
}

fn two_diff(a: f64, b: f64) -> Vec<f64> {
    let x = a - b;
    let bv = a - x;
    let av = x + bv;
    let br = bv - b;
    let ar = a - av;
    let y = ar + br;
    if y == 0.0 {
        vec![x]
    } else {
        vec![y, x]
    }
}

fn grow_expansion(e: &[f64], b: f64) -> Vec<f64> {
    let mut h = Vec::with_capacity(e.len() + 1);
    let mut q = b;
    for &enow in e {
        let (sum, err) = two_sum(q, enow);
        q = sum;
        if err != 0.0 {
            h.push(err);
        }
    }
    if q != 0.0 || h.is_empty() {
        h.push(q);
    }
    h
}

fn expansion_sum(e: &[f64], f: &[f64]) -> Vec<f64> {
    f.iter().fold(e.to_vec(), |acc, &b| grow_expansion(&acc, b))
}

fn scale_expansion(e: &[f64], b: f64) -> Vec<f64> {
    let mut h = vec![0.0];
    for &enow in e {
        let (product, err) = two_product(enow, b);
        h = grow_expansion(&h, err);
        h = grow_expansion(&h, product);
    }
    h
}

fn expansion_product(e: &[f64], f: &[f64]) -> Vec<f64> {
    f.iter()
        .fold(vec![0.0], |acc, &b| expansion_sum(&acc, &scale_expansion(e, b)))
}

fn negate(e: &[f64]) -> Vec<f64> {
    e.iter().map(|v| -v).collect()
}

fn expansion_sign(e: &[f64]) -> Sign {
    e.iter()
        .rev()
        .find(|v| **v != 0.0)
        .map_or(Sign::Zero, |v| Sign::of(*v))
}
