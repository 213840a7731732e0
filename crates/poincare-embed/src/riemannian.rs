//! Riemannian gradient of Poincaré distance and the in-ball update rule.
//!
//! ## Distance gradient
//!
//! For `x, v` in the ball with `α = 1 − ‖x‖²`, `β = 1 − ‖v‖²` and
//! `γ = 1 + 2‖x − v‖² / (αβ)` (so that `d(x, v) = arccosh γ`):
//!
//! ```text
//! ∇ᴱₓ d = 4 / (β √(γ² − 1)) · ( (‖v‖² − 2⟨x,v⟩ + 1) / α² · x  −  v / α )
//! ∇ᴿₓ d = (α² / 4) · ∇ᴱₓ d
//! ```
//!
//! The denominator `β √(γ² − 1)` is floored at [`EPS`] so coincident points
//! yield a zero (not NaN) gradient.
//!
//! ## Update
//!
//! The scaled gradient is added to the point; a point that lands on or
//! outside the unit sphere is rescaled onto the shell of radius
//! [`BOUNDARY`]. This is a retraction, not the exact exponential map, and is
//! adequate for small steps.

use crate::vector::{dot, Vector};

pub const EPS: f64 = 1e-5;

/// Squared norms are clipped to this before entering the distance formula,
/// and points leaving the ball are pulled back to this radius.
pub const BOUNDARY: f64 = 1.0 - EPS;

#[inline]
pub fn clip(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// `cosh d(x, v)` from precomputed squared norms and squared distance.
#[inline]
pub fn arccosh_argument(sq_norm_x: f64, sq_norm_v: f64, sq_dist: f64) -> f64 {
    1.0 + 2.0 * sq_dist / ((1.0 - sq_norm_x) * (1.0 - sq_norm_v))
}

/// Write the Riemannian gradient of `d(x, v)` with respect to `x` into `gradient`.
pub fn distance_gradient(
    gradient: &mut Vector,
    x: &Vector,
    v: &Vector,
    sq_norm_x: f64,
    sq_norm_v: f64,
    arccosh_arg: f64,
) {
    let alpha = 1.0 - sq_norm_x;
    let beta = 1.0 - sq_norm_v;
    let a = (sq_norm_v - 2.0 * dot(x, v) + 1.0) / (alpha * alpha);

    gradient.zero();
    gradient.add_scaled(x, a);
    gradient.add_scaled(v, -1.0 / alpha);

    let z = (beta * (arccosh_arg * arccosh_arg - 1.0).sqrt()).max(EPS);
    // Euclidean gradient, then rescale by the inverse metric
    gradient.multiply(4.0 / z);
    gradient.multiply(alpha * alpha / 4.0);
}

/// Move `point` by `tangent` and pull it back inside the ball if needed.
pub fn retract(point: &mut Vector, tangent: &Vector) {
    point.add(tangent);
    let sq_norm = point.squared_norm();
    if sq_norm >= 1.0 {
        point.multiply(BOUNDARY / sq_norm.sqrt());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::poincare_distance;
    use crate::vector::squared_distance;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_point(rng: &mut StdRng, dim: usize, radius: f64) -> Vector {
        let mut v = Vector::random_uniform(dim, 1.0, rng);
        let n = v.squared_norm().sqrt();
        v.multiply(radius * rng.gen::<f64>() / n);
        v
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let mut rng = StdRng::seed_from_u64(17);
        let h = 1e-6;
        for _ in 0..20 {
            let x = random_point(&mut rng, 3, 0.8);
            let v = random_point(&mut rng, 3, 0.8);
            let (nx, nv) = (x.squared_norm(), v.squared_norm());
            let arg = arccosh_argument(nx, nv, squared_distance(&x, &v));

            let mut grad = Vector::new(3);
            distance_gradient(&mut grad, &x, &v, nx, nv, arg);

            let alpha = 1.0 - nx;
            for i in 0..3 {
                let mut xp = x.clone();
                xp[i] += h;
                let mut xm = x.clone();
                xm[i] -= h;
                let numeric = (poincare_distance(xp.as_slice(), v.as_slice())
                    - poincare_distance(xm.as_slice(), v.as_slice()))
                    / (2.0 * h);
                let riemannian = numeric * alpha * alpha / 4.0;
                assert!(
                    (grad[i] - riemannian).abs() < 1e-5,
                    "coordinate {i}: analytic {} vs numeric {riemannian}",
                    grad[i]
                );
            }
        }
    }

    #[test]
    fn coincident_points_have_zero_gradient() {
        let x = Vector::from_vec(vec![0.3, -0.2]);
        let n = x.squared_norm();
        let mut grad = Vector::new(2);
        distance_gradient(&mut grad, &x, &x, n, n, 1.0);
        assert!(grad.as_slice().iter().all(|g| g.abs() < 1e-12 && g.is_finite()));
    }

    #[test]
    fn retract_adds_inside_ball() {
        let mut p = Vector::from_vec(vec![0.1, 0.2]);
        retract(&mut p, &Vector::from_vec(vec![0.05, -0.1]));
        assert!((p[0] - 0.15).abs() < 1e-15);
        assert!((p[1] - 0.1).abs() < 1e-15);
    }

    #[test]
    fn retract_leaves_points_near_the_boundary_alone() {
        // inside the ball but beyond the pull-back radius
        let mut p = Vector::from_vec(vec![0.999_995, 0.0]);
        retract(&mut p, &Vector::from_vec(vec![0.000_001, 0.0]));
        assert!((p[0] - 0.999_996).abs() < 1e-15);
        assert!(p[0] > BOUNDARY);
        assert!(p.squared_norm() < 1.0);
    }

    #[test]
    fn retract_pulls_back_outside_points() {
        let mut p = Vector::from_vec(vec![0.9, 0.0]);
        retract(&mut p, &Vector::from_vec(vec![5.0, 5.0]));
        let norm = p.squared_norm().sqrt();
        assert!(p.squared_norm() < 1.0);
        assert!((norm - BOUNDARY).abs() < 1e-12);
        // direction is preserved
        assert!((p[0] / p[1] - 5.9 / 5.0).abs() < 1e-12);
    }

    #[test]
    fn clip_bounds() {
        assert_eq!(clip(-1.0, 0.0, BOUNDARY), 0.0);
        assert_eq!(clip(2.0, 0.0, BOUNDARY), BOUNDARY);
        assert_eq!(clip(0.5, 0.0, BOUNDARY), 0.5);
    }
}
