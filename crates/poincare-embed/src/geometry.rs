//! Analysis helpers for trained Poincaré embeddings.
//!
//! | Function | Purpose |
//! |---|---|
//! | [`poincare_distance`] | hyperbolic distance between two ball points |
//! | [`to_hyperboloid`] | map a ball point onto the hyperboloid model |
//! | [`minkowski_dot`] | Lorentzian inner product on the hyperboloid |
//! | [`hyperboloid_distance`] | hyperbolic distance between hyperboloid points |
//! | [`pull_back`] | move a point near the boundary back to a given radius |

/// `arccosh(1 + 2‖u−v‖² / ((1−‖u‖²)(1−‖v‖²)))`; infinite if either point
/// is on or outside the unit sphere.
pub fn poincare_distance(u: &[f64], v: &[f64]) -> f64 {
    debug_assert_eq!(u.len(), v.len(), "dimension mismatch in distance");

    let mut diff_sq = 0.0;
    let mut norm_u_sq = 0.0;
    let mut norm_v_sq = 0.0;
    for (&a, &b) in u.iter().zip(v) {
        let d = a - b;
        diff_sq += d * d;
        norm_u_sq += a * a;
        norm_v_sq += b * b;
    }

    if norm_u_sq >= 1.0 || norm_v_sq >= 1.0 {
        return f64::INFINITY;
    }
    let denom = (1.0 - norm_u_sq) * (1.0 - norm_v_sq);
    // clamp: rounding can push the argument just below 1
    (1.0 + 2.0 * diff_sq / denom).max(1.0).acosh()
}

/// `(2x / (1−‖x‖²), (1+‖x‖²) / (1−‖x‖²))`, time-like coordinate last.
pub fn to_hyperboloid(x: &[f64]) -> Vec<f64> {
    let norm_sq: f64 = x.iter().map(|c| c * c).sum();
    let denom = 1.0 - norm_sq;
    let mut out: Vec<f64> = x.iter().map(|&c| 2.0 * c / denom).collect();
    out.push((1.0 + norm_sq) / denom);
    out
}

/// `Σᵢ aᵢbᵢ − a_d b_d` where `d` is the last (time-like) coordinate.
pub fn minkowski_dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "dimension mismatch in minkowski_dot");
    let Some(rank) = a.len().checked_sub(1) else {
        return 0.0;
    };
    let spatial: f64 = a[..rank].iter().zip(&b[..rank]).map(|(x, y)| x * y).sum();
    spatial - a[rank] * b[rank]
}

pub fn hyperboloid_distance(a: &[f64], b: &[f64]) -> f64 {
    (-minkowski_dot(a, b)).max(1.0).acosh()
}

/// Rescale `point` onto radius `boundary` if its norm exceeds it.
/// Returns `true` if the point was moved.
pub fn pull_back(point: &mut [f64], boundary: f64) -> bool {
    let norm = point.iter().map(|c| c * c).sum::<f64>().sqrt();
    if norm > boundary {
        let scale = boundary / norm;
        point.iter_mut().for_each(|c| *c *= scale);
        true
    } else {
        false
    }
}
