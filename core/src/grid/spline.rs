//! One-dimensional interpolation operators.
//!
//! A plane is resampled as `Wz · P · Wxᵀ`, where `P` is the pivoted dose
//! matrix and `Wz`, `Wx` are the weight matrices built here. Because
//! spline interpolation on fixed nodes is linear in the sampled values, the
//! tensor product of the two 1D operators is exactly the bivariate
//! interpolating spline over the rectangular grid.

use crate::types::Interpolation;
use ndarray::Array2;

/// Points of `[start, stop)` spaced by `step`
///
/// The point count is `ceil((stop - start) / step)` evaluated in floating
/// point, so the exclusive upper bound behaves exactly like `arange`,
/// including the occasional extra point when the division rounds up.
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    let len = ((stop - start) / step).ceil();
    if !(len > 0.0) {
        return Vec::new();
    }
    (0..len as usize).map(|i| start + i as f64 * step).collect()
}

/// Weight matrix of shape `(targets.len(), nodes.len())`
///
/// Row `i` holds the coefficients that, dotted with the values sampled at
/// `nodes`, give the interpolant at `targets[i]`. `nodes` must be strictly
/// increasing with at least two entries. Returns `None` when the spline
/// system is singular.
pub fn interpolation_weights(
    nodes: &[f64],
    targets: &[f64],
    kind: Interpolation,
) -> Option<Array2<f64>> {
    let n = nodes.len();
    if n < 2 {
        return None;
    }

    let curvature = match kind {
        Interpolation::Cubic => Some(curvature_operator(nodes)?),
        Interpolation::Linear => None,
    };

    let mut weights = Array2::<f64>::zeros((targets.len(), n));
    for (i, &t) in targets.iter().enumerate() {
        let j = interval_index(nodes, t);
        let h = nodes[j + 1] - nodes[j];
        let a = (nodes[j + 1] - t) / h;
        let b = (t - nodes[j]) / h;

        let mut row = weights.row_mut(i);
        row[j] += a;
        row[j + 1] += b;

        if let Some(c) = &curvature {
            let ca = (a * a * a - a) * h * h / 6.0;
            let cb = (b * b * b - b) * h * h / 6.0;
            row.scaled_add(ca, &c.row(j));
            row.scaled_add(cb, &c.row(j + 1));
        }
    }

    Some(weights)
}

/// Index `j` of the node interval `[nodes[j], nodes[j + 1]]` used for `t`
///
/// Points outside the node range use the first or last interval.
fn interval_index(nodes: &[f64], t: f64) -> usize {
    let upper = nodes.partition_point(|&x| x <= t);
    upper.saturating_sub(1).min(nodes.len() - 2)
}

/// Matrix `C` mapping sampled values to the spline's second derivatives
///
/// Solves `A · C = B` where `A · M = B · y` is the not-a-knot cubic
/// spline system. With two nodes the spline is the line through them
/// (zero curvature); with three, the two not-a-knot conditions collapse
/// into a constant second derivative, giving the interpolating parabola.
fn curvature_operator(nodes: &[f64]) -> Option<Array2<f64>> {
    let n = nodes.len();
    if n == 2 {
        return Some(Array2::zeros((2, 2)));
    }

    let h: Vec<f64> = nodes.windows(2).map(|w| w[1] - w[0]).collect();
    let mut a = Array2::<f64>::zeros((n, n));
    let mut b = Array2::<f64>::zeros((n, n));

    for i in 1..n - 1 {
        a[[i, i - 1]] = h[i - 1];
        a[[i, i]] = 2.0 * (h[i - 1] + h[i]);
        a[[i, i + 1]] = h[i];
        b[[i, i - 1]] = 6.0 / h[i - 1];
        b[[i, i]] = -6.0 / h[i - 1] - 6.0 / h[i];
        b[[i, i + 1]] = 6.0 / h[i];
    }

    if n == 3 {
        a[[0, 0]] = 1.0;
        a[[0, 1]] = -1.0;
        a[[2, 1]] = 1.0;
        a[[2, 2]] = -1.0;
    } else {
        // Continuous third derivative across the second and penultimate nodes
        a[[0, 0]] = h[1];
        a[[0, 1]] = -(h[0] + h[1]);
        a[[0, 2]] = h[0];
        a[[n - 1, n - 3]] = h[n - 2];
        a[[n - 1, n - 2]] = -(h[n - 3] + h[n - 2]);
        a[[n - 1, n - 1]] = h[n - 3];
    }

    solve(a, b)
}

/// Gaussian elimination with partial pivoting, solving `A · X = B`
fn solve(mut a: Array2<f64>, mut b: Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let scale = a.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let tolerance = scale * f64::EPSILON * n as f64;

    for col in 0..n {
        let pivot = (col..n).max_by(|&p, &q| a[[p, col]].abs().total_cmp(&a[[q, col]].abs()))?;
        if a[[pivot, col]].abs() <= tolerance {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([pivot, k], [col, k]);
                b.swap([pivot, k], [col, k]);
            }
        }

        for r in col + 1..n {
            let factor = a[[r, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[r, k]] -= factor * a[[col, k]];
            }
            for k in 0..n {
                b[[r, k]] -= factor * b[[col, k]];
            }
        }
    }

    for col in (0..n).rev() {
        for k in 0..n {
            let mut acc = b[[col, k]];
            for j in col + 1..n {
                acc -= a[[col, j]] * b[[j, k]];
            }
            b[[col, k]] = acc / a[[col, col]];
        }
    }

    Some(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use rstest::rstest;

    fn interpolate(nodes: &[f64], values: &[f64], targets: &[f64], kind: Interpolation) -> Vec<f64> {
        let w = interpolation_weights(nodes, targets, kind).unwrap();
        w.dot(&Array1::from(values.to_vec())).to_vec()
    }

    #[test]
    fn test_arange_excludes_stop() {
        assert_eq!(arange(0.0, 2.0, 1.0), vec![0.0, 1.0]);
        assert_eq!(arange(0.0, 1.0, 0.25), vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_arange_partial_last_cell() {
        // 1.0 / 0.3 = 3.33.. so four points, the last one below stop
        let points = arange(0.0, 1.0, 0.3);
        assert_eq!(points.len(), 4);
        assert!(points[3] < 1.0);
    }

    #[test]
    fn test_arange_empty_range() {
        assert!(arange(1.0, 1.0, 0.1).is_empty());
        assert!(arange(2.0, 1.0, 0.1).is_empty());
    }

    #[rstest]
    #[case(Interpolation::Cubic, 2)]
    #[case(Interpolation::Cubic, 3)]
    #[case(Interpolation::Cubic, 6)]
    #[case(Interpolation::Linear, 5)]
    fn test_passes_through_nodes(#[case] kind: Interpolation, #[case] n: usize) {
        let nodes: Vec<f64> = (0..n).map(|i| i as f64 * 0.7 - 1.0).collect();
        let values: Vec<f64> = nodes.iter().map(|x| (x * 1.3).sin() + 2.0).collect();

        let result = interpolate(&nodes, &values, &nodes, kind);
        for (got, want) in result.iter().zip(&values) {
            assert!((got - want).abs() < 1e-12, "{} != {}", got, want);
        }
    }

    #[test]
    fn test_cubic_reproduces_cubic_polynomial() {
        let f = |x: f64| 0.5 * x * x * x - x * x + 2.0 * x - 1.0;
        let nodes = [0.0, 0.5, 1.5, 2.0, 3.0, 4.5];
        let values: Vec<f64> = nodes.iter().map(|&x| f(x)).collect();
        let targets = arange(0.0, 4.5, 0.1);

        let result = interpolate(&nodes, &values, &targets, Interpolation::Cubic);
        for (t, got) in targets.iter().zip(&result) {
            assert!((got - f(*t)).abs() < 1e-9, "at {}: {} != {}", t, got, f(*t));
        }
    }

    #[test]
    fn test_three_nodes_give_parabola() {
        let f = |x: f64| 3.0 * x * x - 2.0 * x + 1.0;
        let nodes = [0.0, 1.0, 3.0];
        let values: Vec<f64> = nodes.iter().map(|&x| f(x)).collect();

        let result = interpolate(&nodes, &values, &[0.5, 2.0, 2.9], Interpolation::Cubic);
        assert!((result[0] - f(0.5)).abs() < 1e-12);
        assert!((result[1] - f(2.0)).abs() < 1e-12);
        assert!((result[2] - f(2.9)).abs() < 1e-12);
    }

    #[test]
    fn test_linear_midpoint() {
        let result = interpolate(&[0.0, 2.0], &[1.0, 3.0], &[1.0], Interpolation::Linear);
        assert!((result[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_node_rejected() {
        assert!(interpolation_weights(&[1.0], &[1.0], Interpolation::Cubic).is_none());
    }
}
