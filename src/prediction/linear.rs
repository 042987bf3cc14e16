//! Dense solvers for the small symmetric systems produced by the normal
//! equations. Matrices here are at most 4x4, so plain loops over `ndarray`
//! indices are all that is needed.

use ndarray::{Array1, Array2};

/// Which path produced the solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveMethod {
    Cholesky,
    NudgedCholesky,
    GaussJordan,
    Ridge,
}

/// Lower-triangular `L` with `A = L Lᵀ`, or `None` if `A` is not positive
/// definite.
fn cholesky_factor(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let dot: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - dot;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[[i, i]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - dot) / l[[j, j]];
            }
        }
    }
    Some(l)
}

/// Forward then backward substitution through `L Lᵀ x = b`.
fn cholesky_substitute(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();

    let mut z = Array1::zeros(n);
    for i in 0..n {
        let dot: f64 = (0..i).map(|j| l[[i, j]] * z[j]).sum();
        z[i] = (b[i] - dot) / l[[i, i]];
    }

    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let dot: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (z[i] - dot) / l[[i, i]];
    }
    x
}

pub fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    if a.nrows() != a.ncols() || a.nrows() != b.len() {
        return None;
    }
    cholesky_factor(a).map(|l| cholesky_substitute(&l, b))
}

/// Gauss-Jordan inverse with partial pivoting.
pub fn gauss_jordan_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = m[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&a, &b| aug[[a, col]].abs().total_cmp(&aug[[b, col]].abs()))
            .unwrap_or(col);
        if pivot_row != col {
            for j in 0..2 * n {
                aug.swap([col, j], [pivot_row, j]);
            }
        }

        let pivot = aug[[col, col]];
        if pivot.abs() < 1e-10 {
            return None;
        }
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[[row, col]];
            if factor != 0.0 {
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    let mut inv = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            inv[[i, j]] = aug[[i, n + j]];
        }
    }
    Some(inv)
}

fn mean_abs_diagonal(a: &Array2<f64>) -> f64 {
    let n = a.nrows().max(1);
    a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64
}

fn with_ridge(a: &Array2<f64>, alpha: f64) -> Array2<f64> {
    let mut out = a.clone();
    for k in 0..out.nrows() {
        out[[k, k]] += alpha;
    }
    out
}

/// Solves `A w = b` for a symmetric positive semi-definite `A`.
///
/// Tries, in order: Cholesky, Cholesky with a tiny diagonal nudge, a
/// Gauss-Jordan inverse, and finally a ridge solve with
/// `alpha = max(1e-6 * trace/n, 1e-8)`. The last step succeeds for any
/// finite PSD input, so the result is always `Some` for such matrices.
pub fn solve_normal_equations(a: &Array2<f64>, b: &Array1<f64>) -> Option<(Array1<f64>, SolveMethod)> {
    if let Some(w) = cholesky_solve(a, b) {
        return Some((w, SolveMethod::Cholesky));
    }

    let nudge = 1e-8 * mean_abs_diagonal(a);
    if nudge > 0.0 {
        if let Some(w) = cholesky_solve(&with_ridge(a, nudge), b) {
            return Some((w, SolveMethod::NudgedCholesky));
        }
    }

    if let Some(inv) = gauss_jordan_inverse(a) {
        let w = inv.dot(b);
        if w.iter().all(|v| v.is_finite()) {
            return Some((w, SolveMethod::GaussJordan));
        }
    }

    let alpha = (1e-6 * mean_abs_diagonal(a)).max(1e-8);
    cholesky_solve(&with_ridge(a, alpha), b).map(|w| (w, SolveMethod::Ridge))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cholesky_matches_known_solution() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let b = array![2.0, 1.0];
        let x = cholesky_solve(&a, &b).unwrap();
        // 4x + 2y = 2, 2x + 3y = 1 -> x = 0.5, y = 0
        assert!((x[0] - 0.5).abs() < 1e-12);
        assert!(x[1].abs() < 1e-12);
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = array![[2.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 4.0]];
        let inv = gauss_jordan_inverse(&m).unwrap();
        let eye = m.dot(&inv);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((eye[[i, j]] - expected).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_singular_matrix_falls_back() {
        // rank 1
        let a = array![[1.0, 1.0], [1.0, 1.0]];
        let b = array![2.0, 2.0];
        let (w, method) = solve_normal_equations(&a, &b).unwrap();
        assert_ne!(method, SolveMethod::Cholesky);
        assert!(w.iter().all(|v| v.is_finite()));
        assert!((w[0] + w[1] - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_matrix_gives_zero_weights() {
        let a = Array2::<f64>::zeros((4, 4));
        let b = Array1::<f64>::zeros(4);
        let (w, method) = solve_normal_equations(&a, &b).unwrap();
        assert_eq!(method, SolveMethod::Ridge);
        assert!(w.iter().all(|v| *v == 0.0));
    }
}
