use nalgebra::{DMatrix, DVector};

/// Solves the square linear system `a x = b` using an LU decomposition with partial pivoting.
///
/// The system is rejected as singular if the smallest pivot of the decomposition is not larger
/// than `threshold` times the largest pivot.
pub fn solve_linear_system(
    a: DMatrix<f64>,
    b: &DVector<f64>,
    threshold: f64,
) -> Result<DVector<f64>, LinearSolverError> {
    let (rows, cols) = a.shape();
    if rows != cols {
        return Err(LinearSolverError::NotSquare { rows, cols });
    }
    if b.len() != rows {
        return Err(LinearSolverError::DimensionMismatch {
            rows,
            rhs: b.len(),
        });
    }
    if rows == 0 {
        return Ok(DVector::zeros(0));
    }

    let lu = a.lu();

    let u = lu.u();
    let mut max_pivot: f64 = 0.;
    let mut min_pivot = (0, f64::INFINITY);
    for i in 0..rows {
        let p = u[(i, i)].abs();
        max_pivot = max_pivot.max(p);
        if p < min_pivot.1 {
            min_pivot = (i, p);
        }
    }

    let (index, pivot) = min_pivot;
    if !(max_pivot > 0.) || !(pivot > threshold * max_pivot) {
        return Err(LinearSolverError::Singular {
            index,
            pivot_ratio: if max_pivot > 0. { pivot / max_pivot } else { 0. },
        });
    }

    let x = lu.solve(b).ok_or(LinearSolverError::Singular {
        index,
        pivot_ratio: 0.,
    })?;

    if x.iter().any(|v| !v.is_finite()) {
        return Err(LinearSolverError::NonFinite);
    }

    Ok(x)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinearSolverError {
    NotSquare { rows: usize, cols: usize },
    DimensionMismatch { rows: usize, rhs: usize },
    Singular { index: usize, pivot_ratio: f64 },
    NonFinite,
}
