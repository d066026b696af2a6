//! The assembled global system: right-hand side, Jacobian triplets and
//! the running max-magnitude Jacobian entry.

use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// The global residual vector and Jacobian under assembly.
///
/// The Jacobian accumulates as COO triplets (duplicates sum on CSR
/// conversion) so scatter order never affects the result. The largest
/// Jacobian magnitude seen since the last [`zero`](Self::zero) is tracked
/// for penalty scaling of essential boundary conditions.
pub struct GlobalSystem {
    rhs: DVector<f64>,
    jacobian: CooMatrix<f64>,
    max_abs_k: f64,
}

impl GlobalSystem {
    pub fn new(n_dofs: usize) -> Self {
        Self {
            rhs: DVector::zeros(n_dofs),
            jacobian: CooMatrix::new(n_dofs, n_dofs),
            max_abs_k: 0.0,
        }
    }

    pub fn n_dofs(&self) -> usize {
        self.rhs.len()
    }

    /// Resets rhs, Jacobian triplets and the max-entry tracker.
    pub fn zero(&mut self) {
        let n = self.n_dofs();
        self.rhs.fill(0.0);
        self.jacobian = CooMatrix::new(n, n);
        self.max_abs_k = 0.0;
    }

    pub fn add_rhs(&mut self, i: usize, value: f64) {
        self.rhs[i] += value;
    }

    pub fn add_jacobian(&mut self, i: usize, j: usize, value: f64) {
        if value.abs() > self.max_abs_k {
            self.max_abs_k = value.abs();
        }
        self.jacobian.push(i, j, value);
    }

    pub fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }

    pub fn rhs_mut(&mut self) -> &mut DVector<f64> {
        &mut self.rhs
    }

    /// Largest `|K_ij|` scattered since the last reset.
    pub fn max_abs_k(&self) -> f64 {
        self.max_abs_k
    }

    pub fn jacobian_nnz(&self) -> usize {
        self.jacobian.nnz()
    }

    /// Finalizes the Jacobian, summing duplicate triplets.
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        CsrMatrix::from(&self.jacobian)
    }
}
