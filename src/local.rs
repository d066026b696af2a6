//! Per-quadrature-point data contracts shared by every element kernel.
//!
//! These are value-semantics snapshots for exactly one
//! (element, quadrature point, test/trial-function) combination. The
//! assembler rebuilds them for every kernel invocation; kernels never
//! retain them beyond one call.

use nalgebra::Vector3;

/// Descriptor of the element and quadrature point a kernel is evaluated at.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalElmtInfo {
    /// Spatial dimension of the element (1, 2 or 3).
    pub dim: usize,
    /// Number of nodes of the element.
    pub n_nodes: usize,
    /// Degrees of freedom per node for the active kernel.
    pub dofs_per_node: usize,
    /// Total dofs of the element (`n_nodes * dofs_per_node`).
    pub n_dofs: usize,
    /// Current time.
    pub t: f64,
    /// Current time step size.
    pub dt: f64,
    /// Quadrature point coordinates in the reference configuration.
    pub coords: Vector3<f64>,
    /// Quadrature point coordinates in the current configuration.
    pub coords_current: Vector3<f64>,
    /// Id of the element being assembled.
    pub elmt_id: usize,
    /// Index of the quadrature point within the element.
    pub qp_id: usize,
}

/// Field values and gradients interpolated at one quadrature point, indexed
/// by the kernel's local dof ordering (see
/// [`DofRole`](crate::kernels::DofRole)).
///
/// Gradients are always 3-D; 2-D problems leave the third component zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalElmtSolution {
    /// Current solution values.
    pub u: Vec<f64>,
    /// Solution values at the previous step.
    pub u_old: Vec<f64>,
    /// Solution values two steps back.
    pub u_older: Vec<f64>,
    /// First time derivatives (velocities).
    pub v: Vec<f64>,
    /// Second time derivatives (accelerations).
    pub a: Vec<f64>,
    /// Gradients of the current solution, reference configuration.
    pub grad_u: Vec<Vector3<f64>>,
    /// Gradients of the previous-step solution, reference configuration.
    pub grad_u_old: Vec<Vector3<f64>>,
    /// Gradients of the velocities, reference configuration.
    pub grad_v: Vec<Vector3<f64>>,
    /// Gradients of the current solution, current configuration.
    pub grad_u_current: Vec<Vector3<f64>>,
}

impl LocalElmtSolution {
    /// An all-zero solution bundle for `dofs_per_node` fields.
    pub fn zeros(dofs_per_node: usize) -> Self {
        LocalElmtSolution {
            u: vec![0.0; dofs_per_node],
            u_old: vec![0.0; dofs_per_node],
            u_older: vec![0.0; dofs_per_node],
            v: vec![0.0; dofs_per_node],
            a: vec![0.0; dofs_per_node],
            grad_u: vec![Vector3::zeros(); dofs_per_node],
            grad_u_old: vec![Vector3::zeros(); dofs_per_node],
            grad_v: vec![Vector3::zeros(); dofs_per_node],
            grad_u_current: vec![Vector3::zeros(); dofs_per_node],
        }
    }

    pub(crate) fn reset(&mut self) {
        self.u.fill(0.0);
        self.u_old.fill(0.0);
        self.u_older.fill(0.0);
        self.v.fill(0.0);
        self.a.fill(0.0);
        self.grad_u.fill(Vector3::zeros());
        self.grad_u_old.fill(Vector3::zeros());
        self.grad_v.fill(Vector3::zeros());
        self.grad_u_current.fill(Vector3::zeros());
    }
}

/// Test and trial shape function data for one quadrature point and one
/// (test node, trial node) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalShapeFun {
    /// Test function value.
    pub test: f64,
    /// Trial function value.
    pub trial: f64,
    /// Test function gradient, reference configuration.
    pub grad_test: Vector3<f64>,
    /// Trial function gradient, reference configuration.
    pub grad_trial: Vector3<f64>,
    /// Test function gradient, current configuration.
    pub grad_test_current: Vector3<f64>,
    /// Trial function gradient, current configuration.
    pub grad_trial_current: Vector3<f64>,
}

impl Default for LocalShapeFun {
    fn default() -> Self {
        LocalShapeFun {
            test: 0.0,
            trial: 0.0,
            grad_test: Vector3::zeros(),
            grad_trial: Vector3::zeros(),
            grad_test_current: Vector3::zeros(),
            grad_trial_current: Vector3::zeros(),
        }
    }
}
