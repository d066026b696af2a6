//! Residual and Jacobian assembly over bulk elements.
//!
//! The assembler is generic over four collaborator traits so that meshing,
//! dof numbering, shape-function evaluation and constitutive updates stay
//! outside this crate's scope: [`FeMesh`] supplies connectivity and
//! geometry, [`DofMap`] the (node, dof) to global-equation numbering,
//! [`ShapeTable`] the per-element quadrature data, and
//! [`MaterialProvider`] the per-quadrature-point material state.

mod bulk;
mod global;

pub use bulk::{AssemblyContext, BulkAssembler, SolutionStates};
pub use global::GlobalSystem;

use crate::error::FemError;
use crate::local::{LocalElmtInfo, LocalElmtSolution};
use crate::materials::MaterialsContainer;
use nalgebra::Vector3;

/// Mesh connectivity and geometry for bulk assembly.
pub trait FeMesh: Sync {
    fn dim(&self) -> usize;
    fn n_nodes(&self) -> usize;
    fn n_elements(&self) -> usize;
    /// Node indices of one element, in the element's local node order.
    fn element_nodes(&self, elmt: usize) -> &[usize];
    fn node_coords(&self, node: usize) -> Vector3<f64>;
    /// The named domain (element set) this element belongs to, used to
    /// look up its element block.
    fn domain(&self, elmt: usize) -> &str;
}

/// The (node, local dof) to global equation numbering.
pub trait DofMap: Sync {
    fn dofs_per_node(&self) -> usize;
    fn n_dofs(&self) -> usize;
    fn global_dof(&self, node: usize, local_dof: usize) -> usize;
}

/// The standard node-major numbering: dof `j` of node `n` is equation
/// `n * dofs_per_node + j`.
#[derive(Debug, Clone)]
pub struct NodeMajorDofMap {
    n_nodes: usize,
    dofs_per_node: usize,
}

impl NodeMajorDofMap {
    pub fn new(n_nodes: usize, dofs_per_node: usize) -> Self {
        Self {
            n_nodes,
            dofs_per_node,
        }
    }
}

impl DofMap for NodeMajorDofMap {
    fn dofs_per_node(&self) -> usize {
        self.dofs_per_node
    }

    fn n_dofs(&self) -> usize {
        self.n_nodes * self.dofs_per_node
    }

    fn global_dof(&self, node: usize, local_dof: usize) -> usize {
        debug_assert!(local_dof < self.dofs_per_node);
        node * self.dofs_per_node + local_dof
    }
}

/// Shape functions, physical gradients and integration data at one
/// quadrature point of one element.
#[derive(Debug, Clone)]
pub struct QuadraturePoint {
    pub weight: f64,
    /// Shape function value per element node.
    pub shape: Vec<f64>,
    /// Physical shape function gradient per element node.
    pub grad: Vec<Vector3<f64>>,
    /// Jacobian determinant of the reference-to-physical map.
    pub detj: f64,
    /// Physical coordinates of the point.
    pub coords: Vector3<f64>,
}

impl QuadraturePoint {
    /// The integration weight `det J * w` this point contributes.
    pub fn jxw(&self) -> f64 {
        self.detj * self.weight
    }
}

/// Per-element quadrature evaluation from the element's node coordinates.
pub trait ShapeTable: Sync {
    fn evaluate(&self, nodes: &[Vector3<f64>]) -> Result<Vec<QuadraturePoint>, FemError>;
}

/// Constitutive update at one quadrature point: fills `mate` from the
/// interpolated local solution. `old_state` recovers converged state from
/// the previous step for history-dependent models; the default is empty.
pub trait MaterialProvider: Sync {
    fn compute(
        &self,
        info: &LocalElmtInfo,
        soln: &LocalElmtSolution,
        mate_old: &MaterialsContainer,
        mate: &mut MaterialsContainer,
    ) -> Result<(), FemError>;

    fn old_state(
        &self,
        info: &LocalElmtInfo,
        mate_old: &mut MaterialsContainer,
    ) -> Result<(), FemError> {
        let _ = (info, mate_old);
        Ok(())
    }
}
