//! Boundary condition application.
//!
//! Essential (Dirichlet) conditions are enforced by the penalty method
//! against the assembled system; natural conditions (Neumann flux,
//! pressure, traction) integrate surface loads over boundary elements
//! into the residual. Load boundary conditions contribute nothing to the
//! Jacobian: every supported load is solution-independent, so its exact
//! linearization is zero.

mod essential;
mod natural;

pub use essential::{apply_initial_dirichlet, apply_penalty_dirichlet, suggested_penalty};
pub use natural::natural_traction;

use nalgebra::{DVector, Vector3};
use serde::Deserialize;

use crate::assembly::{DofMap, GlobalSystem, ShapeTable};
use crate::error::FemError;
use crate::kernels::CalcType;

/// The boundary condition families.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum BcKind {
    /// Essential condition `u = value`, penalty-enforced.
    Dirichlet { value: f64 },
    /// Prescribed outward flux on a scalar dof.
    Neumann { flux: f64 },
    /// Pressure load: traction `p * n` on the displacement dofs.
    Pressure { pressure: f64 },
    /// Explicit traction vector on the displacement dofs.
    Traction { traction: [f64; 3] },
}

/// One `[bcs]` configuration block: a condition bound to a boundary
/// (side or node set) and the local dof slots it acts on.
#[derive(Debug, Clone, Deserialize)]
pub struct BcBlock {
    pub name: String,
    #[serde(flatten)]
    pub kind: BcKind,
    /// Local dof slots this condition acts on, in kernel dof order.
    pub dofs: Vec<usize>,
    /// For pressure/traction loads: the traction component applied to
    /// each entry of `dofs`. Empty means positional (`dofs[i]` receives
    /// component `i`), which matches a full binding in component order; a
    /// block binding a subset of the displacement slots must name its
    /// components here.
    #[serde(default)]
    pub components: Vec<usize>,
    /// Boundary (side set / node set) name.
    pub boundary: String,
}

impl BcBlock {
    /// The traction component bound to `dofs[pos]`.
    fn component(&self, pos: usize) -> usize {
        self.components.get(pos).copied().unwrap_or(pos)
    }
}

/// Boundary geometry for surface integration and node-set lookup.
pub trait BoundaryMesh: Sync {
    fn n_elements(&self) -> usize;
    fn element_nodes(&self, e: usize) -> &[usize];
    fn node_coords(&self, node: usize) -> Vector3<f64>;
    /// Outward unit normal of a boundary element.
    fn normal(&self, e: usize) -> Vector3<f64>;
    /// The side-set name a boundary element belongs to.
    fn boundary(&self, e: usize) -> &str;
    /// All nodes of a named boundary, for essential conditions.
    fn node_set(&self, boundary: &str) -> &[usize];
}

/// Applies the registered boundary condition blocks.
pub struct BcEngine {
    blocks: Vec<BcBlock>,
}

impl BcEngine {
    pub fn new(blocks: Vec<BcBlock>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[BcBlock] {
        &self.blocks
    }

    /// Checks every block's dof slots against the dof layout: slots must
    /// be in range, the slot count must match what the condition produces
    /// (one for Neumann, up to three for pressure/traction), and an
    /// explicit component list must name one in-range traction component
    /// per bound slot.
    pub fn validate(&self, dofs_per_node: usize) -> Result<(), FemError> {
        for block in &self.blocks {
            for &slot in &block.dofs {
                if slot >= dofs_per_node {
                    return Err(FemError::InvalidComponent {
                        component: slot,
                        max: dofs_per_node,
                    });
                }
            }
            let max_slots = match block.kind {
                BcKind::Dirichlet { .. } => dofs_per_node,
                BcKind::Neumann { .. } => 1,
                BcKind::Pressure { .. } | BcKind::Traction { .. } => 3,
            };
            if block.dofs.is_empty() || block.dofs.len() > max_slots {
                return Err(FemError::Configuration(format!(
                    "boundary condition '{}' binds {} dof slots, expected 1..={max_slots}",
                    block.name,
                    block.dofs.len()
                )));
            }
            if !block.components.is_empty() {
                if matches!(block.kind, BcKind::Dirichlet { .. }) {
                    return Err(FemError::Configuration(format!(
                        "boundary condition '{}' is essential and takes no \
                         traction components",
                        block.name
                    )));
                }
                if block.components.len() != block.dofs.len() {
                    return Err(FemError::Configuration(format!(
                        "boundary condition '{}' names {} components for {} dof slots",
                        block.name,
                        block.components.len(),
                        block.dofs.len()
                    )));
                }
            }
            let n_components = match block.kind {
                BcKind::Neumann { .. } => 1,
                _ => 3,
            };
            for &component in &block.components {
                if component >= n_components {
                    return Err(FemError::InvalidComponent {
                        component,
                        max: n_components,
                    });
                }
            }
        }
        Ok(())
    }

    /// Writes every Dirichlet value into the solution vector without
    /// touching the system. Run once before the first nonlinear
    /// iteration so the initial guess already satisfies the essential
    /// conditions.
    pub fn apply_initial(
        &self,
        mesh: &impl BoundaryMesh,
        dof_map: &impl DofMap,
        u: &mut DVector<f64>,
    ) -> Result<(), FemError> {
        for block in &self.blocks {
            if let BcKind::Dirichlet { value } = block.kind {
                let nodes = mesh.node_set(&block.boundary);
                apply_initial_dirichlet(nodes, &block.dofs, value, dof_map, u)?;
            }
        }
        Ok(())
    }

    /// Enforces every Dirichlet block on the assembled system with the
    /// given penalty. Call after bulk assembly; take the penalty from
    /// [`suggested_penalty`] of the system's max Jacobian entry.
    pub fn apply_essential(
        &self,
        calc_type: CalcType,
        mesh: &impl BoundaryMesh,
        dof_map: &impl DofMap,
        penalty: f64,
        u: &mut DVector<f64>,
        system: &mut GlobalSystem,
    ) -> Result<(), FemError> {
        for block in &self.blocks {
            if let BcKind::Dirichlet { value } = block.kind {
                let nodes = mesh.node_set(&block.boundary);
                apply_penalty_dirichlet(
                    calc_type, nodes, &block.dofs, value, penalty, dof_map, u, system,
                )?;
            }
        }
        Ok(())
    }

    /// Integrates every load block (Neumann, pressure, traction) over its
    /// boundary elements into the system residual. External loads enter
    /// the residual with negative sign.
    pub fn apply_natural(
        &self,
        calc_type: CalcType,
        mesh: &impl BoundaryMesh,
        dof_map: &impl DofMap,
        shapes: &impl ShapeTable,
        system: &mut GlobalSystem,
    ) -> eyre::Result<()> {
        if !calc_type.wants_residual() {
            return Ok(());
        }
        let mut coords = Vec::new();
        for e in 0..mesh.n_elements() {
            let boundary = mesh.boundary(e);
            for block in self.blocks.iter().filter(|b| b.boundary == boundary) {
                if matches!(block.kind, BcKind::Dirichlet { .. }) {
                    continue;
                }
                let nodes = mesh.element_nodes(e);
                coords.clear();
                coords.extend(nodes.iter().map(|&n| mesh.node_coords(n)));
                let qps = shapes.evaluate(&coords)?;
                let normal = mesh.normal(e);
                for qp in &qps {
                    let jxw = qp.jxw();
                    for (i, &node) in nodes.iter().enumerate() {
                        let local = natural_traction(&block.kind, &normal, qp.shape[i])?;
                        for (pos, &dof) in block.dofs.iter().enumerate() {
                            let component = block.component(pos);
                            let val = *local.get(component).ok_or(
                                FemError::InvalidComponent {
                                    component,
                                    max: local.len(),
                                },
                            )?;
                            let g = dof_map.global_dof(node, dof);
                            system.add_rhs(g, -val * jxw);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
