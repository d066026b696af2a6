//! The bulk finite-element loop: gather, interpolate, run kernels,
//! integrate, scatter.

use std::cell::RefCell;

use nalgebra::{DMatrix, DVector, Vector3};
use rayon::prelude::*;
use thread_local::ThreadLocal;

use crate::assembly::{DofMap, FeMesh, GlobalSystem, MaterialProvider, ShapeTable};
use crate::error::FemError;
use crate::kernels::CalcType;
use crate::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use crate::materials::MaterialsContainer;
use crate::registry::ElmtRegistry;

/// The collaborators and step data one assembly pass runs against.
pub struct AssemblyContext<'a, M, D, S, P> {
    pub mesh: &'a M,
    pub dofs: &'a D,
    pub shapes: &'a S,
    pub materials: &'a P,
    pub t: f64,
    pub dt: f64,
    /// Time-integration coefficients: `ctan[0]` scales non-rate terms,
    /// `ctan[1]` first-order and `ctan[2]` second-order rate terms.
    pub ctan: [f64; 3],
}

/// Global solution history the local gather reads from. All vectors are
/// indexed by global equation number.
pub struct SolutionStates<'a> {
    pub u: &'a DVector<f64>,
    pub u_old: &'a DVector<f64>,
    pub u_older: &'a DVector<f64>,
    pub v: &'a DVector<f64>,
    pub a: &'a DVector<f64>,
}

/// Reusable per-element scratch buffers.
struct Workspace {
    node_coords: Vec<Vector3<f64>>,
    soln: LocalElmtSolution,
    mate: MaterialsContainer,
    mate_old: MaterialsContainer,
    r_block: DVector<f64>,
    k_block: DMatrix<f64>,
}

impl Workspace {
    fn new(dofs_per_node: usize) -> Self {
        Self {
            node_coords: Vec::new(),
            soln: LocalElmtSolution::zeros(dofs_per_node),
            mate: MaterialsContainer::new(),
            mate_old: MaterialsContainer::new(),
            r_block: DVector::zeros(dofs_per_node),
            k_block: DMatrix::zeros(dofs_per_node, dofs_per_node),
        }
    }
}

/// One element's integrated, globally-numbered contributions.
struct ElementContribution {
    rhs: Vec<(usize, f64)>,
    jacobian: Vec<(usize, usize, f64)>,
}

/// Assembles kernel evaluations over all bulk elements into a
/// [`GlobalSystem`].
pub struct BulkAssembler<'a> {
    registry: &'a ElmtRegistry,
}

impl<'a> BulkAssembler<'a> {
    pub fn new(registry: &'a ElmtRegistry) -> Self {
        Self { registry }
    }

    /// Runs one full assembly pass. The system's residual and Jacobian
    /// targets are zeroed first; every quadrature-point contribution is
    /// weighted by `det J * w` at scatter. Elements are visited in index
    /// order, so repeated passes over the same state produce bit-identical
    /// results.
    pub fn form_bulk_fe<M, D, S, P>(
        &self,
        calc_type: CalcType,
        ctx: &AssemblyContext<'_, M, D, S, P>,
        states: &SolutionStates<'_>,
        system: &mut GlobalSystem,
    ) -> eyre::Result<()>
    where
        M: FeMesh,
        D: DofMap,
        S: ShapeTable,
        P: MaterialProvider,
    {
        system.zero();
        let mut ws = Workspace::new(ctx.dofs.dofs_per_node());
        for e in 0..ctx.mesh.n_elements() {
            let contrib = self.element_contribution(calc_type, ctx, states, e, &mut ws)?;
            scatter(system, &contrib);
        }
        Ok(())
    }

    /// Residual-only assembly with the element loop parallelized over
    /// rayon's pool. Per-element contributions are collected in element
    /// order and scattered sequentially, so the result is bit-identical
    /// to the serial path.
    pub fn form_residual_par<M, D, S, P>(
        &self,
        ctx: &AssemblyContext<'_, M, D, S, P>,
        states: &SolutionStates<'_>,
        system: &mut GlobalSystem,
    ) -> eyre::Result<()>
    where
        M: FeMesh,
        D: DofMap,
        S: ShapeTable,
        P: MaterialProvider,
    {
        system.zero();
        let workspaces: ThreadLocal<RefCell<Workspace>> = ThreadLocal::new();
        let contributions = (0..ctx.mesh.n_elements())
            .into_par_iter()
            .map(|e| {
                let ws = workspaces.get_or(|| RefCell::new(Workspace::new(ctx.dofs.dofs_per_node())));
                self.element_contribution(CalcType::Residual, ctx, states, e, &mut ws.borrow_mut())
            })
            .collect::<Result<Vec<_>, FemError>>()?;
        for contrib in &contributions {
            scatter(system, contrib);
        }
        Ok(())
    }

    fn element_contribution<M, D, S, P>(
        &self,
        calc_type: CalcType,
        ctx: &AssemblyContext<'_, M, D, S, P>,
        states: &SolutionStates<'_>,
        e: usize,
        ws: &mut Workspace,
    ) -> Result<ElementContribution, FemError>
    where
        M: FeMesh,
        D: DofMap,
        S: ShapeTable,
        P: MaterialProvider,
    {
        let domain = ctx.mesh.domain(e);
        let block = self.registry.block_for_domain(domain).ok_or_else(|| {
            FemError::Configuration(format!("no element block bound to domain '{domain}'"))
        })?;
        let nodes = ctx.mesh.element_nodes(e);
        let ndpn = ctx.dofs.dofs_per_node();

        ws.node_coords.clear();
        ws.node_coords
            .extend(nodes.iter().map(|&n| ctx.mesh.node_coords(n)));
        let qps = ctx.shapes.evaluate(&ws.node_coords)?;

        let mut contrib = ElementContribution {
            rhs: Vec::new(),
            jacobian: Vec::new(),
        };

        for (qp_id, qp) in qps.iter().enumerate() {
            let info = LocalElmtInfo {
                dim: ctx.mesh.dim(),
                n_nodes: nodes.len(),
                dofs_per_node: ndpn,
                n_dofs: nodes.len() * ndpn,
                t: ctx.t,
                dt: ctx.dt,
                coords: qp.coords,
                coords_current: qp.coords,
                elmt_id: e,
                qp_id,
            };

            ws.soln.reset();
            for j in 0..ndpn {
                for (i, &node) in nodes.iter().enumerate() {
                    let g = ctx.dofs.global_dof(node, j);
                    ws.soln.u[j] += qp.shape[i] * states.u[g];
                    ws.soln.u_old[j] += qp.shape[i] * states.u_old[g];
                    ws.soln.u_older[j] += qp.shape[i] * states.u_older[g];
                    ws.soln.v[j] += qp.shape[i] * states.v[g];
                    ws.soln.a[j] += qp.shape[i] * states.a[g];
                    ws.soln.grad_u[j] += qp.grad[i] * states.u[g];
                    ws.soln.grad_u_old[j] += qp.grad[i] * states.u_old[g];
                    ws.soln.grad_v[j] += qp.grad[i] * states.v[g];
                }
                // Lagrangian kernels: current-configuration gradients
                // coincide with the reference ones.
                ws.soln.grad_u_current[j] = ws.soln.grad_u[j];
            }

            ws.mate_old.clear();
            ctx.materials.old_state(&info, &mut ws.mate_old)?;
            ws.mate.clear();
            ctx.materials
                .compute(&info, &ws.soln, &ws.mate_old, &mut ws.mate)?;

            let jxw = qp.jxw();
            if calc_type.wants_residual() {
                for (i, &node_i) in nodes.iter().enumerate() {
                    let shp = shape_pair(qp, i, i);
                    ws.r_block.fill(0.0);
                    self.registry.run_kernels(
                        block.elmt_type,
                        CalcType::Residual,
                        &info,
                        &ctx.ctan,
                        &ws.soln,
                        &shp,
                        &ws.mate_old,
                        &ws.mate,
                        &mut ws.k_block,
                        &mut ws.r_block,
                    )?;
                    for p in 0..ndpn {
                        contrib
                            .rhs
                            .push((ctx.dofs.global_dof(node_i, p), ws.r_block[p] * jxw));
                    }
                }
            }
            if calc_type.wants_jacobian() {
                for (i, &node_i) in nodes.iter().enumerate() {
                    for (j, &node_j) in nodes.iter().enumerate() {
                        let shp = shape_pair(qp, i, j);
                        ws.k_block.fill(0.0);
                        self.registry.run_kernels(
                            block.elmt_type,
                            CalcType::Jacobian,
                            &info,
                            &ctx.ctan,
                            &ws.soln,
                            &shp,
                            &ws.mate_old,
                            &ws.mate,
                            &mut ws.k_block,
                            &mut ws.r_block,
                        )?;
                        for p in 0..ndpn {
                            for q in 0..ndpn {
                                contrib.jacobian.push((
                                    ctx.dofs.global_dof(node_i, p),
                                    ctx.dofs.global_dof(node_j, q),
                                    ws.k_block[(p, q)] * jxw,
                                ));
                            }
                        }
                    }
                }
            }
        }
        Ok(contrib)
    }
}

fn shape_pair(qp: &crate::assembly::QuadraturePoint, test: usize, trial: usize) -> LocalShapeFun {
    LocalShapeFun {
        test: qp.shape[test],
        trial: qp.shape[trial],
        grad_test: qp.grad[test],
        grad_trial: qp.grad[trial],
        grad_test_current: qp.grad[test],
        grad_trial_current: qp.grad[trial],
    }
}

fn scatter(system: &mut GlobalSystem, contrib: &ElementContribution) {
    for &(i, v) in &contrib.rhs {
        system.add_rhs(i, v);
    }
    for &(i, j, v) in &contrib.jacobian {
        system.add_jacobian(i, j, v);
    }
}
