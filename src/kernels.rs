//! The element kernel library: one module per governing PDE.
//!
//! Every kernel evaluates the weak-form residual of its PDE and the exact
//! analytic linearization of that residual at a single quadrature point,
//! for one (test node, trial node) pair. The governing law of the whole
//! library is
//!
//! $$ K_{pq} = \frac{\partial R_p}{\partial u_q} $$
//!
//! (after `ctan` scaling) for every kernel: Newton's quadratic convergence
//! depends on it, and the finite-difference consistency tests enforce it.
//!
//! Kernels are the variants of the closed [`ElmtKernel`] enum rather than
//! trait objects, so dispatch stays a total match. Each kernel declares its
//! local dof ordering as data ([`DofRole`] lists) instead of implying it
//! through code structure; the assembler checks the configured dof count
//! against the declaration before any evaluation.

mod allen_cahn;
mod allen_cahn_fracture;
mod cahn_hilliard;
mod diffusion;
mod diffusion_fracture;
mod kobayashi;
mod laplace;
mod mechanics;
mod miehe_fracture;
mod poisson;
mod stress_cahn_hilliard;
mod stress_diffusion;
mod thermal;
mod wave;

use crate::error::FemError;
use crate::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use crate::materials::{MaterialSchema, MaterialsContainer};
use nalgebra::{DMatrix, DVector};
use rustc_hash::FxHashMap;

/// What a kernel invocation is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcType {
    Residual,
    Jacobian,
    ResidualAndJacobian,
}

impl CalcType {
    pub fn wants_residual(&self) -> bool {
        matches!(self, CalcType::Residual | CalcType::ResidualAndJacobian)
    }

    pub fn wants_jacobian(&self) -> bool {
        matches!(self, CalcType::Jacobian | CalcType::ResidualAndJacobian)
    }
}

/// The physical meaning of one local dof slot.
///
/// The ordered role list returned by [`ElmtKernel::dof_roles`] *is* the
/// kernel's dof ordering; configuration must register dofs in the same
/// order, and the registry verifies the counts match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DofRole {
    /// Generic scalar potential (Poisson/Laplace).
    Potential,
    Concentration,
    ChemicalPotential,
    Temperature,
    OrderParameter,
    Damage,
    DispX,
    DispY,
    DispZ,
    /// Auxiliary rate variable of the first-order wave split.
    WaveVelocity,
    /// Primary field of the first-order wave split.
    WaveField,
    Custom(&'static str),
}

/// The displacement roles for a `dim`-dimensional problem.
pub(crate) fn disp_roles(dim: usize) -> Vec<DofRole> {
    [DofRole::DispX, DofRole::DispY, DofRole::DispZ][..dim].to_vec()
}

/// Named scalar quantities a kernel wants projected to nodes
/// (von Mises stress and the like). Filled by
/// [`ElmtKernel::compute_projection`].
pub type ProjectionMap = FxHashMap<String, f64>;

/// A user-registered kernel implementation for one of the `User1..=User10`
/// dispatch slots.
pub trait UserKernel: Send + Sync {
    fn dof_roles(&self, dim: usize) -> Vec<DofRole>;
    fn material_schema(&self) -> MaterialSchema;
    fn compute_residual(
        &self,
        info: &LocalElmtInfo,
        soln: &LocalElmtSolution,
        shp: &LocalShapeFun,
        mate_old: &MaterialsContainer,
        mate: &MaterialsContainer,
        r: &mut DVector<f64>,
    ) -> Result<(), FemError>;
    fn compute_jacobian(
        &self,
        info: &LocalElmtInfo,
        ctan: &[f64; 3],
        soln: &LocalElmtSolution,
        shp: &LocalShapeFun,
        mate_old: &MaterialsContainer,
        mate: &MaterialsContainer,
        k: &mut DMatrix<f64>,
    ) -> Result<(), FemError>;
}

/// One weak-form kernel per governing PDE.
///
/// The variants form a closed set; user-defined physics plug into the
/// `User` slots through the registry rather than by extending the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElmtKernel {
    /// $\nabla \cdot (\sigma \nabla u) = 0$
    Laplace,
    /// $\nabla \cdot (\sigma \nabla u) + f = 0$
    Poisson,
    /// $\dot c = \nabla \cdot (D \nabla c)$
    Diffusion,
    /// $\rho c_p \dot T = \nabla \cdot (k \nabla T) + Q$
    Thermal,
    /// $\ddot u = c^2 \Delta u + f$ as a first-order (v, u) system
    Wave,
    /// Allen-Cahn: $\dot \eta = -L (\delta F / \delta \eta)$
    AllenCahn,
    /// Cahn-Hilliard mixed (c, mu) form
    CahnHilliard,
    /// Quasi-static stress equilibrium $\nabla \cdot \sigma = 0$
    Mechanics,
    /// Miehe phase-field fracture (d + displacements)
    MieheFracture,
    /// Allen-Cahn mobility variant of phase-field fracture
    AllenCahnFracture,
    /// Hydrostatic-stress-driven diffusion coupled to mechanics
    StressDiffusion,
    /// Cahn-Hilliard coupled to mechanics (c, mu + displacements)
    StressCahnHilliard,
    /// Diffusion + Allen-Cahn fracture + mechanics
    DiffusionFracture,
    /// Kobayashi anisotropic dendrite growth (eta, T), 2-D only
    Kobayashi,
}

impl ElmtKernel {
    /// The ordered dof roles of this kernel for a `dim`-dimensional
    /// problem. The slice order is the local dof ordering.
    pub fn dof_roles(&self, dim: usize) -> Vec<DofRole> {
        use DofRole::*;
        match self {
            ElmtKernel::Laplace | ElmtKernel::Poisson => vec![Potential],
            ElmtKernel::Diffusion => vec![Concentration],
            ElmtKernel::Thermal => vec![Temperature],
            ElmtKernel::Wave => vec![WaveVelocity, WaveField],
            ElmtKernel::AllenCahn => vec![OrderParameter],
            ElmtKernel::CahnHilliard => vec![Concentration, ChemicalPotential],
            ElmtKernel::Mechanics => disp_roles(dim),
            ElmtKernel::MieheFracture | ElmtKernel::AllenCahnFracture => {
                let mut roles = vec![Damage];
                roles.extend(disp_roles(dim));
                roles
            }
            ElmtKernel::StressDiffusion => {
                let mut roles = vec![Concentration];
                roles.extend(disp_roles(dim));
                roles
            }
            ElmtKernel::StressCahnHilliard => {
                let mut roles = vec![Concentration, ChemicalPotential];
                roles.extend(disp_roles(dim));
                roles
            }
            ElmtKernel::DiffusionFracture => {
                let mut roles = vec![Concentration, Damage];
                roles.extend(disp_roles(dim));
                roles
            }
            ElmtKernel::Kobayashi => vec![OrderParameter, Temperature],
        }
    }

    /// Dofs per node for a `dim`-dimensional problem.
    pub fn dofs_per_node(&self, dim: usize) -> usize {
        self.dof_roles(dim).len()
    }

    /// The material keys this kernel reads, for setup-time validation.
    pub fn material_schema(&self) -> MaterialSchema {
        match self {
            ElmtKernel::Laplace => laplace::SCHEMA,
            ElmtKernel::Poisson => poisson::SCHEMA,
            ElmtKernel::Diffusion => diffusion::SCHEMA,
            ElmtKernel::Thermal => thermal::SCHEMA,
            ElmtKernel::Wave => wave::SCHEMA,
            ElmtKernel::AllenCahn => allen_cahn::SCHEMA,
            ElmtKernel::CahnHilliard => cahn_hilliard::SCHEMA,
            ElmtKernel::Mechanics => mechanics::SCHEMA,
            ElmtKernel::MieheFracture => miehe_fracture::SCHEMA,
            ElmtKernel::AllenCahnFracture => allen_cahn_fracture::SCHEMA,
            ElmtKernel::StressDiffusion => stress_diffusion::SCHEMA,
            ElmtKernel::StressCahnHilliard => stress_cahn_hilliard::SCHEMA,
            ElmtKernel::DiffusionFracture => diffusion_fracture::SCHEMA,
            ElmtKernel::Kobayashi => kobayashi::SCHEMA,
        }
    }

    /// Checks the element info against this kernel's declared dof count.
    fn check_dofs(&self, info: &LocalElmtInfo) -> Result<(), FemError> {
        let expected = self.dofs_per_node(info.dim);
        if info.dofs_per_node != expected {
            return Err(FemError::DofMismatch {
                expected,
                got: info.dofs_per_node,
            });
        }
        Ok(())
    }

    /// Evaluates residual and/or Jacobian per `calc_type`.
    ///
    /// `r` and `k` are the caller-owned per-(node pair) blocks of size
    /// `dofs_per_node`; the kernel overwrites exactly the entries of its
    /// dof ordering. `ctan[0]` scales non-rate terms, `ctan[1]`/`ctan[2]`
    /// scale first/second-order rate terms (coefficients chosen by the
    /// external time integrator).
    #[allow(clippy::too_many_arguments)]
    pub fn compute_all(
        &self,
        calc_type: CalcType,
        info: &LocalElmtInfo,
        ctan: &[f64; 3],
        soln: &LocalElmtSolution,
        shp: &LocalShapeFun,
        mate_old: &MaterialsContainer,
        mate: &MaterialsContainer,
        k: &mut DMatrix<f64>,
        r: &mut DVector<f64>,
    ) -> Result<(), FemError> {
        if calc_type.wants_residual() {
            self.compute_residual(info, soln, shp, mate_old, mate, r)?;
        }
        if calc_type.wants_jacobian() {
            self.compute_jacobian(info, ctan, soln, shp, mate_old, mate, k)?;
        }
        Ok(())
    }

    /// Evaluates the weak-form residual block for one test node.
    #[allow(clippy::too_many_arguments)]
    pub fn compute_residual(
        &self,
        info: &LocalElmtInfo,
        soln: &LocalElmtSolution,
        shp: &LocalShapeFun,
        mate_old: &MaterialsContainer,
        mate: &MaterialsContainer,
        r: &mut DVector<f64>,
    ) -> Result<(), FemError> {
        self.check_dofs(info)?;
        match self {
            ElmtKernel::Laplace => laplace::residual(info, soln, shp, mate_old, mate, r),
            ElmtKernel::Poisson => poisson::residual(info, soln, shp, mate_old, mate, r),
            ElmtKernel::Diffusion => diffusion::residual(info, soln, shp, mate_old, mate, r),
            ElmtKernel::Thermal => thermal::residual(info, soln, shp, mate_old, mate, r),
            ElmtKernel::Wave => wave::residual(info, soln, shp, mate_old, mate, r),
            ElmtKernel::AllenCahn => allen_cahn::residual(info, soln, shp, mate_old, mate, r),
            ElmtKernel::CahnHilliard => cahn_hilliard::residual(info, soln, shp, mate_old, mate, r),
            ElmtKernel::Mechanics => mechanics::residual(info, soln, shp, mate_old, mate, r),
            ElmtKernel::MieheFracture => {
                miehe_fracture::residual(info, soln, shp, mate_old, mate, r)
            }
            ElmtKernel::AllenCahnFracture => {
                allen_cahn_fracture::residual(info, soln, shp, mate_old, mate, r)
            }
            ElmtKernel::StressDiffusion => {
                stress_diffusion::residual(info, soln, shp, mate_old, mate, r)
            }
            ElmtKernel::StressCahnHilliard => {
                stress_cahn_hilliard::residual(info, soln, shp, mate_old, mate, r)
            }
            ElmtKernel::DiffusionFracture => {
                diffusion_fracture::residual(info, soln, shp, mate_old, mate, r)
            }
            ElmtKernel::Kobayashi => kobayashi::residual(info, soln, shp, mate_old, mate, r),
        }
    }

    /// Evaluates the exact linearization block for one (test, trial) node
    /// pair.
    #[allow(clippy::too_many_arguments)]
    pub fn compute_jacobian(
        &self,
        info: &LocalElmtInfo,
        ctan: &[f64; 3],
        soln: &LocalElmtSolution,
        shp: &LocalShapeFun,
        mate_old: &MaterialsContainer,
        mate: &MaterialsContainer,
        k: &mut DMatrix<f64>,
    ) -> Result<(), FemError> {
        self.check_dofs(info)?;
        match self {
            ElmtKernel::Laplace => laplace::jacobian(info, ctan, soln, shp, mate_old, mate, k),
            ElmtKernel::Poisson => poisson::jacobian(info, ctan, soln, shp, mate_old, mate, k),
            ElmtKernel::Diffusion => diffusion::jacobian(info, ctan, soln, shp, mate_old, mate, k),
            ElmtKernel::Thermal => thermal::jacobian(info, ctan, soln, shp, mate_old, mate, k),
            ElmtKernel::Wave => wave::jacobian(info, ctan, soln, shp, mate_old, mate, k),
            ElmtKernel::AllenCahn => {
                allen_cahn::jacobian(info, ctan, soln, shp, mate_old, mate, k)
            }
            ElmtKernel::CahnHilliard => {
                cahn_hilliard::jacobian(info, ctan, soln, shp, mate_old, mate, k)
            }
            ElmtKernel::Mechanics => mechanics::jacobian(info, ctan, soln, shp, mate_old, mate, k),
            ElmtKernel::MieheFracture => {
                miehe_fracture::jacobian(info, ctan, soln, shp, mate_old, mate, k)
            }
            ElmtKernel::AllenCahnFracture => {
                allen_cahn_fracture::jacobian(info, ctan, soln, shp, mate_old, mate, k)
            }
            ElmtKernel::StressDiffusion => {
                stress_diffusion::jacobian(info, ctan, soln, shp, mate_old, mate, k)
            }
            ElmtKernel::StressCahnHilliard => {
                stress_cahn_hilliard::jacobian(info, ctan, soln, shp, mate_old, mate, k)
            }
            ElmtKernel::DiffusionFracture => {
                diffusion_fracture::jacobian(info, ctan, soln, shp, mate_old, mate, k)
            }
            ElmtKernel::Kobayashi => kobayashi::jacobian(info, ctan, soln, shp, mate_old, mate, k),
        }
    }

    /// Writes this kernel's derived scalar quantities (for nodal
    /// projection) into `proj`, weighted by the caller afterwards. Kernels
    /// without projections write nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn compute_projection(
        &self,
        info: &LocalElmtInfo,
        soln: &LocalElmtSolution,
        shp: &LocalShapeFun,
        mate_old: &MaterialsContainer,
        mate: &MaterialsContainer,
        proj: &mut ProjectionMap,
    ) -> Result<(), FemError> {
        let _ = (info, soln, shp, mate_old);
        match self {
            ElmtKernel::Mechanics
            | ElmtKernel::MieheFracture
            | ElmtKernel::AllenCahnFracture
            | ElmtKernel::StressDiffusion
            | ElmtKernel::StressCahnHilliard
            | ElmtKernel::DiffusionFracture => mechanics::projection(mate, proj),
            _ => Ok(()),
        }
    }
}

/// Derivatives of the quadratic degradation $g(d) = (1 - d)^2$ shared by
/// the phase-field fracture kernels. Only the derivatives enter the weak
/// form; $g$ itself is the constitutive model's business.
pub(crate) fn degradation_deriv(d: f64) -> f64 {
    2.0 * (d - 1.0)
}

pub(crate) fn degradation_deriv2(_d: f64) -> f64 {
    2.0
}

/// The symmetrized history-derivative contraction used by the fracture
/// kernels' damage/displacement coupling block: row `i` of
/// $\partial H / \partial \varepsilon$ dotted with the trial gradient,
/// symmetrized for the small-strain case.
pub(crate) fn history_strain_coupling(
    dh_dstrain: &crate::tensor::Rank2Tensor,
    grad_trial: &nalgebra::Vector3<f64>,
    finite_strain: bool,
) -> [f64; 3] {
    let mut vals = [0.0; 3];
    for i in 0..3 {
        for k in 0..3 {
            let coeff = if finite_strain {
                dh_dstrain.get(i, k)
            } else {
                0.5 * (dh_dstrain.get(i, k) + dh_dstrain.get(k, i))
            };
            vals[i] += coeff * grad_trial[k];
        }
    }
    vals
}
