//! Maps configuration-level element type names onto kernels and owns the
//! per-domain element blocks.
//!
//! An [`ElmtBlock`] is one `[elmts]` entry of the input file: a named
//! binding of an [`ElmtType`] to a mesh domain and an ordered dof list.
//! The registry resolves each block's type to a concrete kernel (built-in
//! [`ElmtKernel`] variant or a registered [`UserKernel`] slot) and
//! validates the whole configuration once, at setup, so that assembly
//! never discovers a bad dof count or a missing material key mid-loop.

use crate::error::FemError;
use crate::kernels::{CalcType, DofRole, ElmtKernel, UserKernel};
use crate::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use crate::materials::{MaterialSchema, MaterialsContainer};
use nalgebra::{DMatrix, DVector};
use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Configuration-level element type names. `User1..=User10` dispatch to
/// kernels registered at runtime; `Null` is the explicit "no physics"
/// placeholder and never assembles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ElmtType {
    Null,
    Laplace,
    Poisson,
    Diffusion,
    Thermal,
    Wave,
    AllenCahn,
    CahnHilliard,
    Mechanics,
    MieheFracture,
    AllenCahnFracture,
    StressDiffusion,
    StressCahnHilliard,
    DiffusionFracture,
    Kobayashi,
    User1,
    User2,
    User3,
    User4,
    User5,
    User6,
    User7,
    User8,
    User9,
    User10,
}

impl ElmtType {
    /// The built-in kernel for this type, if it has one.
    pub fn kernel(&self) -> Option<ElmtKernel> {
        match self {
            ElmtType::Laplace => Some(ElmtKernel::Laplace),
            ElmtType::Poisson => Some(ElmtKernel::Poisson),
            ElmtType::Diffusion => Some(ElmtKernel::Diffusion),
            ElmtType::Thermal => Some(ElmtKernel::Thermal),
            ElmtType::Wave => Some(ElmtKernel::Wave),
            ElmtType::AllenCahn => Some(ElmtKernel::AllenCahn),
            ElmtType::CahnHilliard => Some(ElmtKernel::CahnHilliard),
            ElmtType::Mechanics => Some(ElmtKernel::Mechanics),
            ElmtType::MieheFracture => Some(ElmtKernel::MieheFracture),
            ElmtType::AllenCahnFracture => Some(ElmtKernel::AllenCahnFracture),
            ElmtType::StressDiffusion => Some(ElmtKernel::StressDiffusion),
            ElmtType::StressCahnHilliard => Some(ElmtKernel::StressCahnHilliard),
            ElmtType::DiffusionFracture => Some(ElmtKernel::DiffusionFracture),
            ElmtType::Kobayashi => Some(ElmtKernel::Kobayashi),
            _ => None,
        }
    }

    /// Index into the user-kernel table, if this is a user slot.
    fn user_slot(&self) -> Option<usize> {
        match self {
            ElmtType::User1 => Some(0),
            ElmtType::User2 => Some(1),
            ElmtType::User3 => Some(2),
            ElmtType::User4 => Some(3),
            ElmtType::User5 => Some(4),
            ElmtType::User6 => Some(5),
            ElmtType::User7 => Some(6),
            ElmtType::User8 => Some(7),
            ElmtType::User9 => Some(8),
            ElmtType::User10 => Some(9),
            _ => None,
        }
    }
}

/// One `[elmts]` configuration block: an element type bound to a mesh
/// domain with an ordered dof name list.
#[derive(Debug, Clone, Deserialize)]
pub struct ElmtBlock {
    pub name: String,
    #[serde(rename = "type")]
    pub elmt_type: ElmtType,
    /// Dof names in the kernel's local dof order.
    pub dofs: Vec<String>,
    /// Mesh domain (element set) this block assembles over.
    #[serde(default = "default_domain")]
    pub domain: String,
}

fn default_domain() -> String {
    "alldomain".to_string()
}

/// The element block registry. Blocks are registered per domain; a block
/// naming an already-claimed domain replaces the earlier one (last wins)
/// with a warning, so input files stay order-dependent in the obvious way.
#[derive(Default)]
pub struct ElmtRegistry {
    blocks: Vec<ElmtBlock>,
    by_domain: FxHashMap<String, usize>,
    user_kernels: [Option<Box<dyn UserKernel>>; 10],
}

impl ElmtRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a block. If the domain is already claimed, the new block
    /// wins and the earlier block stays registered but unbound.
    pub fn add_block(&mut self, block: ElmtBlock) {
        if let Some(&prev) = self.by_domain.get(&block.domain) {
            log::warn!(
                "element block '{}' overrides block '{}' on domain '{}'",
                block.name,
                self.blocks[prev].name,
                block.domain
            );
        }
        self.by_domain.insert(block.domain.clone(), self.blocks.len());
        self.blocks.push(block);
    }

    /// Installs a user kernel into one of the `User1..=User10` slots.
    pub fn register_user_kernel(
        &mut self,
        slot: ElmtType,
        kernel: Box<dyn UserKernel>,
    ) -> Result<(), FemError> {
        let idx = slot.user_slot().ok_or_else(|| {
            FemError::Configuration(format!("{slot:?} is not a user kernel slot"))
        })?;
        self.user_kernels[idx] = Some(kernel);
        Ok(())
    }

    /// The block currently bound to `domain`, if any.
    pub fn block_for_domain(&self, domain: &str) -> Option<&ElmtBlock> {
        self.by_domain.get(domain).map(|&i| &self.blocks[i])
    }

    pub fn blocks(&self) -> &[ElmtBlock] {
        &self.blocks
    }

    fn user_kernel(&self, elmt_type: ElmtType) -> Result<&dyn UserKernel, FemError> {
        let idx = elmt_type
            .user_slot()
            .expect("caller checked this is a user slot");
        self.user_kernels[idx].as_deref().ok_or_else(|| {
            FemError::Configuration(format!("no kernel registered for slot {elmt_type:?}"))
        })
    }

    /// The dof roles of a block's kernel for a `dim`-dimensional problem.
    pub fn dof_roles(&self, elmt_type: ElmtType, dim: usize) -> Result<Vec<DofRole>, FemError> {
        if let Some(kernel) = elmt_type.kernel() {
            Ok(kernel.dof_roles(dim))
        } else if elmt_type.user_slot().is_some() {
            Ok(self.user_kernel(elmt_type)?.dof_roles(dim))
        } else {
            Err(FemError::Configuration(
                "a Null element block cannot assemble".to_string(),
            ))
        }
    }

    /// The material schema of a block's kernel.
    pub fn material_schema(&self, elmt_type: ElmtType) -> Result<MaterialSchema, FemError> {
        if let Some(kernel) = elmt_type.kernel() {
            Ok(kernel.material_schema())
        } else if elmt_type.user_slot().is_some() {
            Ok(self.user_kernel(elmt_type)?.material_schema())
        } else {
            Ok(MaterialSchema::default())
        }
    }

    /// Validates every registered block against a `dim`-dimensional
    /// problem: the type must resolve to a kernel, and the dof name list
    /// must match the kernel's declared dof count. Blocks displaced by a
    /// later registration on the same domain are skipped.
    pub fn validate(&self, dim: usize) -> Result<(), FemError> {
        for &idx in self.by_domain.values() {
            let block = &self.blocks[idx];
            let roles = self.dof_roles(block.elmt_type, dim).map_err(|e| {
                FemError::Configuration(format!("block '{}': {e}", block.name))
            })?;
            if block.dofs.len() != roles.len() {
                return Err(FemError::DofMismatch {
                    expected: roles.len(),
                    got: block.dofs.len(),
                });
            }
        }
        Ok(())
    }

    /// Validates a material state against a block kernel's schema. Run at
    /// setup with the constitutive model's prototype output so missing
    /// keys surface as configuration errors rather than assembly failures.
    pub fn validate_materials(
        &self,
        elmt_type: ElmtType,
        mate: &MaterialsContainer,
    ) -> Result<(), FemError> {
        mate.validate_schema(&self.material_schema(elmt_type)?)
    }

    /// Dispatches a kernel evaluation for `elmt_type`, built-in or user.
    #[allow(clippy::too_many_arguments)]
    pub fn run_kernels(
        &self,
        elmt_type: ElmtType,
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
        if let Some(kernel) = elmt_type.kernel() {
            return kernel.compute_all(calc_type, info, ctan, soln, shp, mate_old, mate, k, r);
        }
        if elmt_type.user_slot().is_some() {
            let user = self.user_kernel(elmt_type)?;
            if calc_type.wants_residual() {
                user.compute_residual(info, soln, shp, mate_old, mate, r)?;
            }
            if calc_type.wants_jacobian() {
                user.compute_jacobian(info, ctan, soln, shp, mate_old, mate, k)?;
            }
            return Ok(());
        }
        Err(FemError::Configuration(
            "a Null element block cannot assemble".to_string(),
        ))
    }
}
