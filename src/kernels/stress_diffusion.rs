//! Hydrostatic-stress-driven diffusion coupled to stress equilibrium,
//! local dof ordering `[c, ux, uy(, uz)]`:
//!
//! $$ \dot c = \nabla \cdot \left( D \nabla c
//!    - D c \Omega \nabla \sigma_h \right), \qquad
//!    \nabla \cdot \boldsymbol\sigma = 0 $$
//!
//! The hydrostatic-stress gradient is folded into the scalar `SigmaH`
//! material coefficient by the constitutive model, so the kernel sees the
//! drift term as $-D c \Omega \sigma_h \nabla c \cdot \nabla N$.
//! The stress carries a concentration eigenstrain through `dstressdc`;
//! the concentration row does not feed back from displacements, so
//! `K(c, u)` is identically zero.

use crate::error::FemError;
use crate::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use crate::materials::{MaterialSchema, MaterialsContainer};
use nalgebra::{DMatrix, DVector};

pub(crate) const SCHEMA: MaterialSchema = MaterialSchema {
    booleans: &[],
    scalars: &["D", "Omega", "SigmaH"],
    vectors: &[],
    rank2: &["stress", "dstressdc"],
    rank4: &["jacobian"],
};

pub(crate) fn residual(
    info: &LocalElmtInfo,
    soln: &LocalElmtSolution,
    shp: &LocalShapeFun,
    _mate_old: &MaterialsContainer,
    mate: &MaterialsContainer,
    r: &mut DVector<f64>,
) -> Result<(), FemError> {
    let d = mate.scalar("D")?;
    let omega = mate.scalar("Omega")?;
    let sigma_h = mate.scalar("SigmaH")?;
    let stress = mate.rank2("stress")?;

    let c = soln.u[0];
    r[0] = soln.v[0] * shp.test + d * soln.grad_u[0].dot(&shp.grad_test)
        - d * c * omega * sigma_h * soln.grad_u[0].dot(&shp.grad_test);
    for i in 0..info.dim {
        r[1 + i] = stress.row(i).dot(&shp.grad_test);
    }
    Ok(())
}

pub(crate) fn jacobian(
    info: &LocalElmtInfo,
    ctan: &[f64; 3],
    soln: &LocalElmtSolution,
    shp: &LocalShapeFun,
    _mate_old: &MaterialsContainer,
    mate: &MaterialsContainer,
    k: &mut DMatrix<f64>,
) -> Result<(), FemError> {
    let d = mate.scalar("D")?;
    let omega = mate.scalar("Omega")?;
    let sigma_h = mate.scalar("SigmaH")?;
    let dstress_dc = mate.rank2("dstressdc")?;
    let jac = mate.rank4("jacobian")?;

    let c = soln.u[0];
    k[(0, 0)] = shp.trial * shp.test * ctan[1]
        + d * shp.grad_trial.dot(&shp.grad_test) * ctan[0]
        - d * shp.trial * omega * sigma_h * soln.grad_u[0].dot(&shp.grad_test) * ctan[0]
        - d * c * omega * sigma_h * shp.grad_trial.dot(&shp.grad_test) * ctan[0];
    for i in 0..info.dim {
        k[(0, 1 + i)] = 0.0;
        k[(1 + i, 0)] = dstress_dc.row(i).dot(&shp.grad_test) * shp.trial * ctan[0];
        for j in 0..info.dim {
            k[(1 + i, 1 + j)] = jac.ik_component(i, j, &shp.grad_test, &shp.grad_trial) * ctan[0];
        }
    }
    Ok(())
}
