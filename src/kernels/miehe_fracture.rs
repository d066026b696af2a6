//! Miehe-style phase-field fracture with local dof ordering
//! `[d, ux, uy(, uz)]`:
//!
//! $$ \eta \dot d = -\left( g'(d) \mathcal H + \frac{\partial F}{\partial d}
//!    - G_c \epsilon \Delta d \right), \qquad
//!    \nabla \cdot \boldsymbol\sigma(d, \boldsymbol\varepsilon) = 0 $$
//!
//! with the quadratic degradation $g(d) = (1-d)^2$ and the history field
//! $\mathcal H = \max_t \psi^+(\boldsymbol\varepsilon)$ maintained by the
//! material model. The `finite-strain` boolean selects whether the
//! damage/displacement coupling uses the raw or the symmetrized
//! $\partial \mathcal H / \partial \boldsymbol\varepsilon$.

use crate::error::FemError;
use crate::kernels::{degradation_deriv, degradation_deriv2, history_strain_coupling};
use crate::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use crate::materials::{MaterialSchema, MaterialsContainer};
use nalgebra::{DMatrix, DVector};

pub(crate) const SCHEMA: MaterialSchema = MaterialSchema {
    booleans: &["finite-strain"],
    scalars: &["viscosity", "Gc", "eps", "H", "dFdD", "d2FdD2"],
    vectors: &[],
    rank2: &["stress", "dstressdD", "dHdstrain"],
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
    let viscosity = mate.scalar("viscosity")?;
    let gc = mate.scalar("Gc")?;
    let eps = mate.scalar("eps")?;
    let hist = mate.scalar("H")?;
    let dfdd = mate.scalar("dFdD")?;
    let stress = mate.rank2("stress")?;

    let d = soln.u[0];
    r[0] = viscosity * soln.v[0] * shp.test
        + degradation_deriv(d) * hist * shp.test
        + dfdd * shp.test
        + gc * eps * soln.grad_u[0].dot(&shp.grad_test);
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
    let viscosity = mate.scalar("viscosity")?;
    let gc = mate.scalar("Gc")?;
    let eps = mate.scalar("eps")?;
    let hist = mate.scalar("H")?;
    let d2fdd2 = mate.scalar("d2FdD2")?;
    let dstress_dd = mate.rank2("dstressdD")?;
    let dh_dstrain = mate.rank2("dHdstrain")?;
    let jac = mate.rank4("jacobian")?;
    let finite_strain = mate.boolean("finite-strain")?;

    let d = soln.u[0];
    k[(0, 0)] = viscosity * shp.trial * shp.test * ctan[1]
        + degradation_deriv2(d) * shp.trial * hist * shp.test * ctan[0]
        + d2fdd2 * shp.trial * shp.test * ctan[0]
        + gc * eps * shp.grad_trial.dot(&shp.grad_test) * ctan[0];

    let vals = history_strain_coupling(&dh_dstrain, &shp.grad_trial, finite_strain);
    for i in 0..info.dim {
        k[(0, 1 + i)] = degradation_deriv(d) * vals[i] * shp.test * ctan[0];
        k[(1 + i, 0)] = dstress_dd.row(i).dot(&shp.grad_test) * shp.trial * ctan[0];
        for j in 0..info.dim {
            k[(1 + i, 1 + j)] = jac.ik_component(i, j, &shp.grad_test, &shp.grad_trial) * ctan[0];
        }
    }
    Ok(())
}
