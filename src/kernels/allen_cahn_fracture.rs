//! Allen-Cahn mobility variant of phase-field fracture: identical
//! structure to the Miehe kernel but the whole damage driving force is
//! scaled by a mobility `L` instead of a viscous resistance.
//! Local dof ordering is `[d, ux, uy(, uz)]`.

use crate::error::FemError;
use crate::kernels::{degradation_deriv, degradation_deriv2, history_strain_coupling};
use crate::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use crate::materials::{MaterialSchema, MaterialsContainer};
use nalgebra::{DMatrix, DVector};

pub(crate) const SCHEMA: MaterialSchema = MaterialSchema {
    booleans: &["finite-strain"],
    scalars: &["L", "Gc", "eps", "H", "dFdD", "d2FdD2"],
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
    let l = mate.scalar("L")?;
    let gc = mate.scalar("Gc")?;
    let eps = mate.scalar("eps")?;
    let hist = mate.scalar("H")?;
    let dfdd = mate.scalar("dFdD")?;
    let stress = mate.rank2("stress")?;

    let d = soln.u[0];
    r[0] = soln.v[0] * shp.test
        + l * degradation_deriv(d) * hist * shp.test
        + l * dfdd * shp.test
        + l * gc * eps * soln.grad_u[0].dot(&shp.grad_test);
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
    let l = mate.scalar("L")?;
    let gc = mate.scalar("Gc")?;
    let eps = mate.scalar("eps")?;
    let hist = mate.scalar("H")?;
    let d2fdd2 = mate.scalar("d2FdD2")?;
    let dstress_dd = mate.rank2("dstressdD")?;
    let dh_dstrain = mate.rank2("dHdstrain")?;
    let jac = mate.rank4("jacobian")?;
    let finite_strain = mate.boolean("finite-strain")?;

    let d = soln.u[0];
    k[(0, 0)] = shp.trial * shp.test * ctan[1]
        + l * degradation_deriv2(d) * shp.trial * hist * shp.test * ctan[0]
        + l * d2fdd2 * shp.trial * shp.test * ctan[0]
        + l * gc * eps * shp.grad_trial.dot(&shp.grad_test) * ctan[0];

    let vals = history_strain_coupling(&dh_dstrain, &shp.grad_trial, finite_strain);
    for i in 0..info.dim {
        k[(0, 1 + i)] = l * degradation_deriv(d) * vals[i] * shp.test * ctan[0];
        k[(1 + i, 0)] = dstress_dd.row(i).dot(&shp.grad_test) * shp.trial * ctan[0];
        for j in 0..info.dim {
            k[(1 + i, 1 + j)] = jac.ik_component(i, j, &shp.grad_test, &shp.grad_trial) * ctan[0];
        }
    }
    Ok(())
}
