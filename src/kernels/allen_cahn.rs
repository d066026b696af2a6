//! Allen-Cahn evolution
//! $\dot \eta = -L \left( \frac{\partial F}{\partial \eta} - \epsilon
//! \Delta \eta \right)$ for a non-conserved order parameter.

use crate::error::FemError;
use crate::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use crate::materials::{MaterialSchema, MaterialsContainer};
use nalgebra::{DMatrix, DVector};

pub(crate) const SCHEMA: MaterialSchema = MaterialSchema {
    booleans: &[],
    scalars: &["L", "eps", "dFdeta", "d2Fdeta2"],
    vectors: &[],
    rank2: &[],
    rank4: &[],
};

pub(crate) fn residual(
    _info: &LocalElmtInfo,
    soln: &LocalElmtSolution,
    shp: &LocalShapeFun,
    _mate_old: &MaterialsContainer,
    mate: &MaterialsContainer,
    r: &mut DVector<f64>,
) -> Result<(), FemError> {
    let l = mate.scalar("L")?;
    let eps = mate.scalar("eps")?;
    let dfdeta = mate.scalar("dFdeta")?;
    r[0] = soln.v[0] * shp.test
        + l * eps * soln.grad_u[0].dot(&shp.grad_test)
        + l * dfdeta * shp.test;
    Ok(())
}

pub(crate) fn jacobian(
    _info: &LocalElmtInfo,
    ctan: &[f64; 3],
    _soln: &LocalElmtSolution,
    shp: &LocalShapeFun,
    _mate_old: &MaterialsContainer,
    mate: &MaterialsContainer,
    k: &mut DMatrix<f64>,
) -> Result<(), FemError> {
    let l = mate.scalar("L")?;
    let eps = mate.scalar("eps")?;
    let d2fdeta2 = mate.scalar("d2Fdeta2")?;
    k[(0, 0)] = shp.trial * shp.test * ctan[1]
        + l * eps * shp.grad_trial.dot(&shp.grad_test) * ctan[0]
        + l * d2fdeta2 * shp.trial * shp.test * ctan[0];
    Ok(())
}
