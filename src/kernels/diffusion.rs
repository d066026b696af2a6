//! Transient diffusion $\dot c = \nabla \cdot (D(c) \nabla c)$.

use crate::error::FemError;
use crate::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use crate::materials::{MaterialSchema, MaterialsContainer};
use nalgebra::{DMatrix, DVector};

pub(crate) const SCHEMA: MaterialSchema = MaterialSchema {
    booleans: &[],
    scalars: &["D", "dDdc"],
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
    let d = mate.scalar("D")?;
    r[0] = soln.v[0] * shp.test + d * soln.grad_u[0].dot(&shp.grad_test);
    Ok(())
}

pub(crate) fn jacobian(
    _info: &LocalElmtInfo,
    ctan: &[f64; 3],
    soln: &LocalElmtSolution,
    shp: &LocalShapeFun,
    _mate_old: &MaterialsContainer,
    mate: &MaterialsContainer,
    k: &mut DMatrix<f64>,
) -> Result<(), FemError> {
    let d = mate.scalar("D")?;
    let dddc = mate.scalar("dDdc")?;
    k[(0, 0)] = shp.trial * shp.test * ctan[1]
        + dddc * shp.trial * soln.grad_u[0].dot(&shp.grad_test) * ctan[0]
        + d * shp.grad_trial.dot(&shp.grad_test) * ctan[0];
    Ok(())
}
