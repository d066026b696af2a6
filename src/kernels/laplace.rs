//! Weak form of $\nabla \cdot (\sigma(u) \nabla u) = 0$ with a
//! solution-dependent conductivity.

use crate::error::FemError;
use crate::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use crate::materials::{MaterialSchema, MaterialsContainer};
use nalgebra::{DMatrix, DVector};

pub(crate) const SCHEMA: MaterialSchema = MaterialSchema {
    booleans: &[],
    scalars: &["sigma", "dsigmadu"],
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
    let sigma = mate.scalar("sigma")?;
    r[0] = sigma * soln.grad_u[0].dot(&shp.grad_test);
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
    let sigma = mate.scalar("sigma")?;
    let dsigmadu = mate.scalar("dsigmadu")?;
    k[(0, 0)] = dsigmadu * shp.trial * soln.grad_u[0].dot(&shp.grad_test) * ctan[0]
        + sigma * shp.grad_trial.dot(&shp.grad_test) * ctan[0];
    Ok(())
}
