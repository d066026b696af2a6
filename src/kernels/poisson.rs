//! Weak form of $\nabla \cdot (\sigma(u) \nabla u) = f(u)$.
//!
//! The source term enters the residual with a positive sign, so a
//! manufactured solution $u^\*$ satisfies $f = \nabla \cdot (\sigma
//! \nabla u^\*)$ in the strong form.

use crate::error::FemError;
use crate::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use crate::materials::{MaterialSchema, MaterialsContainer};
use nalgebra::{DMatrix, DVector};

pub(crate) const SCHEMA: MaterialSchema = MaterialSchema {
    booleans: &[],
    scalars: &["sigma", "dsigmadu", "f", "dfdu"],
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
    let f = mate.scalar("f")?;
    r[0] = sigma * soln.grad_u[0].dot(&shp.grad_test) + f * shp.test;
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
    let dfdu = mate.scalar("dfdu")?;
    k[(0, 0)] = dsigmadu * shp.trial * soln.grad_u[0].dot(&shp.grad_test) * ctan[0]
        + sigma * shp.grad_trial.dot(&shp.grad_test) * ctan[0]
        + dfdu * shp.trial * shp.test * ctan[0];
    Ok(())
}
