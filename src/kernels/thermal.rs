//! Transient heat conduction
//! $\rho c_p \dot T = \nabla \cdot (k(T) \nabla T) + Q(T)$.

use crate::error::FemError;
use crate::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use crate::materials::{MaterialSchema, MaterialsContainer};
use nalgebra::{DMatrix, DVector};

pub(crate) const SCHEMA: MaterialSchema = MaterialSchema {
    booleans: &[],
    scalars: &["rho", "Cp", "K", "dKdT", "Q", "dQdT"],
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
    let rho = mate.scalar("rho")?;
    let cp = mate.scalar("Cp")?;
    let kappa = mate.scalar("K")?;
    let q = mate.scalar("Q")?;
    r[0] = rho * cp * soln.v[0] * shp.test + kappa * soln.grad_u[0].dot(&shp.grad_test)
        - q * shp.test;
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
    let rho = mate.scalar("rho")?;
    let cp = mate.scalar("Cp")?;
    let kappa = mate.scalar("K")?;
    let dkappadt = mate.scalar("dKdT")?;
    let dqdt = mate.scalar("dQdT")?;
    k[(0, 0)] = rho * cp * shp.trial * shp.test * ctan[1]
        + dkappadt * shp.trial * soln.grad_u[0].dot(&shp.grad_test) * ctan[0]
        + kappa * shp.grad_trial.dot(&shp.grad_test) * ctan[0]
        - dqdt * shp.trial * shp.test * ctan[0];
    Ok(())
}
