//! Scalar wave equation $\ddot u = c^2 \Delta u + f(u, v)$, split into the
//! first-order system
//!
//! $$ \dot v = c^2 \Delta u + f, \qquad \dot u = v $$
//!
//! so that a first-order time integrator handles it. Local dof ordering is
//! `[v, u]`; only `ctan[0]` and `ctan[1]` enter the linearization.

use crate::error::FemError;
use crate::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use crate::materials::{MaterialSchema, MaterialsContainer};
use nalgebra::{DMatrix, DVector};

pub(crate) const SCHEMA: MaterialSchema = MaterialSchema {
    booleans: &[],
    scalars: &["C", "f", "dfdu", "dfdv"],
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
    let c = mate.scalar("C")?;
    let f = mate.scalar("f")?;
    r[0] = soln.v[0] * shp.test + c * c * soln.grad_u[1].dot(&shp.grad_test) - f * shp.test;
    r[1] = soln.v[1] * shp.test - soln.u[0] * shp.test;
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
    let c = mate.scalar("C")?;
    let dfdu = mate.scalar("dfdu")?;
    let dfdv = mate.scalar("dfdv")?;
    k[(0, 0)] = shp.trial * shp.test * ctan[1] - dfdv * shp.trial * shp.test * ctan[0];
    k[(0, 1)] = c * c * shp.grad_trial.dot(&shp.grad_test) * ctan[0]
        - dfdu * shp.trial * shp.test * ctan[0];
    k[(1, 0)] = -shp.trial * shp.test * ctan[0];
    k[(1, 1)] = shp.trial * shp.test * ctan[1];
    Ok(())
}
