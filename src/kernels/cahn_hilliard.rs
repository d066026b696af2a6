//! Mixed-form Cahn-Hilliard with local dof ordering `[c, mu]`:
//!
//! $$ \dot c = \nabla \cdot (M(c) \nabla \mu), \qquad
//!    \mu = \frac{\partial F}{\partial c} - \kappa \Delta c $$
//!
//! The chemical-potential definition is enforced weakly as the second
//! residual row, which keeps the fourth-order problem solvable with
//! $C^0$ elements.

use crate::error::FemError;
use crate::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use crate::materials::{MaterialSchema, MaterialsContainer};
use nalgebra::{DMatrix, DVector};

pub(crate) const SCHEMA: MaterialSchema = MaterialSchema {
    booleans: &[],
    scalars: &["M", "dMdC", "dFdC", "d2FdC2", "kappa"],
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
    let m = mate.scalar("M")?;
    let dfdc = mate.scalar("dFdC")?;
    let kappa = mate.scalar("kappa")?;
    r[0] = soln.v[0] * shp.test + m * soln.grad_u[1].dot(&shp.grad_test);
    r[1] = soln.u[1] * shp.test - dfdc * shp.test - kappa * soln.grad_u[0].dot(&shp.grad_test);
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
    let m = mate.scalar("M")?;
    let dmdc = mate.scalar("dMdC")?;
    let d2fdc2 = mate.scalar("d2FdC2")?;
    let kappa = mate.scalar("kappa")?;
    k[(0, 0)] = shp.trial * shp.test * ctan[1]
        + dmdc * shp.trial * soln.grad_u[1].dot(&shp.grad_test) * ctan[0];
    k[(0, 1)] = m * shp.grad_trial.dot(&shp.grad_test) * ctan[0];
    k[(1, 0)] = -d2fdc2 * shp.trial * shp.test * ctan[0]
        - kappa * shp.grad_trial.dot(&shp.grad_test) * ctan[0];
    k[(1, 1)] = shp.trial * shp.test * ctan[0];
    Ok(())
}
