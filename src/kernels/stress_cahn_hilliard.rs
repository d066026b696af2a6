//! Cahn-Hilliard phase separation coupled to stress equilibrium, local
//! dof ordering `[c, mu, ux, uy(, uz)]`. The mixed (c, mu) blocks match
//! the plain Cahn-Hilliard kernel; elasticity modifies the chemical
//! potential through the mixed derivative
//! $\partial^2 F / \partial c \, \partial \boldsymbol\varepsilon$ and the
//! stress carries a compositional eigenstrain through `dstressdc`.

use crate::error::FemError;
use crate::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use crate::materials::{MaterialSchema, MaterialsContainer};
use nalgebra::{DMatrix, DVector};

pub(crate) const SCHEMA: MaterialSchema = MaterialSchema {
    booleans: &[],
    scalars: &["M", "dMdC", "dFdC", "d2FdC2", "kappa"],
    vectors: &[],
    rank2: &["stress", "dstressdc", "d2FdCdStrain"],
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
    let m = mate.scalar("M")?;
    let dfdc = mate.scalar("dFdC")?;
    let kappa = mate.scalar("kappa")?;
    let stress = mate.rank2("stress")?;

    r[0] = soln.v[0] * shp.test + m * soln.grad_u[1].dot(&shp.grad_test);
    r[1] = soln.u[1] * shp.test - dfdc * shp.test - kappa * soln.grad_u[0].dot(&shp.grad_test);
    for i in 0..info.dim {
        r[2 + i] = stress.row(i).dot(&shp.grad_test);
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
    let m = mate.scalar("M")?;
    let dmdc = mate.scalar("dMdC")?;
    let d2fdc2 = mate.scalar("d2FdC2")?;
    let kappa = mate.scalar("kappa")?;
    let dstress_dc = mate.rank2("dstressdc")?;
    let d2fdcdstrain = mate.rank2("d2FdCdStrain")?;
    let jac = mate.rank4("jacobian")?;

    k[(0, 0)] = shp.trial * shp.test * ctan[1]
        + dmdc * shp.trial * soln.grad_u[1].dot(&shp.grad_test) * ctan[0];
    k[(0, 1)] = m * shp.grad_trial.dot(&shp.grad_test) * ctan[0];
    k[(1, 0)] = -d2fdc2 * shp.trial * shp.test * ctan[0]
        - kappa * shp.grad_trial.dot(&shp.grad_test) * ctan[0];
    k[(1, 1)] = shp.trial * shp.test * ctan[0];

    for i in 0..info.dim {
        // symmetrized mixed derivative, small-strain kinematics
        let mut val = 0.0;
        for j in 0..3 {
            val += 0.5
                * (d2fdcdstrain.get(i, j) + d2fdcdstrain.get(j, i))
                * shp.grad_trial[j];
        }
        k[(0, 2 + i)] = 0.0;
        k[(1, 2 + i)] = -val * shp.test * ctan[0];
        k[(2 + i, 0)] = dstress_dc.row(i).dot(&shp.grad_test) * shp.trial * ctan[0];
        k[(2 + i, 1)] = 0.0;
        for j in 0..info.dim {
            k[(2 + i, 2 + j)] = jac.ik_component(i, j, &shp.grad_test, &shp.grad_trial) * ctan[0];
        }
    }
    Ok(())
}
