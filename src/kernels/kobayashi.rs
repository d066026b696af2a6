//! Kobayashi anisotropic dendrite growth, local dof ordering `[eta, T]`
//! and strictly two-dimensional. The anisotropic gradient energy
//! $\frac{1}{2} K(\theta)^2 |\nabla\eta|^2$ with
//! $\theta = \arctan(\partial_y \eta / \partial_x \eta)$ produces, beside
//! the usual $K^2 \nabla\eta$ flux, the rotated flux $K K'
//! (-\partial_y \eta, \partial_x \eta)$; both are linearized exactly
//! through the chain-rule vectors `dKdGradEta` and `ddKdGradEta` supplied
//! by the material model. The temperature row carries the latent-heat
//! release $-L_h \dot\eta$.

use crate::error::FemError;
use crate::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use crate::materials::{MaterialSchema, MaterialsContainer};
use nalgebra::{DMatrix, DVector, Vector3};

pub(crate) const SCHEMA: MaterialSchema = MaterialSchema {
    booleans: &[],
    scalars: &["L", "K", "dK", "dFdeta", "d2Fdeta2", "d2FdetadT", "Latent-heat"],
    vectors: &["dKdGradEta", "ddKdGradEta"],
    rank2: &[],
    rank4: &[],
};

fn check_dim(info: &LocalElmtInfo) -> Result<(), FemError> {
    if info.dim != 2 {
        return Err(FemError::Configuration(format!(
            "dendrite-growth kernel is 2-d only, got a {}-d element",
            info.dim
        )));
    }
    Ok(())
}

/// 90-degree rotation of the in-plane gradient, the direction of the
/// anisotropic flux correction.
fn rotated(grad: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(-grad[1], grad[0], 0.0)
}

pub(crate) fn residual(
    info: &LocalElmtInfo,
    soln: &LocalElmtSolution,
    shp: &LocalShapeFun,
    _mate_old: &MaterialsContainer,
    mate: &MaterialsContainer,
    r: &mut DVector<f64>,
) -> Result<(), FemError> {
    check_dim(info)?;
    let l = mate.scalar("L")?;
    let kk = mate.scalar("K")?;
    let dk = mate.scalar("dK")?;
    let dfdeta = mate.scalar("dFdeta")?;
    let latent = mate.scalar("Latent-heat")?;

    let v = rotated(&soln.grad_u[0]);
    r[0] = soln.v[0] * shp.test
        + l * kk * dk * v.dot(&shp.grad_test)
        + l * kk * kk * soln.grad_u[0].dot(&shp.grad_test)
        + l * dfdeta * shp.test;
    r[1] = soln.v[1] * shp.test + soln.grad_u[1].dot(&shp.grad_test)
        - latent * soln.v[0] * shp.test;
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
    check_dim(info)?;
    let l = mate.scalar("L")?;
    let kk = mate.scalar("K")?;
    let dk = mate.scalar("dK")?;
    let d2fdeta2 = mate.scalar("d2Fdeta2")?;
    let d2fdetadt = mate.scalar("d2FdetadT")?;
    let latent = mate.scalar("Latent-heat")?;
    let dk_dgrad = mate.vector("dKdGradEta")?;
    let ddk_dgrad = mate.vector("ddKdGradEta")?;

    let v = rotated(&soln.grad_u[0]);
    let dv = rotated(&shp.grad_trial);
    k[(0, 0)] = shp.trial * shp.test * ctan[1]
        + l * dk_dgrad.dot(&shp.grad_trial) * dk * v.dot(&shp.grad_test) * ctan[0]
        + l * kk * ddk_dgrad.dot(&shp.grad_trial) * v.dot(&shp.grad_test) * ctan[0]
        + l * kk * dk * dv.dot(&shp.grad_test) * ctan[0]
        + l * 2.0 * kk * dk_dgrad.dot(&shp.grad_trial) * soln.grad_u[0].dot(&shp.grad_test)
            * ctan[0]
        + l * kk * kk * shp.grad_trial.dot(&shp.grad_test) * ctan[0]
        + l * d2fdeta2 * shp.trial * shp.test * ctan[0];
    k[(0, 1)] = l * d2fdetadt * shp.trial * shp.test * ctan[0];
    k[(1, 0)] = -latent * shp.trial * shp.test * ctan[1];
    k[(1, 1)] = shp.trial * shp.test * ctan[1] + shp.grad_trial.dot(&shp.grad_test) * ctan[0];
    Ok(())
}
