//! Quasi-static stress equilibrium $\nabla \cdot \boldsymbol\sigma = 0$.
//!
//! The constitutive response lives entirely in the material state: the
//! kernel reads the Cauchy (or first Piola-Kirchhoff) stress and the
//! rank-4 tangent `jacobian` and contracts them with shape-function
//! gradients, so the same kernel serves every small- and finite-strain
//! constitutive model.

use crate::error::FemError;
use crate::kernels::ProjectionMap;
use crate::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use crate::materials::{MaterialSchema, MaterialsContainer};
use nalgebra::{DMatrix, DVector};

pub(crate) const SCHEMA: MaterialSchema = MaterialSchema {
    booleans: &[],
    scalars: &[],
    vectors: &[],
    rank2: &["stress"],
    rank4: &["jacobian"],
};

pub(crate) fn residual(
    info: &LocalElmtInfo,
    _soln: &LocalElmtSolution,
    shp: &LocalShapeFun,
    _mate_old: &MaterialsContainer,
    mate: &MaterialsContainer,
    r: &mut DVector<f64>,
) -> Result<(), FemError> {
    let stress = mate.rank2("stress")?;
    for i in 0..info.dim {
        r[i] = stress.row(i).dot(&shp.grad_test);
    }
    Ok(())
}

pub(crate) fn jacobian(
    info: &LocalElmtInfo,
    ctan: &[f64; 3],
    _soln: &LocalElmtSolution,
    shp: &LocalShapeFun,
    _mate_old: &MaterialsContainer,
    mate: &MaterialsContainer,
    k: &mut DMatrix<f64>,
) -> Result<(), FemError> {
    let jac = mate.rank4("jacobian")?;
    for i in 0..info.dim {
        for j in 0..info.dim {
            k[(i, j)] = jac.ik_component(i, j, &shp.grad_test, &shp.grad_trial) * ctan[0];
        }
    }
    Ok(())
}

/// Nodal-projection quantities shared by every mechanics-coupled kernel:
/// von Mises stress and hydrostatic stress, derived from the current
/// stress state.
pub(crate) fn projection(
    mate: &MaterialsContainer,
    proj: &mut ProjectionMap,
) -> Result<(), FemError> {
    let stress = mate.rank2("stress")?;
    let hydro = stress.trace() / 3.0;
    let mut dev = stress;
    for i in 0..3 {
        dev.add_to(i, i, -hydro);
    }
    let von_mises = (1.5 * dev.double_dot(&dev)).sqrt();
    proj.insert("vonMises".to_string(), von_mises);
    proj.insert("hydrostatic".to_string(), hydro);
    Ok(())
}
