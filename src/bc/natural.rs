//! Surface load evaluation for natural boundary conditions.

use nalgebra::Vector3;

use crate::bc::BcKind;
use crate::error::FemError;

/// The local load block of one load condition at one quadrature point
/// for one test node: the per-slot values `t_slot * N_test`.
///
/// Neumann yields a single scalar slot; pressure and traction yield one
/// slot per traction component, to be bound to the displacement dofs in
/// order.
pub fn natural_traction(
    kind: &BcKind,
    normal: &Vector3<f64>,
    test: f64,
) -> Result<Vec<f64>, FemError> {
    match kind {
        BcKind::Neumann { flux } => Ok(vec![flux * test]),
        BcKind::Pressure { pressure } => Ok(vec![
            pressure * normal[0] * test,
            pressure * normal[1] * test,
            pressure * normal[2] * test,
        ]),
        BcKind::Traction { traction } => Ok(vec![
            traction[0] * test,
            traction[1] * test,
            traction[2] * test,
        ]),
        BcKind::Dirichlet { .. } => Err(FemError::Configuration(
            "Dirichlet conditions carry no surface load".to_string(),
        )),
    }
}
