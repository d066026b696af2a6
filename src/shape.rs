//! A reference [`ShapeTable`] implementation covering the two element
//! shapes the tests integrate with: bilinear quadrilaterals (2 x 2 Gauss)
//! for the bulk and two-node line segments (2-point Gauss) for
//! boundaries. Production meshes bring their own shape tables through the
//! same trait.

use itertools::iproduct;
use nalgebra::{Matrix2, Vector2, Vector3};

use crate::assembly::{QuadraturePoint, ShapeTable};
use crate::error::FemError;

const GAUSS_1D: [f64; 2] = [-0.577_350_269_189_625_8, 0.577_350_269_189_625_8];

/// Shape functions for the built-in reference elements, dispatched on the
/// element's node count: 2 nodes is a line segment, 4 a quadrilateral.
#[derive(Debug, Clone, Default)]
pub struct ReferenceShapeTable;

impl ShapeTable for ReferenceShapeTable {
    fn evaluate(&self, nodes: &[Vector3<f64>]) -> Result<Vec<QuadraturePoint>, FemError> {
        match nodes.len() {
            2 => line2(nodes),
            4 => quad4(nodes),
            n => Err(FemError::Configuration(format!(
                "no reference shape functions for a {n}-node element"
            ))),
        }
    }
}

/// Bilinear quadrilateral on `[-1, 1]^2` with nodes ordered
/// counter-clockwise from `(-1, -1)`.
fn quad4(nodes: &[Vector3<f64>]) -> Result<Vec<QuadraturePoint>, FemError> {
    const XI: [f64; 4] = [-1.0, 1.0, 1.0, -1.0];
    const ETA: [f64; 4] = [-1.0, -1.0, 1.0, 1.0];

    let mut points = Vec::with_capacity(4);
    for (&eta, &xi) in iproduct!(&GAUSS_1D, &GAUSS_1D) {
        let mut shape = Vec::with_capacity(4);
        let mut dref = Vec::with_capacity(4);
        for i in 0..4 {
            shape.push(0.25 * (1.0 + XI[i] * xi) * (1.0 + ETA[i] * eta));
            dref.push(Vector2::new(
                0.25 * XI[i] * (1.0 + ETA[i] * eta),
                0.25 * ETA[i] * (1.0 + XI[i] * xi),
            ));
        }

        // Reference-to-physical map Jacobian, row a = d x / d xi_a.
        let mut jac = Matrix2::zeros();
        for i in 0..4 {
            for a in 0..2 {
                for b in 0..2 {
                    jac[(a, b)] += dref[i][a] * nodes[i][b];
                }
            }
        }
        let detj = jac.determinant();
        if detj <= 0.0 {
            return Err(FemError::Configuration(format!(
                "degenerate quadrilateral mapping (det J = {detj:.3e})"
            )));
        }
        let jac_inv = jac.try_inverse().ok_or_else(|| {
            FemError::Configuration("degenerate quadrilateral mapping".to_string())
        })?;

        let mut grad = Vec::with_capacity(4);
        let mut coords = Vector3::zeros();
        for i in 0..4 {
            let g = jac_inv * dref[i];
            grad.push(Vector3::new(g[0], g[1], 0.0));
            coords += nodes[i] * shape[i];
        }
        points.push(QuadraturePoint {
            weight: 1.0,
            shape,
            grad,
            detj,
            coords,
        });
    }
    Ok(points)
}

/// Two-node segment with linear shape functions; gradients point along
/// the segment.
fn line2(nodes: &[Vector3<f64>]) -> Result<Vec<QuadraturePoint>, FemError> {
    let edge = nodes[1] - nodes[0];
    let length = edge.norm();
    if length <= 0.0 {
        return Err(FemError::Configuration(
            "degenerate line element with coincident nodes".to_string(),
        ));
    }
    let tangent = edge / length;
    let detj = 0.5 * length;

    let mut points = Vec::with_capacity(2);
    for &xi in &GAUSS_1D {
        let shape = vec![0.5 * (1.0 - xi), 0.5 * (1.0 + xi)];
        let grad = vec![-tangent / length, tangent / length];
        let coords = nodes[0] * shape[0] + nodes[1] * shape[1];
        points.push(QuadraturePoint {
            weight: 1.0,
            shape,
            grad,
            detj,
            coords,
        });
    }
    Ok(points)
}
