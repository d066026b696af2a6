//! Residual/Jacobian consistency of every kernel.
//!
//! Each kernel's Jacobian block is compared against a central finite
//! difference of its residual, with the material state recomputed from
//! the perturbed solution the way a constitutive model would. Rate dofs
//! follow the perturbation with `dv/du = ctan[1]/ctan[0]`, matching how
//! a first-order time integrator couples them.

use fennec::error::FemError;
use fennec::kernels::{CalcType, DofRole, ElmtKernel};
use fennec::local::{LocalElmtInfo, LocalElmtSolution, LocalShapeFun};
use fennec::materials::MaterialsContainer;
use fennec::tensor::{Rank2Tensor, Rank4Tensor};
use matrixcompare::assert_scalar_eq;
use nalgebra::{DMatrix, DVector, Vector3};

const CTAN: [f64; 3] = [1.0, 3.7, 0.0];
const STEP: f64 = 1.0e-6;
const LAMBDA: f64 = 121.15;
const MU: f64 = 80.77;

fn info_for(kernel: ElmtKernel, dim: usize) -> LocalElmtInfo {
    let n = kernel.dofs_per_node(dim);
    LocalElmtInfo {
        dim,
        n_nodes: 4,
        dofs_per_node: n,
        n_dofs: 4 * n,
        t: 1.0,
        dt: 0.1,
        coords: Vector3::new(0.3, 0.4, 0.0),
        coords_current: Vector3::new(0.3, 0.4, 0.0),
        elmt_id: 0,
        qp_id: 0,
    }
}

fn base_solution(n: usize) -> LocalElmtSolution {
    let mut soln = LocalElmtSolution::zeros(n);
    for j in 0..n {
        let x = j as f64;
        soln.u[j] = 0.31 + 0.07 * x;
        soln.u_old[j] = 0.25 + 0.05 * x;
        soln.u_older[j] = 0.21 + 0.04 * x;
        soln.v[j] = 0.12 - 0.03 * x;
        soln.grad_u[j] = Vector3::new(0.42 + 0.11 * x, -0.27 + 0.06 * x, 0.0);
        soln.grad_u_old[j] = Vector3::new(0.38 + 0.09 * x, -0.22 + 0.05 * x, 0.0);
        soln.grad_v[j] = Vector3::new(0.05 - 0.02 * x, 0.08 + 0.01 * x, 0.0);
        soln.grad_u_current[j] = soln.grad_u[j];
    }
    soln
}

fn shape_pair() -> LocalShapeFun {
    let grad_test = Vector3::new(0.61, -0.23, 0.0);
    let grad_trial = Vector3::new(-0.34, 0.52, 0.0);
    LocalShapeFun {
        test: 0.31,
        trial: 0.47,
        grad_test,
        grad_trial,
        grad_test_current: grad_test,
        grad_trial_current: grad_trial,
    }
}

/// Perturbs local dof `q` by `h` the way the trial node's nodal value
/// moving by `h` would.
fn perturbed(soln: &LocalElmtSolution, shp: &LocalShapeFun, q: usize, h: f64) -> LocalElmtSolution {
    let mut out = soln.clone();
    out.u[q] += shp.trial * h;
    out.v[q] += CTAN[1] * shp.trial * h;
    out.grad_u[q] += shp.grad_trial * h;
    out.grad_v[q] += CTAN[1] * shp.grad_trial * h;
    out.grad_u_current[q] = out.grad_u[q];
    out
}

/// Checks `K = dR/du` for one kernel against central differences, with
/// materials recomputed from each perturbed state.
fn assert_jacobian_consistent<F>(kernel: ElmtKernel, dim: usize, materials: F)
where
    F: Fn(&LocalElmtSolution) -> MaterialsContainer,
{
    let info = info_for(kernel, dim);
    let n = info.dofs_per_node;
    let soln = base_solution(n);
    let shp = shape_pair();
    let mate_old = MaterialsContainer::new();

    let mut k = DMatrix::zeros(n, n);
    kernel
        .compute_jacobian(&info, &CTAN, &soln, &shp, &mate_old, &materials(&soln), &mut k)
        .unwrap();

    for q in 0..n {
        let plus = perturbed(&soln, &shp, q, STEP);
        let minus = perturbed(&soln, &shp, q, -STEP);
        let mut r_plus = DVector::zeros(n);
        let mut r_minus = DVector::zeros(n);
        kernel
            .compute_residual(&info, &plus, &shp, &mate_old, &materials(&plus), &mut r_plus)
            .unwrap();
        kernel
            .compute_residual(&info, &minus, &shp, &mate_old, &materials(&minus), &mut r_minus)
            .unwrap();
        for p in 0..n {
            let fd = (r_plus[p] - r_minus[p]) / (2.0 * STEP);
            assert!(
                (fd - k[(p, q)]).abs() <= 1e-5 * (1.0 + k[(p, q)].abs()),
                "{kernel:?}: K({p}, {q}) = {} but finite difference gives {fd}",
                k[(p, q)]
            );
        }
    }
}

/// Small-strain tensor from the displacement gradients starting at local
/// dof slot `off`.
fn strain(soln: &LocalElmtSolution, off: usize, dim: usize) -> Rank2Tensor {
    let mut eps = Rank2Tensor::zeros();
    for i in 0..dim {
        for j in 0..dim {
            eps.set(
                i,
                j,
                0.5 * (soln.grad_u[off + i][j] + soln.grad_u[off + j][i]),
            );
        }
    }
    eps
}

fn elastic_stress(eps: &Rank2Tensor) -> Rank2Tensor {
    Rank4Tensor::isotropic(LAMBDA, MU).contract2(eps)
}

/// Undegraded strain energy and its strain derivative, standing in for a
/// history field in the fracture kernels.
fn strain_energy(eps: &Rank2Tensor) -> f64 {
    0.5 * LAMBDA * eps.trace() * eps.trace() + MU * eps.double_dot(eps)
}

/// Off-diagonal-free constant coupling tensor for eigenstrain terms.
fn eigenstrain_tangent() -> Rank2Tensor {
    let mut s = Rank2Tensor::identity() * -0.9;
    s.set(0, 1, 0.2);
    s.set(1, 0, 0.2);
    s
}

#[test]
fn laplace_jacobian_matches_finite_difference() {
    assert_jacobian_consistent(ElmtKernel::Laplace, 2, |soln| {
        let u = soln.u[0];
        let mut mate = MaterialsContainer::new();
        mate.set_scalar("sigma", 1.0 + u * u);
        mate.set_scalar("dsigmadu", 2.0 * u);
        mate
    });
}

#[test]
fn poisson_jacobian_matches_finite_difference() {
    assert_jacobian_consistent(ElmtKernel::Poisson, 2, |soln| {
        let u = soln.u[0];
        let mut mate = MaterialsContainer::new();
        mate.set_scalar("sigma", 1.0 + u * u);
        mate.set_scalar("dsigmadu", 2.0 * u);
        mate.set_scalar("f", u * u * u);
        mate.set_scalar("dfdu", 3.0 * u * u);
        mate
    });
}

#[test]
fn diffusion_jacobian_matches_finite_difference() {
    assert_jacobian_consistent(ElmtKernel::Diffusion, 2, |soln| {
        let c = soln.u[0];
        let mut mate = MaterialsContainer::new();
        mate.set_scalar("D", 1.0 + c * c);
        mate.set_scalar("dDdc", 2.0 * c);
        mate
    });
}

#[test]
fn thermal_jacobian_matches_finite_difference() {
    assert_jacobian_consistent(ElmtKernel::Thermal, 2, |soln| {
        let t = soln.u[0];
        let mut mate = MaterialsContainer::new();
        mate.set_scalar("rho", 2.0);
        mate.set_scalar("Cp", 1.5);
        mate.set_scalar("K", 2.0 + t * t);
        mate.set_scalar("dKdT", 2.0 * t);
        mate.set_scalar("Q", t * t * t);
        mate.set_scalar("dQdT", 3.0 * t * t);
        mate
    });
}

#[test]
fn wave_jacobian_matches_finite_difference() {
    assert_jacobian_consistent(ElmtKernel::Wave, 2, |soln| {
        // f depends on both split fields: v = u[0], u = u[1].
        let (v, u) = (soln.u[0], soln.u[1]);
        let mut mate = MaterialsContainer::new();
        mate.set_scalar("C", 1.3);
        mate.set_scalar("f", u * u + 2.0 * v);
        mate.set_scalar("dfdu", 2.0 * u);
        mate.set_scalar("dfdv", 2.0);
        mate
    });
}

#[test]
fn allen_cahn_jacobian_matches_finite_difference() {
    assert_jacobian_consistent(ElmtKernel::AllenCahn, 2, |soln| {
        let eta = soln.u[0];
        let mut mate = MaterialsContainer::new();
        mate.set_scalar("L", 1.8);
        mate.set_scalar("eps", 0.6);
        mate.set_scalar("dFdeta", eta * eta * eta - eta);
        mate.set_scalar("d2Fdeta2", 3.0 * eta * eta - 1.0);
        mate
    });
}

#[test]
fn cahn_hilliard_jacobian_matches_finite_difference() {
    assert_jacobian_consistent(ElmtKernel::CahnHilliard, 2, |soln| {
        let c = soln.u[0];
        let mut mate = MaterialsContainer::new();
        mate.set_scalar("M", 1.0 + c * c);
        mate.set_scalar("dMdC", 2.0 * c);
        mate.set_scalar("dFdC", c * c * c - c);
        mate.set_scalar("d2FdC2", 3.0 * c * c - 1.0);
        mate.set_scalar("kappa", 0.02);
        mate
    });
}

#[test]
fn mechanics_jacobian_matches_finite_difference() {
    assert_jacobian_consistent(ElmtKernel::Mechanics, 2, |soln| {
        let eps = strain(soln, 0, 2);
        let mut mate = MaterialsContainer::new();
        mate.set_rank2("stress", elastic_stress(&eps));
        mate.set_rank4("jacobian", Rank4Tensor::isotropic(LAMBDA, MU));
        mate
    });
}

fn fracture_materials(soln: &LocalElmtSolution, mobility: Option<f64>) -> MaterialsContainer {
    let d = soln.u[0];
    let g = (1.0 - d) * (1.0 - d);
    let dg = 2.0 * (d - 1.0);
    let eps = strain(soln, 1, 2);
    let stress0 = elastic_stress(&eps);

    let mut mate = MaterialsContainer::new();
    if let Some(l) = mobility {
        mate.set_scalar("L", l);
    } else {
        mate.set_scalar("viscosity", 0.1);
    }
    mate.set_scalar("Gc", 2.7e-3);
    mate.set_scalar("eps", 0.05);
    mate.set_scalar("H", strain_energy(&eps));
    mate.set_scalar("dFdD", 0.7 * d);
    mate.set_scalar("d2FdD2", 0.7);
    mate.set_rank2("stress", stress0 * g);
    mate.set_rank2("dstressdD", stress0 * dg);
    mate.set_rank2("dHdstrain", stress0);
    mate.set_rank4("jacobian", Rank4Tensor::isotropic(LAMBDA, MU) * g);
    mate.set_boolean("finite-strain", false);
    mate
}

#[test]
fn miehe_fracture_jacobian_matches_finite_difference() {
    assert_jacobian_consistent(ElmtKernel::MieheFracture, 2, |soln| {
        fracture_materials(soln, None)
    });
}

#[test]
fn allen_cahn_fracture_jacobian_matches_finite_difference() {
    assert_jacobian_consistent(ElmtKernel::AllenCahnFracture, 2, |soln| {
        fracture_materials(soln, Some(1.8))
    });
}

#[test]
fn stress_diffusion_jacobian_matches_finite_difference() {
    assert_jacobian_consistent(ElmtKernel::StressDiffusion, 2, |soln| {
        let c = soln.u[0];
        let eps = strain(soln, 1, 2);
        let mut mate = MaterialsContainer::new();
        mate.set_scalar("D", 1.4);
        mate.set_scalar("Omega", 0.8);
        mate.set_scalar("SigmaH", 2.1);
        mate.set_rank2("stress", elastic_stress(&eps) + eigenstrain_tangent() * c);
        mate.set_rank2("dstressdc", eigenstrain_tangent());
        mate.set_rank4("jacobian", Rank4Tensor::isotropic(LAMBDA, MU));
        mate
    });
}

#[test]
fn stress_cahn_hilliard_jacobian_matches_finite_difference() {
    assert_jacobian_consistent(ElmtKernel::StressCahnHilliard, 2, |soln| {
        let c = soln.u[0];
        let eps = strain(soln, 2, 2);
        let coupling = eigenstrain_tangent();
        let mut mate = MaterialsContainer::new();
        mate.set_scalar("M", 1.0 + c * c);
        mate.set_scalar("dMdC", 2.0 * c);
        mate.set_scalar("dFdC", c * c * c - c + coupling.double_dot(&eps));
        mate.set_scalar("d2FdC2", 3.0 * c * c - 1.0);
        mate.set_scalar("kappa", 0.02);
        mate.set_rank2("d2FdCdStrain", coupling);
        mate.set_rank2("stress", elastic_stress(&eps) + coupling * c);
        mate.set_rank2("dstressdc", coupling);
        mate.set_rank4("jacobian", Rank4Tensor::isotropic(LAMBDA, MU));
        mate
    });
}

#[test]
fn diffusion_fracture_jacobian_matches_finite_difference() {
    assert_jacobian_consistent(ElmtKernel::DiffusionFracture, 2, |soln| {
        let c = soln.u[0];
        let d = soln.u[1];
        let g = (1.0 - d) * (1.0 - d);
        let dg = 2.0 * (d - 1.0);
        let eps = strain(soln, 2, 2);
        let stress0 = elastic_stress(&eps);
        let mut mate = MaterialsContainer::new();
        mate.set_scalar("D", 1.4);
        mate.set_scalar("Omega", 0.8);
        mate.set_scalar("SigmaH", 2.1);
        mate.set_scalar("L", 1.8);
        mate.set_scalar("Gc", 2.7e-3);
        mate.set_scalar("eps", 0.05);
        mate.set_scalar("H", strain_energy(&eps));
        mate.set_scalar("dFdD", 0.7 * d);
        mate.set_scalar("d2FdD2", 0.7);
        mate.set_rank2("stress", stress0 * g + eigenstrain_tangent() * c);
        mate.set_rank2("dstressdc", eigenstrain_tangent());
        mate.set_rank2("dstressdD", stress0 * dg);
        mate.set_rank2("dHdstrain", stress0);
        mate.set_rank4("jacobian", Rank4Tensor::isotropic(LAMBDA, MU) * g);
        mate.set_boolean("finite-strain", false);
        mate
    });
}

#[test]
fn kobayashi_jacobian_matches_finite_difference() {
    // Anisotropy functions linear in the order-parameter gradient, so
    // their chain-rule vectors are constant.
    let a = Vector3::new(0.9, 0.3, 0.0);
    let b = Vector3::new(-0.4, 0.7, 0.0);
    assert_jacobian_consistent(ElmtKernel::Kobayashi, 2, move |soln| {
        let eta = soln.u[0];
        let temp = soln.u[1];
        let grad_eta = soln.grad_u[0];
        let mut mate = MaterialsContainer::new();
        mate.set_scalar("L", 3.0);
        mate.set_scalar("K", a.dot(&grad_eta));
        mate.set_scalar("dK", b.dot(&grad_eta));
        mate.set_scalar("dFdeta", eta * eta * eta - eta + 0.5 * temp);
        mate.set_scalar("d2Fdeta2", 3.0 * eta * eta - 1.0);
        mate.set_scalar("d2FdetadT", 0.5);
        mate.set_scalar("Latent-heat", 1.8);
        mate.set_vector("dKdGradEta", a);
        mate.set_vector("ddKdGradEta", b);
        mate
    });
}

#[test]
fn kobayashi_rejects_three_dimensional_elements() {
    let kernel = ElmtKernel::Kobayashi;
    let info = info_for(kernel, 3);
    let soln = base_solution(2);
    let shp = shape_pair();
    let mate = MaterialsContainer::new();
    let mut r = DVector::zeros(2);
    match kernel.compute_residual(&info, &soln, &shp, &mate, &mate, &mut r) {
        Err(FemError::Configuration(msg)) => assert!(msg.contains("2-d")),
        other => panic!("expected a configuration error, got {other:?}"),
    }
}

#[test]
fn conduction_residual_is_conductivity_times_gradients() {
    // sigma = 2, grad u = grad N = e_x: the weak form contributes
    // exactly sigma.
    let kernel = ElmtKernel::Laplace;
    let info = info_for(kernel, 2);
    let mut soln = LocalElmtSolution::zeros(1);
    soln.grad_u[0] = Vector3::new(1.0, 0.0, 0.0);
    let shp = LocalShapeFun {
        test: 1.0,
        trial: 1.0,
        grad_test: Vector3::new(1.0, 0.0, 0.0),
        grad_trial: Vector3::new(1.0, 0.0, 0.0),
        grad_test_current: Vector3::new(1.0, 0.0, 0.0),
        grad_trial_current: Vector3::new(1.0, 0.0, 0.0),
    };
    let mut mate = MaterialsContainer::new();
    mate.set_scalar("sigma", 2.0);
    let mate_old = MaterialsContainer::new();
    let mut r = DVector::zeros(1);
    kernel
        .compute_residual(&info, &soln, &shp, &mate_old, &mate, &mut r)
        .unwrap();
    assert_scalar_eq!(r[0], 2.0, comp = abs, tol = 1e-14);
}

#[test]
fn dof_roles_order_damage_before_displacements() {
    assert_eq!(
        ElmtKernel::MieheFracture.dof_roles(2),
        vec![DofRole::Damage, DofRole::DispX, DofRole::DispY]
    );
    assert_eq!(
        ElmtKernel::Mechanics.dof_roles(3),
        vec![DofRole::DispX, DofRole::DispY, DofRole::DispZ]
    );
    assert_eq!(ElmtKernel::Wave.dofs_per_node(2), 2);
}

#[test]
fn mismatched_dof_count_is_rejected() {
    let kernel = ElmtKernel::CahnHilliard;
    let mut info = info_for(kernel, 2);
    info.dofs_per_node = 3;
    let soln = base_solution(3);
    let shp = shape_pair();
    let mate = MaterialsContainer::new();
    let mut k = DMatrix::zeros(3, 3);
    let mut r = DVector::zeros(3);
    match kernel.compute_all(
        CalcType::ResidualAndJacobian,
        &info,
        &CTAN,
        &soln,
        &shp,
        &mate,
        &mate,
        &mut k,
        &mut r,
    ) {
        Err(FemError::DofMismatch { expected, got }) => assert_eq!((expected, got), (2, 3)),
        other => panic!("expected DofMismatch, got {other:?}"),
    }
}

#[test]
fn mechanics_projection_reports_stress_measures() {
    let kernel = ElmtKernel::Mechanics;
    let info = info_for(kernel, 2);
    let soln = base_solution(2);
    let shp = shape_pair();
    let mut stress = Rank2Tensor::zeros();
    stress.set(0, 0, 3.0);
    let mut mate = MaterialsContainer::new();
    mate.set_rank2("stress", stress);
    let mate_old = MaterialsContainer::new();
    let mut proj = fennec::kernels::ProjectionMap::default();
    kernel
        .compute_projection(&info, &soln, &shp, &mate_old, &mate, &mut proj)
        .unwrap();
    assert_scalar_eq!(proj["vonMises"], 3.0, comp = abs, tol = 1e-12);
    assert_scalar_eq!(proj["hydrostatic"], 1.0, comp = abs, tol = 1e-12);
}
