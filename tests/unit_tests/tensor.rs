use fennec::tensor::{IndexPerm, Rank2Tensor, Rank4Tensor};
use matrixcompare::assert_scalar_eq;
use nalgebra::{Matrix3, Rotation3, Vector3};
use proptest::prelude::*;

fn small_scalar() -> impl Strategy<Value = f64> {
    -5.0..5.0f64
}

fn rank2() -> impl Strategy<Value = Rank2Tensor> {
    proptest::array::uniform9(small_scalar()).prop_map(|v| {
        let mut t = Rank2Tensor::zeros();
        for i in 0..3 {
            for j in 0..3 {
                t.set(i, j, v[i * 3 + j]);
            }
        }
        t
    })
}

fn symmetric_rank2() -> impl Strategy<Value = Rank2Tensor> {
    rank2().prop_map(|t| t.sym())
}

proptest! {
    #[test]
    fn transpose_is_involutive(t in rank2()) {
        prop_assert_eq!(t.transpose().transpose(), t);
    }

    #[test]
    fn trace_and_det_are_rotation_invariant(
        t in rank2(),
        axis in proptest::array::uniform3(-1.0..1.0f64),
        angle in -3.0..3.0f64,
    ) {
        let axis = Vector3::new(axis[0], axis[1], axis[2]);
        prop_assume!(axis.norm() > 1e-3);
        let q: Matrix3<f64> = Rotation3::from_axis_angle(
            &nalgebra::Unit::new_normalize(axis), angle).into_inner();
        let mut rotated = Rank2Tensor::zeros();
        let m = q * t.as_matrix() * q.transpose();
        for i in 0..3 {
            for j in 0..3 {
                rotated.set(i, j, m[(i, j)]);
            }
        }
        prop_assert!((rotated.i1() - t.i1()).abs() <= 1e-9 * (1.0 + t.i1().abs()));
        prop_assert!((rotated.i2() - t.i2()).abs() <= 1e-8 * (1.0 + t.i2().abs()));
        prop_assert!((rotated.i3() - t.i3()).abs() <= 1e-8 * (1.0 + t.i3().abs()));
        prop_assert!((rotated.trace() - t.trace()).abs() <= 1e-9 * (1.0 + t.trace().abs()));
        prop_assert!((rotated.det() - t.det()).abs() <= 1e-8 * (1.0 + t.det().abs()));
    }

    #[test]
    fn inverse_times_self_is_identity(t in rank2()) {
        prop_assume!(t.det().abs() > 1e-2);
        let prod = t.inverse() * t;
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                prop_assert!((prod.get(i, j) - expected).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn double_dot_matches_componentwise_sum(a in rank2(), b in rank2()) {
        let mut sum = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                sum += a.get(i, j) * b.get(i, j);
            }
        }
        prop_assert!((a.double_dot(&b) - sum).abs() <= 1e-10 * (1.0 + sum.abs()));
    }

    #[test]
    fn positive_projection_recovers_positive_part(a in symmetric_rank2()) {
        // Eigenvalue crossings make the projector ill-defined; keep the
        // spectrum separated.
        let (eigvals, _) = a.sym_eigen();
        let mut sorted = [eigvals[0], eigvals[1], eigvals[2]];
        sorted.sort_by(|x, y| x.partial_cmp(y).unwrap());
        prop_assume!(sorted[1] - sorted[0] > 1e-3 && sorted[2] - sorted[1] > 1e-3);
        prop_assume!(eigvals.iter().all(|l| l.abs() > 1e-3));

        let projected = a.positive_projection().contract2(&a);
        let positive = a.positive_part();
        for i in 0..3 {
            for j in 0..3 {
                prop_assert!((projected.get(i, j) - positive.get(i, j)).abs() < 1e-7);
            }
        }
    }

    #[test]
    fn permuted_outer_products_place_factors(a in rank2(), b in rank2()) {
        let ik_jl = a.outer_permuted(&b, IndexPerm::IK_JL);
        let il_jk = a.outer_permuted(&b, IndexPerm::IL_JK);
        let ij_kl = a.outer_permuted(&b, IndexPerm::IJ_KL);
        let jl_ik = a.outer_permuted(&b, IndexPerm::JL_IK);
        let ik_lj = a.outer_permuted(&b, IndexPerm::IK_LJ);
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    for l in 0..3 {
                        prop_assert_eq!(ik_jl.get(i, j, k, l), a.get(i, k) * b.get(j, l));
                        prop_assert_eq!(il_jk.get(i, j, k, l), a.get(i, l) * b.get(j, k));
                        prop_assert_eq!(ij_kl.get(i, j, k, l), a.get(i, j) * b.get(k, l));
                        prop_assert_eq!(jl_ik.get(i, j, k, l), a.get(j, l) * b.get(i, k));
                        prop_assert_eq!(ik_lj.get(i, j, k, l), a.get(i, k) * b.get(l, j));
                    }
                }
            }
        }
    }

    #[test]
    fn dyadic_contractions_factor_through_double_dot(
        a in rank2(), b in rank2(), x in rank2(),
    ) {
        // For C = a (x) b, C : X = a (b : X) and X : C = (X : a) b.
        let c = a.otimes(&b);
        let right = c.contract2(&x);
        let left = c.contract2_left(&x);
        let bx = b.double_dot(&x);
        let xa = x.double_dot(&a);
        for i in 0..3 {
            for j in 0..3 {
                prop_assert!((right.get(i, j) - a.get(i, j) * bx).abs() < 1e-8);
                prop_assert!((left.get(i, j) - b.get(i, j) * xa).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn symmetric_identity_symmetrizes(x in rank2()) {
        let symmetrized = Rank4Tensor::sym_identity().contract2(&x);
        let expected = x.sym();
        for i in 0..3 {
            for j in 0..3 {
                prop_assert!((symmetrized.get(i, j) - expected.get(i, j)).abs() < 1e-12);
            }
        }
    }
}

#[test]
fn isotropic_tangent_reproduces_hookes_law() {
    let (lambda, mu) = (121.15, 80.77);
    let c = Rank4Tensor::isotropic(lambda, mu);
    let eps = Rank2Tensor::from_rows(
        Vector3::new(0.01, 0.002, 0.0),
        Vector3::new(0.002, -0.003, 0.0),
        Vector3::new(0.0, 0.0, 0.0),
    );
    let stress = c.contract2(&eps);
    let tr = eps.trace();
    for i in 0..3 {
        for j in 0..3 {
            let volumetric = if i == j { lambda * tr } else { 0.0 };
            let expected = volumetric + 2.0 * mu * eps.get(i, j);
            assert_scalar_eq!(stress.get(i, j), expected, comp = abs, tol = 1e-12);
        }
    }
}

#[test]
fn positive_projection_of_definite_tensors_is_trivial() {
    // Positive definite: projector acts as the symmetric identity.
    let mut a = Rank2Tensor::zeros();
    a.set(0, 0, 2.0);
    a.set(1, 1, 3.0);
    a.set(2, 2, 5.0);
    let p = a.positive_projection();
    let reproduced = p.contract2(&a);
    for i in 0..3 {
        for j in 0..3 {
            assert_scalar_eq!(reproduced.get(i, j), a.get(i, j), comp = abs, tol = 1e-10);
        }
    }

    // Negative definite: projector annihilates.
    let neg = a * -1.0;
    let zero = neg.positive_projection().contract2(&neg);
    for i in 0..3 {
        for j in 0..3 {
            assert_scalar_eq!(zero.get(i, j), 0.0, comp = abs, tol = 1e-10);
        }
    }
}

#[test]
fn index_perm_constructor_matches_named_constant() {
    assert_eq!(IndexPerm::new((2, 3), (0, 1)), IndexPerm::KL_IJ);
}

#[test]
#[should_panic(expected = "used twice")]
fn index_perm_rejects_repeated_positions() {
    IndexPerm::new((0, 1), (1, 3));
}

#[test]
fn rank2_voigt_uses_classical_ordering() {
    let mut t = Rank2Tensor::zeros();
    t.set(0, 0, 1.0);
    t.set(1, 1, 2.0);
    t.set(2, 2, 3.0);
    t.set(1, 2, 4.0);
    t.set(2, 1, 4.0);
    t.set(0, 2, 5.0);
    t.set(2, 0, 5.0);
    t.set(0, 1, 6.0);
    t.set(1, 0, 6.0);
    let v = t.to_voigt();
    for (slot, expected) in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0].into_iter().enumerate() {
        assert_scalar_eq!(v[slot], expected, comp = abs, tol = 1e-14);
    }
    assert_eq!(Rank2Tensor::from_voigt(&v), t);
}

#[test]
fn rank4_voigt_of_isotropic_tangent_has_lame_blocks() {
    let (lambda, mu) = (1.25, 0.75);
    let v = Rank4Tensor::isotropic(lambda, mu).to_voigt();
    for row in 0..3 {
        for col in 0..3 {
            let expected = if row == col { lambda + 2.0 * mu } else { lambda };
            assert_scalar_eq!(v[(row, col)], expected, comp = abs, tol = 1e-14);
        }
    }
    for slot in 3..6 {
        assert_scalar_eq!(v[(slot, slot)], mu, comp = abs, tol = 1e-14);
    }
}

#[test]
fn rank4_identity_is_neutral_under_contraction() {
    let c = Rank4Tensor::isotropic(2.0, 0.5);
    let eye = Rank4Tensor::identity();
    assert_eq!(eye.contract4(&c), c);
    assert_eq!(c.contract4(&eye), c);
}

#[test]
#[should_panic(expected = "out of range")]
fn rank4_index_out_of_range_panics() {
    Rank4Tensor::zeros().get(0, 1, 3, 0);
}
