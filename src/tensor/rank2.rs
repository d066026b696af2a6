use crate::tensor::{IndexPerm, Rank4Tensor};
use nalgebra::{Matrix3, Vector3, Vector6};
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// Tolerance below which a determinant or eigenvalue gap is treated as zero.
pub(crate) const TENSOR_TOL: f64 = 1.0e-13;

/// A dense $3 \times 3$ rank-2 tensor.
///
/// Stress, strain, deformation gradients and their derivatives are all
/// carried as `Rank2Tensor`s. The tensor is always 3-D; 2-D problems leave
/// the third row and column zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rank2Tensor {
    m: Matrix3<f64>,
}

impl Rank2Tensor {
    pub fn zeros() -> Self {
        Rank2Tensor { m: Matrix3::zeros() }
    }

    pub fn identity() -> Self {
        Rank2Tensor {
            m: Matrix3::identity(),
        }
    }

    /// Builds a tensor from three rows.
    pub fn from_rows(r0: Vector3<f64>, r1: Vector3<f64>, r2: Vector3<f64>) -> Self {
        Rank2Tensor {
            m: Matrix3::from_rows(&[r0.transpose(), r1.transpose(), r2.transpose()]),
        }
    }

    /// The dyadic product $a \otimes b$, i.e. $T_{ij} = a_i b_j$.
    pub fn from_dyad(a: &Vector3<f64>, b: &Vector3<f64>) -> Self {
        Rank2Tensor { m: a * b.transpose() }
    }

    #[inline]
    fn check_index(i: usize, j: usize) {
        assert!(
            i < 3 && j < 3,
            "rank-2 tensor index ({i}, {j}) out of range 0..3"
        );
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        Self::check_index(i, j);
        self.m[(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        Self::check_index(i, j);
        self.m[(i, j)] = value;
    }

    #[inline]
    pub fn add_to(&mut self, i: usize, j: usize, value: f64) {
        Self::check_index(i, j);
        self.m[(i, j)] += value;
    }

    /// The `i`-th row as a vector. Kernels contract stress rows against
    /// test-function gradients with this.
    pub fn row(&self, i: usize) -> Vector3<f64> {
        assert!(i < 3, "rank-2 tensor row index {i} out of range 0..3");
        self.m.row(i).transpose()
    }

    pub fn col(&self, j: usize) -> Vector3<f64> {
        assert!(j < 3, "rank-2 tensor column index {j} out of range 0..3");
        self.m.column(j).into_owned()
    }

    pub fn trace(&self) -> f64 {
        self.m.trace()
    }

    pub fn det(&self) -> f64 {
        self.m.determinant()
    }

    pub fn transpose(&self) -> Rank2Tensor {
        Rank2Tensor {
            m: self.m.transpose(),
        }
    }

    /// The symmetric part $\frac{1}{2}(A + A^T)$.
    pub fn sym(&self) -> Rank2Tensor {
        Rank2Tensor {
            m: (self.m + self.m.transpose()) * 0.5,
        }
    }

    /// The inverse tensor.
    ///
    /// # Panics
    ///
    /// Inverting a (near-)singular tensor is a defect, not a recoverable
    /// condition, and panics.
    pub fn inverse(&self) -> Rank2Tensor {
        assert!(
            self.det().abs() > TENSOR_TOL,
            "cannot invert rank-2 tensor with near-zero determinant {}",
            self.det()
        );
        let inv = self
            .m
            .try_inverse()
            .expect("inverse must exist for non-singular tensor");
        Rank2Tensor { m: inv }
    }

    /// First principal invariant $I_1 = \operatorname{tr}(A)$.
    pub fn i1(&self) -> f64 {
        self.trace()
    }

    /// Second principal invariant
    /// $I_2 = \frac{1}{2}(\operatorname{tr}^2(A) - \operatorname{tr}(A^2))$.
    pub fn i2(&self) -> f64 {
        let tr = self.trace();
        0.5 * (tr * tr - (self.m * self.m).trace())
    }

    /// Third principal invariant $I_3 = \det(A)$.
    pub fn i3(&self) -> f64 {
        self.det()
    }

    /// Double contraction $A : B = A_{ij} B_{ij}$.
    pub fn double_dot(&self, other: &Rank2Tensor) -> f64 {
        self.m.dot(&other.m)
    }

    /// Eigenvalues and eigenvectors of a symmetric tensor. The `i`-th column
    /// of the returned matrix is the eigenvector for the `i`-th eigenvalue.
    ///
    /// The decomposition assumes the tensor is symmetric; callers hand in
    /// strain-like quantities for which this holds by construction.
    pub fn sym_eigen(&self) -> (Vector3<f64>, Matrix3<f64>) {
        let eigen = self.m.symmetric_eigen();
        (eigen.eigenvalues, eigen.eigenvectors)
    }

    /// The positive part $A^+ = \sum_{\lambda_a > 0} \lambda_a \, n_a \otimes n_a$
    /// of a symmetric tensor, reconstructed from its positive eigenpairs.
    pub fn positive_part(&self) -> Rank2Tensor {
        let (eigvals, eigvecs) = self.sym_eigen();
        let mut pos = Rank2Tensor::zeros();
        for a in 0..3 {
            if eigvals[a] > 0.0 {
                let n = eigvecs.column(a).into_owned();
                pos += Rank2Tensor::from_dyad(&n, &n) * eigvals[a];
            }
        }
        pos
    }

    /// The spectral positive projection tensor
    /// $\mathbb{P}^+ = \partial A^+ / \partial A$ after Miehe & Lambrecht.
    ///
    /// With eigenpairs $(\lambda_a, n_a)$ and $M_a = n_a \otimes n_a$,
    /// $$
    /// \mathbb{P}^+ = \sum_a H(\lambda_a) \, M_a \otimes M_a
    ///   + \sum_{a \neq b} \theta_{ab} (G_{ab} + G_{ba}),
    /// $$
    /// where $G_{ab} = M_a \odot M_b$ (the `ik_jl + il_jk` symmetrized
    /// product) and $\theta_{ab} = \frac{1}{2}
    /// \frac{e(\lambda_a) - e(\lambda_b)}{\lambda_a - \lambda_b}$ for
    /// $e(\lambda) = \frac{1}{2}(|\lambda| + \lambda)$. When
    /// $|\lambda_a - \lambda_b|$ falls below `1e-13` the quotient
    /// degenerates to $\frac{1}{2} \cdot \frac{H(\lambda_a) + H(\lambda_b)}{2}$.
    ///
    /// Phase-field fracture kernels use $\mathbb{P}^+$ to split strain
    /// energy into tensile and compressive parts; it satisfies
    /// $\mathbb{P}^+ : A = A^+$ for symmetric $A$.
    pub fn positive_projection(&self) -> Rank4Tensor {
        let (eigvals, eigvecs) = self.sym_eigen();

        let mut epos = [0.0; 3];
        let mut heavi = [0.0; 3];
        for a in 0..3 {
            epos[a] = 0.5 * (eigvals[a].abs() + eigvals[a]);
            if eigvals[a] > 0.0 {
                heavi[a] = 1.0;
            }
        }

        let mut dyads = [Rank2Tensor::zeros(); 3];
        for a in 0..3 {
            let n = eigvecs.column(a).into_owned();
            dyads[a] = Rank2Tensor::from_dyad(&n, &n);
        }

        let mut proj = Rank4Tensor::zeros();
        for a in 0..3 {
            proj += dyads[a].otimes(&dyads[a]) * heavi[a];
        }

        for a in 0..3 {
            for b in 0..a {
                let g_ab = dyads[a].ik_jl(&dyads[b]) + dyads[a].il_jk(&dyads[b]);
                let g_ba = dyads[b].ik_jl(&dyads[a]) + dyads[b].il_jk(&dyads[a]);
                let theta = if (eigvals[a] - eigvals[b]).abs() <= TENSOR_TOL {
                    // No 0/0: in the coincident limit the quotient tends to
                    // the mean of the two Heaviside weights.
                    0.5 * (heavi[a] + heavi[b]) / 2.0
                } else {
                    0.5 * (epos[a] - epos[b]) / (eigvals[a] - eigvals[b])
                };
                proj += (g_ab + g_ba) * theta;
            }
        }
        proj
    }

    /// Generalized permuted outer product: builds the rank-4 tensor whose
    /// $(i,j,k,l)$ component is the product of one component of `self` and
    /// one of `other`, with the index assignment given by `perm`.
    pub fn outer_permuted(&self, other: &Rank2Tensor, perm: IndexPerm) -> Rank4Tensor {
        let mut out = Rank4Tensor::zeros();
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    for l in 0..3 {
                        let ((a0, a1), (b0, b1)) = perm.factor_indices([i, j, k, l]);
                        out.set(i, j, k, l, self.m[(a0, a1)] * other.m[(b0, b1)]);
                    }
                }
            }
        }
        out
    }

    /// $T_{ijkl} = A_{ij} B_{kl}$.
    pub fn otimes(&self, other: &Rank2Tensor) -> Rank4Tensor {
        self.outer_permuted(other, IndexPerm::IJ_KL)
    }

    /// $T_{ijkl} = A_{ik} B_{jl}$.
    pub fn ik_jl(&self, other: &Rank2Tensor) -> Rank4Tensor {
        self.outer_permuted(other, IndexPerm::IK_JL)
    }

    /// $T_{ijkl} = A_{il} B_{jk}$.
    pub fn il_jk(&self, other: &Rank2Tensor) -> Rank4Tensor {
        self.outer_permuted(other, IndexPerm::IL_JK)
    }

    /// Voigt vector $(A_{11}, A_{22}, A_{33}, A_{23}, A_{13}, A_{12})$ of a
    /// symmetric tensor.
    pub fn to_voigt(&self) -> Vector6<f64> {
        Vector6::new(
            self.m[(0, 0)],
            self.m[(1, 1)],
            self.m[(2, 2)],
            self.m[(1, 2)],
            self.m[(0, 2)],
            self.m[(0, 1)],
        )
    }

    pub fn from_voigt(v: &Vector6<f64>) -> Self {
        let mut t = Rank2Tensor::zeros();
        t.set(0, 0, v[0]);
        t.set(1, 1, v[1]);
        t.set(2, 2, v[2]);
        t.set(1, 2, v[3]);
        t.set(2, 1, v[3]);
        t.set(0, 2, v[4]);
        t.set(2, 0, v[4]);
        t.set(0, 1, v[5]);
        t.set(1, 0, v[5]);
        t
    }

    /// A view of the underlying matrix, for interop with `nalgebra` code.
    pub fn as_matrix(&self) -> &Matrix3<f64> {
        &self.m
    }
}

impl From<Matrix3<f64>> for Rank2Tensor {
    fn from(m: Matrix3<f64>) -> Self {
        Rank2Tensor { m }
    }
}

impl Add for Rank2Tensor {
    type Output = Rank2Tensor;
    fn add(self, rhs: Rank2Tensor) -> Rank2Tensor {
        Rank2Tensor { m: self.m + rhs.m }
    }
}

impl Sub for Rank2Tensor {
    type Output = Rank2Tensor;
    fn sub(self, rhs: Rank2Tensor) -> Rank2Tensor {
        Rank2Tensor { m: self.m - rhs.m }
    }
}

impl AddAssign for Rank2Tensor {
    fn add_assign(&mut self, rhs: Rank2Tensor) {
        self.m += rhs.m;
    }
}

impl SubAssign for Rank2Tensor {
    fn sub_assign(&mut self, rhs: Rank2Tensor) {
        self.m -= rhs.m;
    }
}

impl Neg for Rank2Tensor {
    type Output = Rank2Tensor;
    fn neg(self) -> Rank2Tensor {
        Rank2Tensor { m: -self.m }
    }
}

impl Mul<f64> for Rank2Tensor {
    type Output = Rank2Tensor;
    fn mul(self, rhs: f64) -> Rank2Tensor {
        Rank2Tensor { m: self.m * rhs }
    }
}

impl MulAssign<f64> for Rank2Tensor {
    fn mul_assign(&mut self, rhs: f64) {
        self.m *= rhs;
    }
}

impl Div<f64> for Rank2Tensor {
    type Output = Rank2Tensor;
    fn div(self, rhs: f64) -> Rank2Tensor {
        assert!(
            rhs.abs() > TENSOR_TOL,
            "division of rank-2 tensor by near-zero scalar {rhs}"
        );
        Rank2Tensor { m: self.m / rhs }
    }
}

/// Tensor--tensor product $(AB)_{ij} = A_{ik} B_{kj}$.
impl Mul<Rank2Tensor> for Rank2Tensor {
    type Output = Rank2Tensor;
    fn mul(self, rhs: Rank2Tensor) -> Rank2Tensor {
        Rank2Tensor { m: self.m * rhs.m }
    }
}

/// Tensor--vector product $(Av)_i = A_{ij} v_j$.
impl Mul<Vector3<f64>> for Rank2Tensor {
    type Output = Vector3<f64>;
    fn mul(self, rhs: Vector3<f64>) -> Vector3<f64> {
        self.m * rhs
    }
}
