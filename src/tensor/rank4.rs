use crate::tensor::Rank2Tensor;
use nalgebra::{Matrix6, Vector3};
use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};

/// A dense $3 \times 3 \times 3 \times 3$ rank-4 tensor, typically a tangent
/// stiffness $\mathbb{C} = \partial \sigma / \partial \varepsilon$.
///
/// No symmetry is enforced: kernels are free to store unsymmetric tangents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rank4Tensor {
    data: [f64; 81],
}

impl Default for Rank4Tensor {
    fn default() -> Self {
        Rank4Tensor::zeros()
    }
}

#[inline]
fn flat(i: usize, j: usize, k: usize, l: usize) -> usize {
    ((i * 3 + j) * 3 + k) * 3 + l
}

impl Rank4Tensor {
    pub fn zeros() -> Self {
        Rank4Tensor { data: [0.0; 81] }
    }

    /// The identity map on rank-2 tensors, $I_{ijkl} = \delta_{ik} \delta_{jl}$.
    pub fn identity() -> Self {
        let mut t = Rank4Tensor::zeros();
        for i in 0..3 {
            for j in 0..3 {
                t.set(i, j, i, j, 1.0);
            }
        }
        t
    }

    /// The identity map on symmetric rank-2 tensors,
    /// $I^s_{ijkl} = \frac{1}{2}(\delta_{ik} \delta_{jl} + \delta_{il} \delta_{jk})$.
    pub fn sym_identity() -> Self {
        let eye = Rank2Tensor::identity();
        (eye.ik_jl(&eye) + eye.il_jk(&eye)) * 0.5
    }

    /// The isotropic elasticity tensor
    /// $\mathbb{C}_{ijkl} = \lambda \delta_{ij} \delta_{kl}
    /// + \mu (\delta_{ik} \delta_{jl} + \delta_{il} \delta_{jk})$.
    pub fn isotropic(lambda: f64, mu: f64) -> Self {
        let eye = Rank2Tensor::identity();
        eye.otimes(&eye) * lambda + (eye.ik_jl(&eye) + eye.il_jk(&eye)) * mu
    }

    #[inline]
    fn check_index(i: usize, j: usize, k: usize, l: usize) {
        assert!(
            i < 3 && j < 3 && k < 3 && l < 3,
            "rank-4 tensor index ({i}, {j}, {k}, {l}) out of range 0..3"
        );
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        Self::check_index(i, j, k, l);
        self.data[flat(i, j, k, l)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, l: usize, value: f64) {
        Self::check_index(i, j, k, l);
        self.data[flat(i, j, k, l)] = value;
    }

    #[inline]
    pub fn add_to(&mut self, i: usize, j: usize, k: usize, l: usize, value: f64) {
        Self::check_index(i, j, k, l);
        self.data[flat(i, j, k, l)] += value;
    }

    /// Double contraction with a rank-2 tensor from the right:
    /// $(\mathbb{C} : A)_{ij} = C_{ijkl} A_{kl}$.
    pub fn contract2(&self, a: &Rank2Tensor) -> Rank2Tensor {
        let mut out = Rank2Tensor::zeros();
        for i in 0..3 {
            for j in 0..3 {
                let mut sum = 0.0;
                for k in 0..3 {
                    for l in 0..3 {
                        sum += self.data[flat(i, j, k, l)] * a.get(k, l);
                    }
                }
                out.set(i, j, sum);
            }
        }
        out
    }

    /// Double contraction with a rank-2 tensor from the left:
    /// $(A : \mathbb{C})_{kl} = A_{ij} C_{ijkl}$.
    pub fn contract2_left(&self, a: &Rank2Tensor) -> Rank2Tensor {
        let mut out = Rank2Tensor::zeros();
        for k in 0..3 {
            for l in 0..3 {
                let mut sum = 0.0;
                for i in 0..3 {
                    for j in 0..3 {
                        sum += a.get(i, j) * self.data[flat(i, j, k, l)];
                    }
                }
                out.set(k, l, sum);
            }
        }
        out
    }

    /// Double contraction with another rank-4 tensor:
    /// $(\mathbb{A} : \mathbb{B})_{ijkl} = A_{ijmn} B_{mnkl}$.
    pub fn contract4(&self, b: &Rank4Tensor) -> Rank4Tensor {
        let mut out = Rank4Tensor::zeros();
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    for l in 0..3 {
                        let mut sum = 0.0;
                        for m in 0..3 {
                            for n in 0..3 {
                                sum += self.data[flat(i, j, m, n)] * b.data[flat(m, n, k, l)];
                            }
                        }
                        out.data[flat(i, j, k, l)] = sum;
                    }
                }
            }
        }
        out
    }

    /// The $(i, k)$ stiffness block contracted with test and trial function
    /// gradients:
    /// $\sum_{j,l} C_{ijkl} \, (\nabla N^{\text{test}})_j \, (\nabla N^{\text{trial}})_l$.
    ///
    /// This is the scalar every mechanics-family kernel writes into
    /// `K(u_i, u_k)`.
    pub fn ik_component(
        &self,
        i: usize,
        k: usize,
        grad_test: &Vector3<f64>,
        grad_trial: &Vector3<f64>,
    ) -> f64 {
        assert!(
            i < 3 && k < 3,
            "stiffness block index ({i}, {k}) out of range 0..3"
        );
        let mut sum = 0.0;
        for l in 0..3 {
            let mut inner = 0.0;
            for j in 0..3 {
                inner += self.data[flat(i, j, k, l)] * grad_test[j];
            }
            sum += inner * grad_trial[l];
        }
        sum
    }

    /// Voigt $6 \times 6$ matrix using the ordering
    /// $(11, 22, 33, 23, 13, 12)$.
    pub fn to_voigt(&self) -> Matrix6<f64> {
        const PAIRS: [(usize, usize); 6] = [(0, 0), (1, 1), (2, 2), (1, 2), (0, 2), (0, 1)];
        let mut out = Matrix6::zeros();
        for (row, &(i, j)) in PAIRS.iter().enumerate() {
            for (col, &(k, l)) in PAIRS.iter().enumerate() {
                out[(row, col)] = self.data[flat(i, j, k, l)];
            }
        }
        out
    }
}

impl Add for Rank4Tensor {
    type Output = Rank4Tensor;
    fn add(mut self, rhs: Rank4Tensor) -> Rank4Tensor {
        self += rhs;
        self
    }
}

impl Sub for Rank4Tensor {
    type Output = Rank4Tensor;
    fn sub(mut self, rhs: Rank4Tensor) -> Rank4Tensor {
        self -= rhs;
        self
    }
}

impl AddAssign for Rank4Tensor {
    fn add_assign(&mut self, rhs: Rank4Tensor) {
        for (a, b) in self.data.iter_mut().zip(rhs.data.iter()) {
            *a += b;
        }
    }
}

impl SubAssign for Rank4Tensor {
    fn sub_assign(&mut self, rhs: Rank4Tensor) {
        for (a, b) in self.data.iter_mut().zip(rhs.data.iter()) {
            *a -= b;
        }
    }
}

impl Mul<f64> for Rank4Tensor {
    type Output = Rank4Tensor;
    fn mul(mut self, rhs: f64) -> Rank4Tensor {
        self *= rhs;
        self
    }
}

impl MulAssign<f64> for Rank4Tensor {
    fn mul_assign(&mut self, rhs: f64) {
        for a in self.data.iter_mut() {
            *a *= rhs;
        }
    }
}
