//! Fixed-size rank-2 ($3 \times 3$) and rank-4 ($3 \times 3 \times 3 \times 3$)
//! tensor algebra for constitutive models and element kernels.
//!
//! Tensors are always three-dimensional: for 2-D problems the third row and
//! column are zero-filled, so kernels never branch on dimension when doing
//! tensor arithmetic. All component access is 0-based and bounds-checked;
//! an index outside `0..3` is a defect and panics.
//!
//! The many named index-permutation ("outer") products of classical
//! continuum-mechanics codes are expressed through a single primitive,
//! [`Rank2Tensor::outer_permuted`], parameterized by an [`IndexPerm`].
//! The handful of products the kernels actually use also have named
//! wrappers (`otimes`, `ik_jl`, `il_jk`).

mod rank2;
mod rank4;

pub use rank2::Rank2Tensor;
pub use rank4::Rank4Tensor;

/// Assignment of the output indices $(i, j, k, l)$ of a rank-4 outer product
/// to the two rank-2 factors.
///
/// `a` gives the output index positions (0 = $i$, 1 = $j$, 2 = $k$, 3 = $l$)
/// that form the first factor's row and column index; `b` does the same for
/// the second factor. The four positions must together be a permutation of
/// `0..4`. For example `IndexPerm::IK_JL` produces
/// $T_{ijkl} = A_{ik} \, B_{jl}$.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexPerm {
    a: (usize, usize),
    b: (usize, usize),
}

impl IndexPerm {
    /// $T_{ijkl} = A_{ij} B_{kl}$, the plain dyadic (outer) product.
    pub const IJ_KL: IndexPerm = IndexPerm {
        a: (0, 1),
        b: (2, 3),
    };
    /// $T_{ijkl} = A_{ik} B_{jl}$.
    pub const IK_JL: IndexPerm = IndexPerm {
        a: (0, 2),
        b: (1, 3),
    };
    /// $T_{ijkl} = A_{il} B_{jk}$.
    pub const IL_JK: IndexPerm = IndexPerm {
        a: (0, 3),
        b: (1, 2),
    };
    /// $T_{ijkl} = A_{ik} B_{lj}$.
    pub const IK_LJ: IndexPerm = IndexPerm {
        a: (0, 2),
        b: (3, 1),
    };
    /// $T_{ijkl} = A_{il} B_{kj}$.
    pub const IL_KJ: IndexPerm = IndexPerm {
        a: (0, 3),
        b: (2, 1),
    };
    /// $T_{ijkl} = A_{jk} B_{il}$.
    pub const JK_IL: IndexPerm = IndexPerm {
        a: (1, 2),
        b: (0, 3),
    };
    /// $T_{ijkl} = A_{jl} B_{ik}$.
    pub const JL_IK: IndexPerm = IndexPerm {
        a: (1, 3),
        b: (0, 2),
    };
    /// $T_{ijkl} = A_{kl} B_{ij}$.
    pub const KL_IJ: IndexPerm = IndexPerm {
        a: (2, 3),
        b: (0, 1),
    };

    /// General constructor for any of the 24 valid assignments.
    ///
    /// # Panics
    ///
    /// Panics if the four positions are not a permutation of `0..4`.
    pub fn new(a: (usize, usize), b: (usize, usize)) -> Self {
        let mut seen = [false; 4];
        for pos in [a.0, a.1, b.0, b.1] {
            assert!(pos < 4, "index position {pos} out of range 0..4");
            assert!(
                !seen[pos],
                "index position {pos} used twice in outer-product permutation"
            );
            seen[pos] = true;
        }
        IndexPerm { a, b }
    }

    #[inline]
    pub(crate) fn factor_indices(&self, out: [usize; 4]) -> ((usize, usize), (usize, usize)) {
        (
            (out[self.a.0], out[self.a.1]),
            (out[self.b.0], out[self.b.1]),
        )
    }
}
