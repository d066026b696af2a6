//! The string-keyed bag of constitutive outputs handed to kernels.
//!
//! The constitutive module (out of scope here) populates one
//! [`MaterialsContainer`] per quadrature point and time level; kernels read
//! named stresses, moduli and auxiliary scalars from it. An unpopulated key
//! is the core extensibility failure between the material layer and the
//! kernel layer and surfaces as
//! [`FemError::UndefinedMaterial`](crate::error::FemError).
//!
//! To catch that failure before a simulation starts rather than mid
//! assembly, every kernel declares the keys it reads as a
//! [`MaterialSchema`]; the registry validates a representative container
//! against the schema during setup.

use crate::error::{FemError, MaterialClass};
use crate::tensor::{Rank2Tensor, Rank4Tensor};
use nalgebra::Vector3;
use rustc_hash::FxHashMap;

/// Material properties at one quadrature point for one time level.
///
/// Lifetime is one point evaluation: the assembler clears and refills the
/// container for every point, and kernels only ever read from it.
#[derive(Debug, Clone, Default)]
pub struct MaterialsContainer {
    booleans: FxHashMap<String, bool>,
    scalars: FxHashMap<String, f64>,
    vectors: FxHashMap<String, Vector3<f64>>,
    rank2: FxHashMap<String, Rank2Tensor>,
    rank4: FxHashMap<String, Rank4Tensor>,
}

impl MaterialsContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all stored properties; the container can then be refilled
    /// for the next point.
    pub fn clear(&mut self) {
        self.booleans.clear();
        self.scalars.clear();
        self.vectors.clear();
        self.rank2.clear();
        self.rank4.clear();
    }

    pub fn set_boolean(&mut self, name: &str, value: bool) {
        self.booleans.insert(name.to_string(), value);
    }

    pub fn set_scalar(&mut self, name: &str, value: f64) {
        self.scalars.insert(name.to_string(), value);
    }

    pub fn set_vector(&mut self, name: &str, value: Vector3<f64>) {
        self.vectors.insert(name.to_string(), value);
    }

    pub fn set_rank2(&mut self, name: &str, value: Rank2Tensor) {
        self.rank2.insert(name.to_string(), value);
    }

    pub fn set_rank4(&mut self, name: &str, value: Rank4Tensor) {
        self.rank4.insert(name.to_string(), value);
    }

    pub fn boolean(&self, name: &str) -> Result<bool, FemError> {
        self.booleans
            .get(name)
            .copied()
            .ok_or_else(|| FemError::undefined_material(name, MaterialClass::Boolean))
    }

    pub fn scalar(&self, name: &str) -> Result<f64, FemError> {
        self.scalars
            .get(name)
            .copied()
            .ok_or_else(|| FemError::undefined_material(name, MaterialClass::Scalar))
    }

    pub fn vector(&self, name: &str) -> Result<Vector3<f64>, FemError> {
        self.vectors
            .get(name)
            .copied()
            .ok_or_else(|| FemError::undefined_material(name, MaterialClass::Vector))
    }

    pub fn rank2(&self, name: &str) -> Result<Rank2Tensor, FemError> {
        self.rank2
            .get(name)
            .copied()
            .ok_or_else(|| FemError::undefined_material(name, MaterialClass::Rank2))
    }

    pub fn rank4(&self, name: &str) -> Result<Rank4Tensor, FemError> {
        self.rank4
            .get(name)
            .copied()
            .ok_or_else(|| FemError::undefined_material(name, MaterialClass::Rank4))
    }

    pub fn n_scalars(&self) -> usize {
        self.scalars.len()
    }

    /// Checks that every key named by `schema` is populated.
    pub fn validate_schema(&self, schema: &MaterialSchema) -> Result<(), FemError> {
        for &name in schema.booleans {
            self.boolean(name)?;
        }
        for &name in schema.scalars {
            self.scalar(name)?;
        }
        for &name in schema.vectors {
            self.vector(name)?;
        }
        for &name in schema.rank2 {
            self.rank2(name)?;
        }
        for &name in schema.rank4 {
            self.rank4(name)?;
        }
        Ok(())
    }
}

/// The set of material keys a kernel reads, declared as data.
///
/// Schemas turn an unpopulated-property lookup during assembly into a
/// configuration error at setup time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialSchema {
    pub booleans: &'static [&'static str],
    pub scalars: &'static [&'static str],
    pub vectors: &'static [&'static str],
    pub rank2: &'static [&'static str],
    pub rank4: &'static [&'static str],
}
