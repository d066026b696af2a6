//! Error taxonomy for configuration and evaluation failures.
//!
//! Every error in this crate is fatal to its assembly pass: an incomplete
//! assembly is never meaningful, so there is no recovery, retry or degraded
//! mode. Errors carry enough context to name the offending block, material
//! or index. Defect classes — tensor indices outside `0..3`, singular
//! inverses, zero divisors — panic instead of returning an error.

use std::error::Error;
use std::fmt;

/// The class of a named material property stored in a
/// [`MaterialsContainer`](crate::materials::MaterialsContainer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialClass {
    Boolean,
    Scalar,
    Vector,
    Rank2,
    Rank4,
}

impl fmt::Display for MaterialClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MaterialClass::Boolean => "boolean",
            MaterialClass::Scalar => "scalar",
            MaterialClass::Vector => "vector",
            MaterialClass::Rank2 => "rank-2",
            MaterialClass::Rank4 => "rank-4",
        };
        write!(f, "{label}")
    }
}

/// Errors produced by kernel evaluation, dispatch and boundary condition
/// application.
#[derive(Debug, Clone, PartialEq)]
pub enum FemError {
    /// A configured block references an unknown type tag, an unregistered
    /// user slot, or carries a malformed parameter. Detected during setup
    /// validation wherever possible.
    Configuration(String),
    /// A kernel requested a named material property that the constitutive
    /// module never populated for the active element type.
    UndefinedMaterial {
        name: String,
        class: MaterialClass,
    },
    /// The dof count reported by the element info does not match the
    /// kernel's declared dof ordering.
    DofMismatch { expected: usize, got: usize },
    /// A boundary condition addressed a value component outside the valid
    /// range.
    InvalidComponent { component: usize, max: usize },
}

impl fmt::Display for FemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FemError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            FemError::UndefinedMaterial { name, class } => write!(
                f,
                "undefined material: no {class} property named '{name}' \
                 was populated by the material module"
            ),
            FemError::DofMismatch { expected, got } => write!(
                f,
                "dof mismatch: kernel expects {expected} dofs per node, \
                 element reports {got}"
            ),
            FemError::InvalidComponent { component, max } => write!(
                f,
                "invalid component index {component}, must be in 0..{max}"
            ),
        }
    }
}

impl Error for FemError {}

impl FemError {
    pub fn undefined_material(name: &str, class: MaterialClass) -> Self {
        FemError::UndefinedMaterial {
            name: name.to_string(),
            class,
        }
    }
}
