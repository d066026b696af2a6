//! Finite-element residual and Jacobian evaluation for coupled
//! multiphysics problems.
//!
//! The crate is organized around a library of weak-form element kernels
//! ([`kernels`]), the registry binding kernels to mesh domains
//! ([`registry`]), the bulk assembly loop producing a global residual and
//! sparse Jacobian ([`assembly`]), and penalty/surface-load boundary
//! condition application ([`bc`]). Supporting modules provide the rank-2
//! and rank-4 tensor algebra constitutive models exchange with the
//! kernels ([`tensor`]), the per-quadrature-point data contracts
//! ([`local`], [`materials`]) and reference shape functions for testing
//! ([`shape`]).

pub mod assembly;
pub mod bc;
pub mod error;
pub mod kernels;
pub mod local;
pub mod materials;
pub mod registry;
pub mod shape;
pub mod tensor;

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;
