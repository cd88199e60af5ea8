#![doc = include_str!("../README.md")]

//! Cleaver intermediate representation.
//!
//! This crate defines the verification-language AST the chopper partitions:
//! programs, their top-level members, and the expression/statement/type
//! grammar, plus concrete-syntax rendering.

pub mod ast;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_generators;
