#![doc = include_str!("../README.md")]

//! Cleaver program chopper.
//!
//! This crate turns a program into a dependency graph of fine-grained
//! vertices, cuts the graph into one sub-program per proof obligation root,
//! merges sub-programs under a penalty model until a size bound is met, and
//! reconstructs each surviving vertex set back into a program.

pub mod cut;
pub mod error;
pub mod extract;
pub mod graph;
pub mod merge;
pub mod penalty;
pub mod pipeline;
pub mod reconstruct;
pub mod scc;
pub mod vertex;
