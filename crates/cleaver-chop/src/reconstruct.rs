//! Rebuilding a program from a vertex set.
//!
//! The inverse of vertex decomposition: a sorted set of vertices becomes a
//! program containing exactly the declarations those vertices stand for,
//! with bodies stripped wherever only the use side was selected. Original
//! declaration order and program metadata are preserved; mutually recursive
//! declarations need no special handling because the output is a flat set
//! resolved by name.

use std::collections::BTreeSet;

use cleaver_ir::ast::{Domain, Method, Predicate, Program};

use crate::error::ChopError;
use crate::vertex::Vertex;

/// Build the sub-program a vertex set denotes.
///
/// Every vertex must name a declaration present in `program`; a selection
/// that mentions an unknown member is a malformed input, not a partial
/// result.
pub fn reconstruct(program: &Program, selection: &BTreeSet<Vertex>) -> Result<Program, ChopError> {
    let mut method_full: BTreeSet<&str> = BTreeSet::new();
    let mut method_spec: BTreeSet<&str> = BTreeSet::new();
    let mut functions: BTreeSet<&str> = BTreeSet::new();
    let mut predicate_body: BTreeSet<&str> = BTreeSet::new();
    let mut predicate_sig: BTreeSet<&str> = BTreeSet::new();
    let mut fields: BTreeSet<&str> = BTreeSet::new();
    let mut domains: BTreeSet<&str> = BTreeSet::new();
    let mut domain_funcs: BTreeSet<&str> = BTreeSet::new();
    let mut axioms: BTreeSet<(&str, &str)> = BTreeSet::new();

    for vertex in selection {
        match vertex {
            Vertex::Method(name) => {
                require(program.find_method(name).is_some(), "method", name)?;
                method_full.insert(name.as_str());
            }
            Vertex::MethodSpec(name) => {
                require(program.find_method(name).is_some(), "method", name)?;
                method_spec.insert(name.as_str());
            }
            Vertex::Function(name) => {
                require(program.find_function(name).is_some(), "function", name)?;
                functions.insert(name.as_str());
            }
            Vertex::PredicateBody(name) => {
                require(program.find_predicate(name).is_some(), "predicate", name)?;
                predicate_body.insert(name.as_str());
            }
            Vertex::PredicateSig(name) => {
                require(program.find_predicate(name).is_some(), "predicate", name)?;
                predicate_sig.insert(name.as_str());
            }
            Vertex::Field(name) => {
                require(program.find_field(name).is_some(), "field", name)?;
                fields.insert(name.as_str());
            }
            Vertex::DomainType { domain, .. } => {
                require(program.find_domain(domain).is_some(), "domain", domain)?;
                domains.insert(domain.as_str());
            }
            Vertex::DomainFunction(name) => {
                let owner = program
                    .find_domain_of_function(name)
                    .ok_or_else(|| ChopError::MissingReference {
                        kind: "domain function",
                        name: name.clone(),
                    })?;
                domains.insert(owner.name.as_str());
                domain_funcs.insert(name.as_str());
            }
            Vertex::DomainAxiom { domain, axiom } => {
                require(
                    program.find_domain_of_axiom(domain, axiom).is_some(),
                    "axiom",
                    axiom,
                )?;
                domains.insert(domain.as_str());
                axioms.insert((domain.as_str(), axiom.as_str()));
            }
            Vertex::Always => {}
        }
    }

    let mut out = Program::new(program.meta.clone());

    for domain in &program.domains {
        if !domains.contains(domain.name.as_str()) {
            continue;
        }
        out.add_domain(Domain {
            name: domain.name.clone(),
            type_vars: domain.type_vars.clone(),
            functions: domain
                .functions
                .iter()
                .filter(|f| domain_funcs.contains(f.name.as_str()))
                .cloned()
                .collect(),
            axioms: domain
                .axioms
                .iter()
                .filter(|a| axioms.contains(&(domain.name.as_str(), a.name.as_str())))
                .cloned()
                .collect(),
        });
    }

    for field in &program.fields {
        if fields.contains(field.name.as_str()) {
            out.add_field(field.clone());
        }
    }

    for function in &program.functions {
        if functions.contains(function.name.as_str()) {
            out.add_function(function.clone());
        }
    }

    for predicate in &program.predicates {
        if predicate_body.contains(predicate.name.as_str()) {
            out.add_predicate(predicate.clone());
        } else if predicate_sig.contains(predicate.name.as_str()) {
            out.add_predicate(Predicate {
                name: predicate.name.clone(),
                formal_args: predicate.formal_args.clone(),
                body: None,
            });
        }
    }

    for method in &program.methods {
        if method_full.contains(method.name.as_str()) {
            out.add_method(method.clone());
        } else if method_spec.contains(method.name.as_str()) {
            out.add_method(Method {
                name: method.name.clone(),
                formal_args: method.formal_args.clone(),
                formal_returns: method.formal_returns.clone(),
                pres: method.pres.clone(),
                posts: method.posts.clone(),
                body: None,
            });
        }
    }

    Ok(out)
}

fn require(found: bool, kind: &'static str, name: &str) -> Result<(), ChopError> {
    if found {
        Ok(())
    } else {
        Err(ChopError::MissingReference {
            kind,
            name: name.to_string(),
        })
    }
}
