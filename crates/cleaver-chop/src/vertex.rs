use std::collections::BTreeMap;
use std::fmt;

use cleaver_ir::ast::{Field, Function, Method, Predicate, Type};

/// A node of the dependency graph.
///
/// Members decompose into a *definition* vertex and a *use* vertex: the
/// definition carries everything needed to verify the member itself, the use
/// vertex only the signature/contract surface callers depend on. For
/// functions and fields the two coincide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Vertex {
    /// Method with full body and contract.
    Method(String),
    /// Method contract only (pre/postconditions, no body).
    MethodSpec(String),
    Function(String),
    /// Predicate signature only.
    PredicateSig(String),
    /// Predicate signature plus body.
    PredicateBody(String),
    Field(String),
    /// A domain applied to concrete type arguments.
    DomainType {
        domain: String,
        type_args: BTreeMap<String, Type>,
    },
    /// A single function declared in a domain.
    DomainFunction(String),
    /// A single axiom, identified together with its owning domain.
    DomainAxiom { domain: String, axiom: String },
    /// Sentinel: any vertex reachable from it is included in every part.
    Always,
}

/// Definition vertex of a method. A bodiless method has nothing beyond its
/// contract, so its definition is the spec vertex itself.
pub fn method_def(method: &Method) -> Vertex {
    if method.body.is_some() {
        Vertex::Method(method.name.clone())
    } else {
        Vertex::MethodSpec(method.name.clone())
    }
}

/// Use vertex of a method: callers only ever pull the contract.
pub fn method_use(method: &Method) -> Vertex {
    Vertex::MethodSpec(method.name.clone())
}

/// Definition vertex of a predicate. An abstract predicate has no body, so
/// its definition is the signature vertex itself.
pub fn predicate_def(predicate: &Predicate) -> Vertex {
    if predicate.body.is_some() {
        Vertex::PredicateBody(predicate.name.clone())
    } else {
        Vertex::PredicateSig(predicate.name.clone())
    }
}

pub fn predicate_use(predicate: &Predicate) -> Vertex {
    Vertex::PredicateSig(predicate.name.clone())
}

/// Functions are not split: the body is needed wherever the function is
/// applied, so definition and use coincide.
pub fn function_vertex(function: &Function) -> Vertex {
    Vertex::Function(function.name.clone())
}

pub fn field_vertex(field: &Field) -> Vertex {
    Vertex::Field(field.name.clone())
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vertex::Method(n) => write!(f, "method {n}"),
            Vertex::MethodSpec(n) => write!(f, "method-spec {n}"),
            Vertex::Function(n) => write!(f, "function {n}"),
            Vertex::PredicateSig(n) => write!(f, "predicate-sig {n}"),
            Vertex::PredicateBody(n) => write!(f, "predicate-body {n}"),
            Vertex::Field(n) => write!(f, "field {n}"),
            Vertex::DomainType { domain, type_args } => {
                write!(f, "domain-type {domain}")?;
                if !type_args.is_empty() {
                    write!(f, "[")?;
                    for (i, t) in type_args.values().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{t}")?;
                    }
                    write!(f, "]")?;
                }
                Ok(())
            }
            Vertex::DomainFunction(n) => write!(f, "domain-function {n}"),
            Vertex::DomainAxiom { domain, axiom } => write!(f, "axiom {domain}.{axiom}"),
            Vertex::Always => write!(f, "always"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleaver_ir::ast::Stmt;

    fn method(name: &str, body: Option<Stmt>) -> Method {
        Method {
            name: name.into(),
            formal_args: vec![],
            formal_returns: vec![],
            pres: vec![],
            posts: vec![],
            body,
        }
    }

    fn predicate(name: &str, body: Option<cleaver_ir::ast::Exp>) -> Predicate {
        Predicate {
            name: name.into(),
            formal_args: vec![],
            body,
        }
    }

    #[test]
    fn method_with_body_splits_into_def_and_spec() {
        let m = method("m", Some(Stmt::skip()));
        assert_eq!(method_def(&m), Vertex::Method("m".into()));
        assert_eq!(method_use(&m), Vertex::MethodSpec("m".into()));
    }

    #[test]
    fn bodiless_method_is_its_own_spec() {
        let m = method("m", None);
        assert_eq!(method_def(&m), Vertex::MethodSpec("m".into()));
        assert_eq!(method_def(&m), method_use(&m));
    }

    #[test]
    fn predicate_with_body_splits_into_body_and_sig() {
        let p = predicate("P", Some(cleaver_ir::ast::Exp::BoolLit(true)));
        assert_eq!(predicate_def(&p), Vertex::PredicateBody("P".into()));
        assert_eq!(predicate_use(&p), Vertex::PredicateSig("P".into()));
    }

    #[test]
    fn abstract_predicate_is_its_own_sig() {
        let p = predicate("P", None);
        assert_eq!(predicate_def(&p), Vertex::PredicateSig("P".into()));
        assert_eq!(predicate_def(&p), predicate_use(&p));
    }
}
