//! Edge extraction: walks every member's subtree and emits the directed
//! dependency edges of the program graph.
//!
//! An edge `(u, v)` means: whenever `u` is included in a part, `v` must be
//! included too. The asymmetry between definition and use vertices is decided
//! here: a method's definition depends on everything its body and contract
//! touch, while its use vertex depends on the contract surface only.

use cleaver_ir::ast::{Domain, Exp, Function, LocalVar, Method, Predicate, Program, Stmt, Type};

use crate::error::ChopError;
use crate::vertex::{
    field_vertex, function_vertex, method_def, method_use, predicate_def, predicate_use, Vertex,
};

/// Emit all dependency edges of the program.
///
/// Programs containing extension members are rejected: their dependency
/// structure is opaque, and a silently incomplete graph would make the chop
/// unsound.
pub fn program_edges(program: &Program) -> Result<Vec<(Vertex, Vertex)>, ChopError> {
    if let Some(ext) = program.extensions.first() {
        return Err(ChopError::UnsupportedMember {
            name: ext.name.clone(),
        });
    }

    let mut edges = Vec::new();
    for domain in &program.domains {
        domain_edges(domain, &mut edges);
    }
    for field in &program.fields {
        edges.push((field_vertex(field), Vertex::Always));
    }
    for function in &program.functions {
        function_edges(function, &mut edges);
    }
    for predicate in &program.predicates {
        predicate_edges(predicate, &mut edges);
    }
    for method in &program.methods {
        method_edges(method, &mut edges);
    }
    Ok(edges)
}

fn method_edges(method: &Method, edges: &mut Vec<(Vertex, Vertex)>) {
    let def = method_def(method);
    let use_v = method_use(method);

    // Contract surface: what callers pull in.
    let mut spec_refs = Vec::new();
    for pre in &method.pres {
        exp_usages(pre, &mut spec_refs);
    }
    for post in &method.posts {
        exp_usages(post, &mut spec_refs);
    }
    var_usages(&method.formal_args, &mut spec_refs);
    var_usages(&method.formal_returns, &mut spec_refs);

    for r in &spec_refs {
        edges.push((def.clone(), r.clone()));
        edges.push((use_v.clone(), r.clone()));
    }

    if let Some(body) = &method.body {
        let mut body_refs = Vec::new();
        stmt_usages(body, &mut body_refs);
        for r in body_refs {
            edges.push((def.clone(), r));
        }
    }

    edges.push((def, Vertex::Always));
    edges.push((use_v, Vertex::Always));
}

fn predicate_edges(predicate: &Predicate, edges: &mut Vec<(Vertex, Vertex)>) {
    let def = predicate_def(predicate);
    let use_v = predicate_use(predicate);

    if let Some(body) = &predicate.body {
        let mut body_refs = Vec::new();
        exp_usages(body, &mut body_refs);
        for r in body_refs {
            edges.push((def.clone(), r));
        }
        // The body form subsumes the signature.
        edges.push((def.clone(), use_v.clone()));
    }

    let mut sig_refs = Vec::new();
    var_usages(&predicate.formal_args, &mut sig_refs);
    for r in sig_refs {
        edges.push((use_v.clone(), r));
    }

    edges.push((def, Vertex::Always));
    edges.push((use_v, Vertex::Always));
}

fn function_edges(function: &Function, edges: &mut Vec<(Vertex, Vertex)>) {
    let v = function_vertex(function);

    let mut refs = Vec::new();
    for pre in &function.pres {
        exp_usages(pre, &mut refs);
    }
    for post in &function.posts {
        exp_usages(post, &mut refs);
    }
    if let Some(body) = &function.body {
        exp_usages(body, &mut refs);
    }
    var_usages(&function.formal_args, &mut refs);
    type_usages(&function.typ, &mut refs);

    for r in refs {
        edges.push((v.clone(), r));
    }
    edges.push((v, Vertex::Always));
}

fn domain_edges(domain: &Domain, edges: &mut Vec<(Vertex, Vertex)>) {
    for func in &domain.functions {
        let v = Vertex::DomainFunction(func.name.clone());
        let mut refs = Vec::new();
        var_usages(&func.formal_args, &mut refs);
        type_usages(&func.typ, &mut refs);
        for r in refs {
            edges.push((v.clone(), r));
        }
    }

    for axiom in &domain.axioms {
        let v = Vertex::DomainAxiom {
            domain: domain.name.clone(),
            axiom: axiom.name.clone(),
        };
        let mut refs = Vec::new();
        exp_usages(&axiom.exp, &mut refs);
        if refs.is_empty() {
            // A reference-free axiom constrains nothing nameable, so it must
            // hold in every part: route it through the sentinel.
            edges.push((Vertex::Always, v));
        } else {
            // Any use of a referenced vertex pulls the axiom in, and the
            // axiom pulls in everything it mentions.
            for r in refs {
                edges.push((r.clone(), v.clone()));
                edges.push((v.clone(), r));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Reference collection
// ---------------------------------------------------------------------------

fn var_usages(vars: &[LocalVar], out: &mut Vec<Vertex>) {
    for v in vars {
        type_usages(&v.typ, out);
    }
}

/// Collect the domain-type instantiations a type mentions, recursing through
/// type arguments of generic types.
fn type_usages(typ: &Type, out: &mut Vec<Vertex>) {
    match typ {
        Type::Int | Type::Bool | Type::Perm | Type::Ref | Type::TypeVar(_) => {}
        Type::Seq(inner) | Type::Set(inner) => type_usages(inner, out),
        Type::Domain { name, type_args } => {
            out.push(Vertex::DomainType {
                domain: name.clone(),
                type_args: type_args.clone(),
            });
            for arg in type_args.values() {
                type_usages(arg, out);
            }
        }
    }
}

/// Collect every vertex an expression references.
fn exp_usages(exp: &Exp, out: &mut Vec<Vertex>) {
    match exp {
        Exp::IntLit(_) | Exp::BoolLit(_) | Exp::NullLit => {}
        Exp::Local(v) => type_usages(&v.typ, out),
        Exp::Unary { exp, .. } | Exp::Old(exp) => exp_usages(exp, out),
        Exp::Binary { left, right, .. } => {
            exp_usages(left, out);
            exp_usages(right, out);
        }
        Exp::Cond {
            cond,
            then_exp,
            else_exp,
        } => {
            exp_usages(cond, out);
            exp_usages(then_exp, out);
            exp_usages(else_exp, out);
        }
        Exp::FuncApp {
            function,
            args,
            typ,
        } => {
            out.push(Vertex::Function(function.clone()));
            type_usages(typ, out);
            for a in args {
                exp_usages(a, out);
            }
        }
        Exp::DomainFuncApp {
            function,
            args,
            typ,
        } => {
            out.push(Vertex::DomainFunction(function.clone()));
            type_usages(typ, out);
            for a in args {
                exp_usages(a, out);
            }
        }
        Exp::FieldAccess {
            receiver,
            field,
            typ,
        } => {
            out.push(Vertex::Field(field.clone()));
            type_usages(typ, out);
            exp_usages(receiver, out);
        }
        Exp::PredicateAccess { predicate, args } => {
            out.push(Vertex::PredicateSig(predicate.clone()));
            for a in args {
                exp_usages(a, out);
            }
        }
        Exp::Acc { loc, perm } => {
            exp_usages(loc, out);
            if let Some(p) = perm {
                exp_usages(p, out);
            }
        }
        Exp::Unfolding {
            predicate,
            args,
            body,
        } => {
            // Unfolding exposes the predicate's definition: the only place a
            // user demands the full body rather than the signature.
            out.push(Vertex::PredicateBody(predicate.clone()));
            for a in args {
                exp_usages(a, out);
            }
            exp_usages(body, out);
        }
        Exp::Forall {
            vars,
            triggers,
            body,
        } => {
            var_usages(vars, out);
            for trigger in triggers {
                for t in trigger {
                    exp_usages(t, out);
                }
            }
            exp_usages(body, out);
        }
        Exp::Exists { vars, body } => {
            var_usages(vars, out);
            exp_usages(body, out);
        }
        Exp::LetIn { var, exp, body } => {
            type_usages(&var.typ, out);
            exp_usages(exp, out);
            exp_usages(body, out);
        }
    }
}

/// Collect every vertex a statement references.
fn stmt_usages(stmt: &Stmt, out: &mut Vec<Vertex>) {
    match stmt {
        Stmt::Block { decls, stmts } => {
            var_usages(decls, out);
            for s in stmts {
                stmt_usages(s, out);
            }
        }
        Stmt::Assign { target, rhs } => {
            type_usages(&target.typ, out);
            exp_usages(rhs, out);
        }
        Stmt::FieldAssign {
            receiver,
            field,
            rhs,
        } => {
            out.push(Vertex::Field(field.clone()));
            exp_usages(receiver, out);
            exp_usages(rhs, out);
        }
        Stmt::Call {
            method,
            args,
            targets,
        } => {
            // Callers pull the contract, never the callee body.
            out.push(Vertex::MethodSpec(method.clone()));
            for a in args {
                exp_usages(a, out);
            }
            var_usages(targets, out);
        }
        Stmt::Fold { predicate, args } | Stmt::Unfold { predicate, args } => {
            out.push(Vertex::PredicateBody(predicate.clone()));
            for a in args {
                exp_usages(a, out);
            }
        }
        Stmt::Inhale(e) | Stmt::Exhale(e) | Stmt::Assert(e) | Stmt::Assume(e) => {
            exp_usages(e, out)
        }
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            exp_usages(cond, out);
            stmt_usages(then_branch, out);
            if let Some(e) = else_branch {
                stmt_usages(e, out);
            }
        }
        Stmt::While {
            cond,
            invariants,
            body,
        } => {
            exp_usages(cond, out);
            for inv in invariants {
                exp_usages(inv, out);
            }
            stmt_usages(body, out);
        }
    }
}
