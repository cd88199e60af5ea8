//! Proptest strategies for generating well-formed [`Program`] instances.

use proptest::prelude::*;

use crate::ast::*;

fn ref_arg() -> LocalVar {
    LocalVar::new("x", Type::Ref)
}

fn field_acc(field: &str) -> Exp {
    Exp::Acc {
        loc: Box::new(Exp::FieldAccess {
            receiver: Box::new(Exp::Local(ref_arg())),
            field: field.into(),
            typ: Type::Int,
        }),
        perm: None,
    }
}

/// Strategy for a well-formed [`Program`] suitable for property testing.
///
/// Generated programs have:
/// - 1–4 integer fields
/// - 0–3 predicates, each with a body holding one field permission
/// - 1–6 methods, each reading one field and optionally calling another
///   method and/or folding one predicate
///
/// Every call, fold, and field access resolves to a declaration in the same
/// program, so the dependency graph is always closed. Call targets may form
/// cycles.
pub fn arb_program() -> impl Strategy<Value = Program> {
    (1..=4usize, 0..=3usize, 1..=6usize)
        .prop_flat_map(|(nfields, npreds, nmethods)| {
            // Per-method structure: (field read, callee, folded predicate)
            let method_strategy = proptest::collection::vec(
                (
                    0..nfields,
                    proptest::option::of(0..nmethods),
                    if npreds > 0 {
                        proptest::option::of(0..npreds).boxed()
                    } else {
                        Just(None::<usize>).boxed()
                    },
                ),
                nmethods..=nmethods,
            );
            // Per-predicate structure: which field the body holds
            let pred_strategy = proptest::collection::vec(0..nfields, npreds..=npreds);

            (Just(nfields), pred_strategy, method_strategy)
        })
        .prop_map(|(nfields, pred_fields, method_info)| {
            let mut program = Program::new(ProgramMeta {
                source_name: "generated.vpr".into(),
                span: Span::new(0, 0),
                info: None,
            });

            for i in 0..nfields {
                program.add_field(Field {
                    name: format!("f{i}"),
                    typ: Type::Int,
                });
            }

            for (i, &field) in pred_fields.iter().enumerate() {
                program.add_predicate(Predicate {
                    name: format!("P{i}"),
                    formal_args: vec![ref_arg()],
                    body: Some(field_acc(&format!("f{field}"))),
                });
            }

            for (i, &(field, callee, folded)) in method_info.iter().enumerate() {
                let mut stmts = vec![Stmt::Inhale(field_acc(&format!("f{field}")))];
                if let Some(j) = callee {
                    stmts.push(Stmt::Call {
                        method: format!("m{j}"),
                        args: vec![Exp::Local(ref_arg())],
                        targets: vec![],
                    });
                }
                if let Some(p) = folded {
                    stmts.push(Stmt::Fold {
                        predicate: format!("P{p}"),
                        args: vec![Exp::Local(ref_arg())],
                    });
                }
                program.add_method(Method {
                    name: format!("m{i}"),
                    formal_args: vec![ref_arg()],
                    formal_returns: vec![],
                    pres: vec![],
                    posts: vec![],
                    body: Some(Stmt::Block {
                        decls: vec![],
                        stmts,
                    }),
                });
            }

            program
        })
}
