//! Quantified properties of the chop, checked over generated programs.

use proptest::prelude::*;

use cleaver_ir::ast::{Exp, Program, Stmt};
use cleaver_ir::proptest_generators::arb_program;

use cleaver_chop::pipeline::chop_with_defaults;

/// A part is self-contained when every name its members mention resolves
/// inside the part itself.
fn assert_closed(part: &Program) {
    for method in &part.methods {
        let Some(Stmt::Block { stmts, .. }) = &method.body else {
            continue;
        };
        for stmt in stmts {
            match stmt {
                Stmt::Call { method: callee, .. } => {
                    assert!(
                        part.find_method(callee).is_some(),
                        "part lacks callee {callee}"
                    );
                }
                Stmt::Fold { predicate, .. } | Stmt::Unfold { predicate, .. } => {
                    let p = part.find_predicate(predicate);
                    assert!(
                        p.is_some_and(|p| p.body.is_some()),
                        "part lacks the body of folded predicate {predicate}"
                    );
                }
                Stmt::Inhale(Exp::Acc { loc, .. }) => {
                    if let Exp::FieldAccess { field, .. } = loc.as_ref() {
                        assert!(part.find_field(field).is_some(), "part lacks field {field}");
                    }
                }
                _ => {}
            }
        }
    }
    for predicate in &part.predicates {
        let Some(Exp::Acc { loc, .. }) = &predicate.body else {
            continue;
        };
        if let Exp::FieldAccess { field, .. } = loc.as_ref() {
            assert!(
                part.find_field(field).is_some(),
                "part lacks field {field} of predicate {}",
                predicate.name
            );
        }
    }
}

proptest! {
    /// Every method body lands in exactly one part; every predicate body in
    /// at least one (predicate definitions may be duplicated as shared
    /// leaves of several obligations).
    #[test]
    fn coverage(program in arb_program()) {
        let result = chop_with_defaults(&program, None).unwrap();
        for method in &program.methods {
            let hits = result
                .programs
                .iter()
                .filter(|p| p.find_method(&method.name).is_some_and(|m| m.body.is_some()))
                .count();
            prop_assert_eq!(hits, 1, "method {} covered {} times", method.name, hits);
        }
        for predicate in &program.predicates {
            let hits = result
                .programs
                .iter()
                .filter(|p| p.find_predicate(&predicate.name).is_some_and(|p| p.body.is_some()))
                .count();
            prop_assert!(hits >= 1, "predicate {} never covered", predicate.name);
        }
    }

    /// Every emitted part resolves all of its own references.
    #[test]
    fn closure(program in arb_program()) {
        let result = chop_with_defaults(&program, None).unwrap();
        for part in &result.programs {
            assert_closed(part);
        }
    }

    /// A finite bound is never exceeded (forced merges can only push the
    /// count further down).
    #[test]
    fn bound_honored(program in arb_program(), bound in 1..=4usize) {
        let result = chop_with_defaults(&program, Some(bound)).unwrap();
        prop_assert!(result.programs.len() <= bound);
    }

    /// Identical inputs produce identical outputs.
    #[test]
    fn determinism(program in arb_program()) {
        let a = chop_with_defaults(&program, Some(2)).unwrap();
        let b = chop_with_defaults(&program, Some(2)).unwrap();
        prop_assert_eq!(&a.programs, &b.programs);
        prop_assert_eq!(
            a.metrics.max_number_of_parts,
            b.metrics.max_number_of_parts
        );
    }

    /// Chopping a one-part output again at bound 1 reproduces it.
    #[test]
    fn idempotence(program in arb_program()) {
        let first = chop_with_defaults(&program, Some(1)).unwrap();
        prop_assert_eq!(first.programs.len(), 1);
        let again = chop_with_defaults(&first.programs[0], Some(1)).unwrap();
        prop_assert_eq!(&again.programs[0], &first.programs[0]);
    }
}
