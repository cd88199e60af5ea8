use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cleaver_ir::ast::{Exp, Field, LocalVar, Method, Program, ProgramMeta, Stmt, Type};

use cleaver_chop::pipeline::chop_with_defaults;

/// A program of `n` methods where method `i` calls method `i + 1` and touches
/// its own field: a long dependency chain with plenty of shared tails.
fn call_chain(n: usize) -> Program {
    let mut program = Program::new(ProgramMeta {
        source_name: "bench.vpr".into(),
        ..ProgramMeta::default()
    });
    for i in 0..n {
        program.add_field(Field {
            name: format!("f{i}"),
            typ: Type::Int,
        });
        let mut stmts = vec![Stmt::Inhale(Exp::Acc {
            loc: Box::new(Exp::FieldAccess {
                receiver: Box::new(Exp::Local(LocalVar::new("x", Type::Ref))),
                field: format!("f{i}"),
                typ: Type::Int,
            }),
            perm: None,
        })];
        if i + 1 < n {
            stmts.push(Stmt::Call {
                method: format!("m{}", i + 1),
                args: vec![Exp::Local(LocalVar::new("x", Type::Ref))],
                targets: vec![],
            });
        }
        program.add_method(Method {
            name: format!("m{i}"),
            formal_args: vec![LocalVar::new("x", Type::Ref)],
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
}

fn bench_chop_unbounded(c: &mut Criterion) {
    let program = call_chain(100);
    c.bench_function("chop_chain_100_unbounded", |b| {
        b.iter(|| chop_with_defaults(black_box(&program), None).unwrap())
    });
}

fn bench_chop_bounded(c: &mut Criterion) {
    let program = call_chain(100);
    c.bench_function("chop_chain_100_bound_8", |b| {
        b.iter(|| chop_with_defaults(black_box(&program), Some(8)).unwrap())
    });
}

criterion_group!(benches, bench_chop_unbounded, bench_chop_bounded);
criterion_main!(benches);
