//! Dense integer indexing of the vertex graph.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use cleaver_ir::ast::{Member, Program};

use crate::error::ChopError;
use crate::extract::program_edges;
use crate::vertex::{self, Vertex};

/// Predicate selecting the members whose proof obligations the chop must
/// cover.
pub type Selector<'a> = &'a dyn Fn(&Member<'_>) -> bool;

/// Default selection: everything that carries a proof obligation, i.e.
/// methods, functions, and predicates.
pub fn default_selector(member: &Member<'_>) -> bool {
    matches!(
        member,
        Member::Method(_) | Member::Function(_) | Member::Predicate(_)
    )
}

/// The program's dependency graph with vertices interned to dense ids.
///
/// Ids are assigned in first-reference order over the deterministic member
/// walk, so the same program always produces the same index.
#[derive(Debug)]
pub struct GraphIndex {
    vertices: IndexMap<Vertex, usize>,
    /// `edges[i]` is the sorted successor set of node `i`.
    pub edges: Vec<BTreeSet<usize>>,
    /// Ids of the definition vertices of selected members. Unsorted, and may
    /// contain duplicates; consumers must not depend on either.
    pub important: Vec<usize>,
}

fn intern(
    vertices: &mut IndexMap<Vertex, usize>,
    edges: &mut Vec<BTreeSet<usize>>,
    vertex: Vertex,
) -> usize {
    let next = vertices.len();
    let id = *vertices.entry(vertex).or_insert(next);
    if id == next {
        edges.push(BTreeSet::new());
    }
    id
}

impl GraphIndex {
    /// Build the index for a program.
    ///
    /// Members matched by `isolate` (default: [`default_selector`]) seed the
    /// important-node set. Domains never carry obligations of their own and
    /// are skipped by any selector.
    pub fn build(program: &Program, isolate: Option<Selector<'_>>) -> Result<Self, ChopError> {
        let edge_list = program_edges(program)?;

        let mut vertices = IndexMap::new();
        let mut edges: Vec<BTreeSet<usize>> = Vec::new();
        for (u, v) in edge_list {
            let uid = intern(&mut vertices, &mut edges, u);
            let vid = intern(&mut vertices, &mut edges, v);
            if uid != vid {
                edges[uid].insert(vid);
            }
        }

        let selector = isolate.unwrap_or(&default_selector);
        let mut important = Vec::new();
        for member in program.members() {
            if !selector(&member) {
                continue;
            }
            let def = match member {
                Member::Method(m) => vertex::method_def(m),
                Member::Function(f) => vertex::function_vertex(f),
                Member::Predicate(p) => vertex::predicate_def(p),
                Member::Field(f) => vertex::field_vertex(f),
                Member::Domain(_) => continue,
                Member::Extension(e) => {
                    return Err(ChopError::UnsupportedMember {
                        name: e.name.clone(),
                    })
                }
            };
            important.push(intern(&mut vertices, &mut edges, def));
        }

        Ok(Self {
            vertices,
            edges,
            important,
        })
    }

    /// Number of interned vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn id(&self, vertex: &Vertex) -> Option<usize> {
        self.vertices.get(vertex).copied()
    }

    /// Inverse of the interning map.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this index.
    pub fn vertex(&self, id: usize) -> &Vertex {
        self.vertices
            .get_index(id)
            .map(|(v, _)| v)
            .unwrap_or_else(|| panic!("vertex id {id} out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleaver_ir::ast::{Exp, Field, Method, Predicate, ProgramMeta, Stmt, Type};

    fn sample_program() -> Program {
        let mut program = Program::new(ProgramMeta::default());
        program.add_field(Field {
            name: "f".into(),
            typ: Type::Int,
        });
        program.add_predicate(Predicate {
            name: "P".into(),
            formal_args: vec![],
            body: Some(Exp::BoolLit(true)),
        });
        program.add_method(Method {
            name: "m".into(),
            formal_args: vec![],
            formal_returns: vec![],
            pres: vec![],
            posts: vec![],
            body: Some(Stmt::Call {
                method: "n".into(),
                args: vec![],
                targets: vec![],
            }),
        });
        program.add_method(Method {
            name: "n".into(),
            formal_args: vec![],
            formal_returns: vec![],
            pres: vec![],
            posts: vec![],
            body: Some(Stmt::skip()),
        });
        program
    }

    #[test]
    fn ids_are_dense_and_invertible() {
        let index = GraphIndex::build(&sample_program(), None).unwrap();
        assert_eq!(index.edges.len(), index.len());
        for id in 0..index.len() {
            let v = index.vertex(id).clone();
            assert_eq!(index.id(&v), Some(id));
        }
    }

    #[test]
    fn successors_are_within_range() {
        let index = GraphIndex::build(&sample_program(), None).unwrap();
        for succs in &index.edges {
            for &s in succs {
                assert!(s < index.len());
            }
        }
    }

    #[test]
    fn default_selector_picks_obligation_members() {
        let index = GraphIndex::build(&sample_program(), None).unwrap();
        let selected: Vec<&Vertex> = index.important.iter().map(|&i| index.vertex(i)).collect();
        assert!(selected.contains(&&Vertex::PredicateBody("P".into())));
        assert!(selected.contains(&&Vertex::Method("m".into())));
        assert!(selected.contains(&&Vertex::Method("n".into())));
        assert!(!selected.contains(&&Vertex::Field("f".into())));
    }

    #[test]
    fn custom_selector_narrows_importance() {
        let only_m = |member: &Member<'_>| matches!(member, Member::Method(m) if m.name == "m");
        let index = GraphIndex::build(&sample_program(), Some(&only_m)).unwrap();
        assert_eq!(index.important.len(), 1);
        assert_eq!(
            index.vertex(index.important[0]),
            &Vertex::Method("m".into())
        );
    }

    #[test]
    fn identical_inputs_intern_identically() {
        let a = GraphIndex::build(&sample_program(), None).unwrap();
        let b = GraphIndex::build(&sample_program(), None).unwrap();
        assert_eq!(a.len(), b.len());
        for id in 0..a.len() {
            assert_eq!(a.vertex(id), b.vertex(id));
        }
        assert_eq!(a.edges, b.edges);
        assert_eq!(a.important, b.important);
    }
}
