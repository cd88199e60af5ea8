//! Penalty model: scores single vertices and candidate merges.

use std::marker::PhantomData;

use crate::vertex::Vertex;

/// Scoring used by the merger.
///
/// `price` weights a single element; `merge_penalty` scores merging two
/// sub-programs given the summed weights exclusive to each side and shared
/// between them. Lower is better; a penalty ≤ 0 marks a merge that must
/// always happen.
pub trait Penalty<T> {
    fn price(&self, t: &T) -> i64;
    fn merge_penalty(&self, left_exclusive: i64, right_exclusive: i64, shared: i64) -> i64;
}

impl<T, P: Penalty<T> + ?Sized> Penalty<T> for &P {
    fn price(&self, t: &T) -> i64 {
        (**self).price(t)
    }

    fn merge_penalty(&self, left_exclusive: i64, right_exclusive: i64, shared: i64) -> i64 {
        (**self).merge_penalty(left_exclusive, right_exclusive, shared)
    }
}

/// Per-kind vertex weights and the sharing threshold of the default scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyWeights {
    pub method: i64,
    pub method_spec: i64,
    pub function: i64,
    pub predicate_body: i64,
    pub predicate_sig: i64,
    pub field: i64,
    pub domain_type: i64,
    pub domain_function: i64,
    pub domain_axiom: i64,
    /// Shared weight at which the merge penalty gains another multiple of
    /// the exclusive weight.
    pub threshold: i64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            method: 0,
            method_spec: 0,
            function: 20,
            predicate_body: 10,
            predicate_sig: 2,
            field: 1,
            domain_type: 1,
            domain_function: 1,
            domain_axiom: 5,
            threshold: 50,
        }
    }
}

/// Default penalty: configurable per-kind weights, and a merge penalty that
/// scales the combined exclusive weight up the more the two sides share.
#[derive(Debug, Clone, Default)]
pub struct DefaultPenalty {
    pub weights: PenaltyWeights,
}

impl Penalty<Vertex> for DefaultPenalty {
    fn price(&self, vertex: &Vertex) -> i64 {
        match vertex {
            Vertex::Method(_) => self.weights.method,
            Vertex::MethodSpec(_) => self.weights.method_spec,
            Vertex::Function(_) => self.weights.function,
            Vertex::PredicateSig(_) => self.weights.predicate_sig,
            Vertex::PredicateBody(_) => self.weights.predicate_body,
            Vertex::Field(_) => self.weights.field,
            Vertex::DomainType { .. } => self.weights.domain_type,
            Vertex::DomainFunction(_) => self.weights.domain_function,
            Vertex::DomainAxiom { .. } => self.weights.domain_axiom,
            Vertex::Always => 0,
        }
    }

    fn merge_penalty(&self, left_exclusive: i64, right_exclusive: i64, shared: i64) -> i64 {
        (left_exclusive + right_exclusive) * ((self.weights.threshold + shared) / self.weights.threshold)
    }
}

/// Wrapper that forbids zero-cost merges: a penalty that would be ≤ 0 is
/// reported as 1, so no merge is ever forced.
#[derive(Debug, Clone, Default)]
pub struct Strict<P>(pub P);

impl<T, P: Penalty<T>> Penalty<T> for Strict<P> {
    fn price(&self, t: &T) -> i64 {
        self.0.price(t)
    }

    fn merge_penalty(&self, left_exclusive: i64, right_exclusive: i64, shared: i64) -> i64 {
        self.0
            .merge_penalty(left_exclusive, right_exclusive, shared)
            .max(1)
    }
}

/// Penalty over `S` obtained by mapping each element to a `T` and pricing
/// that. The merge penalty passes through unchanged.
pub struct ContravariantLift<P, F, T> {
    inner: P,
    map: F,
    _elem: PhantomData<T>,
}

pub fn contravariant_lift<S, T, P, F>(inner: P, map: F) -> ContravariantLift<P, F, T>
where
    P: Penalty<T>,
    F: Fn(&S) -> T,
{
    ContravariantLift {
        inner,
        map,
        _elem: PhantomData,
    }
}

impl<S, T, P, F> Penalty<S> for ContravariantLift<P, F, T>
where
    P: Penalty<T>,
    F: Fn(&S) -> T,
{
    fn price(&self, s: &S) -> i64 {
        self.inner.price(&(self.map)(s))
    }

    fn merge_penalty(&self, left_exclusive: i64, right_exclusive: i64, shared: i64) -> i64 {
        self.inner
            .merge_penalty(left_exclusive, right_exclusive, shared)
    }
}

/// Penalty over `S` obtained by mapping each element to a collection of `T`
/// and summing their prices; this is what lets the merger treat a condensed
/// component exactly like the vertices it stands for.
pub struct ContravariantSumLift<P, F, T> {
    inner: P,
    map: F,
    _elem: PhantomData<T>,
}

pub fn contravariant_sum_lift<S, T, P, F>(inner: P, map: F) -> ContravariantSumLift<P, F, T>
where
    P: Penalty<T>,
    F: Fn(&S) -> Vec<T>,
{
    ContravariantSumLift {
        inner,
        map,
        _elem: PhantomData,
    }
}

impl<S, T, P, F> Penalty<S> for ContravariantSumLift<P, F, T>
where
    P: Penalty<T>,
    F: Fn(&S) -> Vec<T>,
{
    fn price(&self, s: &S) -> i64 {
        (self.map)(s).iter().map(|t| self.inner.price(t)).sum()
    }

    fn merge_penalty(&self, left_exclusive: i64, right_exclusive: i64, shared: i64) -> i64 {
        self.inner
            .merge_penalty(left_exclusive, right_exclusive, shared)
    }
}
