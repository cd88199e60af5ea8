//! Strongly connected components and the acyclic condensed graph.

use std::collections::BTreeSet;

/// One strongly connected component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// The Tarjan root of the component; used as the component's identity
    /// and ordering key in the condensed graph.
    pub proxy: usize,
    /// All node ids forming the component. Order is deterministic for a
    /// fixed edge order.
    pub nodes: Vec<usize>,
}

/// Result of condensing a graph: components, a node→component map, and the
/// acyclic component graph keyed by proxies.
#[derive(Debug)]
pub struct Condensation {
    pub components: Vec<Component>,
    /// `node_component[id]` is the index into `components` of the component
    /// containing `id`.
    pub node_component: Vec<usize>,
    /// `component_edges[proxy]` is the sorted set of successor-component
    /// proxies. Entries at non-proxy indices are empty. Guaranteed acyclic;
    /// a component never has an edge to itself.
    pub component_edges: Vec<BTreeSet<usize>>,
}

impl Condensation {
    /// Proxy of the component containing `id`.
    pub fn proxy_of(&self, id: usize) -> usize {
        self.components[self.node_component[id]].proxy
    }

    /// The component identified by `proxy`.
    pub fn component_at_proxy(&self, proxy: usize) -> &Component {
        &self.components[self.node_component[proxy]]
    }
}

const UNVISITED: usize = usize::MAX;

/// Tarjan's algorithm, iterative so that deep graphs cannot overflow the
/// call stack.
pub fn condense(n: usize, edges: &[BTreeSet<usize>]) -> Condensation {
    // Successor lists materialized once so DFS frames can hold a plain
    // position instead of a set iterator.
    let succs: Vec<Vec<usize>> = edges.iter().map(|s| s.iter().copied().collect()).collect();

    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut next_index = 0usize;

    let mut components: Vec<Component> = Vec::new();
    let mut node_component = vec![UNVISITED; n];

    // DFS frames: (node, next successor position).
    let mut frames: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        frames.push((root, 0));
        while let Some(frame) = frames.last_mut() {
            let v = frame.0;
            if frame.1 == 0 {
                index[v] = next_index;
                lowlink[v] = next_index;
                next_index += 1;
                stack.push(v);
                on_stack[v] = true;
            }
            if let Some(&w) = succs[v].get(frame.1) {
                frame.1 += 1;
                if index[w] == UNVISITED {
                    frames.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
            } else {
                frames.pop();
                if let Some(&(parent, _)) = frames.last() {
                    lowlink[parent] = lowlink[parent].min(lowlink[v]);
                }
                if lowlink[v] == index[v] {
                    let mut nodes = Vec::new();
                    while let Some(w) = stack.pop() {
                        on_stack[w] = false;
                        node_component[w] = components.len();
                        nodes.push(w);
                        if w == v {
                            break;
                        }
                    }
                    components.push(Component { proxy: v, nodes });
                }
            }
        }
    }

    let mut component_edges: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
    for u in 0..n {
        let pu = components[node_component[u]].proxy;
        for &w in &edges[u] {
            let pw = components[node_component[w]].proxy;
            if pu != pw {
                component_edges[pu].insert(pw);
            }
        }
    }

    Condensation {
        components,
        node_component,
        component_edges,
    }
}
