//! Dependency graph and load ordering for script files.
//!
//! Nodes are [`ScriptPath`]s, edges point from a dependent file to the file it
//! declares with `using`. Node indices follow the order in which files were
//! added, which is the order they were discovered, and edges follow declaration
//! order. Both orders feed the tie-breaking rules below, so the same inputs
//! always produce the same load order.
//!
//! # Ordering
//!
//! [`DependencyGraph::build_order`] never fails:
//!
//! 1. Strongly connected components are computed with
//!    [`petgraph::algo::kosaraju_scc`]. Every component with more than one
//!    member, or with a self-loop, is a cycle.
//! 2. A depth-first postorder walk over the condensed graph emits dependencies
//!    before dependents. Walks start from files in discovery order and follow
//!    dependencies in declaration order.
//! 3. The members of a component are emitted together, in discovery order.
//!
//! Files outside a cycle are therefore ordered exactly as if the cycle did not
//! exist.
//!
//! Every walk keeps an explicit stack, so graph depth is bounded by memory
//! rather than by the thread's stack size.

use anyhow::Result;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::core::ScriptDepsError;
use crate::utils::paths::ScriptPath;

/// Color states for cycle path search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is on the current DFS path.
    Gray,
    /// Node has been fully visited.
    Black,
}

/// A set of files that depend on each other in a loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyCycle {
    /// One loop through the component, starting and ending at its earliest
    /// discovered member.
    pub path: Vec<ScriptPath>,
    /// Every file in the component, in discovery order.
    pub members: Vec<ScriptPath>,
}

impl DependencyCycle {
    /// Whether `path` is part of this cycle.
    #[must_use]
    pub fn contains(&self, path: &ScriptPath) -> bool {
        self.members.contains(path)
    }
}

impl fmt::Display for DependencyCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain = self.path.iter().map(ToString::to_string).collect::<Vec<_>>().join(" → ");
        f.write_str(&chain)
    }
}

/// Directed graph of script files.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// The underlying directed graph.
    graph: DiGraph<ScriptPath, ()>,
    /// Map from paths to their graph indices.
    node_map: HashMap<ScriptPath, NodeIndex>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Add a file if it is not in the graph yet.
    ///
    /// The first call for a path fixes its position in discovery order.
    pub fn add_node(&mut self, path: ScriptPath) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&path) {
            index
        } else {
            let index = self.graph.add_node(path.clone());
            self.node_map.insert(path, index);
            index
        }
    }

    /// Record that `from` depends on `to`, meaning `to` must load first.
    ///
    /// Repeated edges are ignored.
    pub fn add_dependency(&mut self, from: ScriptPath, to: ScriptPath) {
        let from_idx = self.add_node(from);
        let to_idx = self.add_node(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Whether the graph contains `path`.
    #[must_use]
    pub fn contains(&self, path: &ScriptPath) -> bool {
        self.node_map.contains_key(path)
    }

    /// Direct dependencies of `index` in declaration order.
    ///
    /// petgraph walks adjacency lists newest-first, so edges are re-sorted by
    /// their insertion index.
    fn ordered_neighbors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self.graph.edges(index).map(|e| (e.id(), e.target())).collect();
        edges.sort_by_key(|(id, _)| id.index());
        edges.into_iter().map(|(_, target)| target).collect()
    }

    /// Strongly connected components, each sorted by discovery order, plus a
    /// lookup from node to component.
    fn components(&self) -> (Vec<Vec<NodeIndex>>, HashMap<NodeIndex, usize>) {
        let mut components = kosaraju_scc(&self.graph);
        for component in &mut components {
            component.sort();
        }

        let mut component_of = HashMap::new();
        for (id, component) in components.iter().enumerate() {
            for &node in component {
                component_of.insert(node, id);
            }
        }

        (components, component_of)
    }

    fn is_cyclic_component(&self, component: &[NodeIndex]) -> bool {
        component.len() > 1
            || component.first().is_some_and(|&node| self.graph.contains_edge(node, node))
    }

    /// Find every cycle in the graph.
    ///
    /// Cycles are returned in the discovery order of their earliest member.
    #[must_use]
    pub fn detect_cycles(&self) -> Vec<DependencyCycle> {
        let (components, _) = self.components();

        let mut cycles: Vec<(NodeIndex, DependencyCycle)> = components
            .iter()
            .filter(|component| self.is_cyclic_component(component))
            .filter_map(|component| {
                let start = *component.first()?;
                let members: HashSet<NodeIndex> = component.iter().copied().collect();
                let path = self.cycle_path(start, &members)?;
                Some((
                    start,
                    DependencyCycle {
                        path: path.into_iter().map(|idx| self.graph[idx].clone()).collect(),
                        members: component.iter().map(|&idx| self.graph[idx].clone()).collect(),
                    },
                ))
            })
            .collect();

        cycles.sort_by_key(|(start, _)| *start);
        cycles.into_iter().map(|(_, cycle)| cycle).collect()
    }

    /// Walk from `start` inside `members` until an edge leads back to `start`.
    fn cycle_path(&self, start: NodeIndex, members: &HashSet<NodeIndex>) -> Option<Vec<NodeIndex>> {
        let mut colors: HashMap<NodeIndex, Color> =
            members.iter().map(|&node| (node, Color::White)).collect();

        // (node, its in-cycle neighbors, index of the next one to try)
        let mut stack = vec![(start, self.member_neighbors(start, members), 0usize)];
        colors.insert(start, Color::Gray);

        while let Some((node, neighbors, next)) = stack.last_mut() {
            let Some(&neighbor) = neighbors.get(*next) else {
                colors.insert(*node, Color::Black);
                stack.pop();
                continue;
            };
            *next += 1;

            if neighbor == start {
                let mut cycle: Vec<NodeIndex> = stack.iter().map(|(node, _, _)| *node).collect();
                cycle.push(start);
                return Some(cycle);
            }
            if colors.get(&neighbor) == Some(&Color::White) {
                colors.insert(neighbor, Color::Gray);
                stack.push((neighbor, self.member_neighbors(neighbor, members), 0));
            }
        }

        None
    }

    fn member_neighbors(&self, node: NodeIndex, members: &HashSet<NodeIndex>) -> Vec<NodeIndex> {
        self.ordered_neighbors(node).into_iter().filter(|n| members.contains(n)).collect()
    }

    /// Load order with dependencies first. Cyclic files fall back to discovery
    /// order among themselves.
    #[must_use]
    pub fn build_order(&self) -> Vec<ScriptPath> {
        let (components, component_of) = self.components();

        // Dependencies of each component, in member order then declaration order.
        let component_deps: Vec<Vec<usize>> = components
            .iter()
            .enumerate()
            .map(|(id, component)| {
                let mut deps = Vec::new();
                for &member in component {
                    for neighbor in self.ordered_neighbors(member) {
                        let target = component_of[&neighbor];
                        if target != id && !deps.contains(&target) {
                            deps.push(target);
                        }
                    }
                }
                deps
            })
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        let mut done = vec![false; components.len()];
        let mut entered = vec![false; components.len()];

        for node in self.graph.node_indices() {
            let root = component_of[&node];
            if entered[root] {
                continue;
            }

            // (component, index of the next dependency to visit)
            let mut stack = vec![(root, 0usize)];
            entered[root] = true;

            while let Some((current, next)) = stack.pop() {
                if let Some(&dep) = component_deps[current].get(next) {
                    stack.push((current, next + 1));
                    if !entered[dep] {
                        entered[dep] = true;
                        stack.push((dep, 0));
                    }
                } else if !done[current] {
                    done[current] = true;
                    order.extend(components[current].iter().map(|&idx| self.graph[idx].clone()));
                }
            }
        }

        order
    }

    /// Load order that refuses cycles.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptDepsError::CyclicDependency`] describing the first cycle.
    pub fn topological_order(&self) -> Result<Vec<ScriptPath>> {
        if let Some(cycle) = self.detect_cycles().into_iter().next() {
            return Err(ScriptDepsError::CyclicDependency {
                chain: cycle.to_string(),
            }
            .into());
        }
        Ok(self.build_order())
    }

    /// Direct dependencies of a file in declaration order.
    #[must_use]
    pub fn get_direct_deps(&self, path: &ScriptPath) -> Vec<ScriptPath> {
        self.node_map.get(path).map_or_else(Vec::new, |&idx| {
            self.ordered_neighbors(idx).into_iter().map(|n| self.graph[n].clone()).collect()
        })
    }

    /// Check if the graph is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Get the total number of files in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the total number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All files in discovery order.
    #[must_use]
    pub fn nodes(&self) -> Vec<ScriptPath> {
        self.graph.node_indices().map(|idx| self.graph[idx].clone()).collect()
    }

    /// Render the dependencies of `root` as an indented tree.
    ///
    /// A file that appears a second time is marked `(already listed)` instead
    /// of being expanded again.
    #[must_use]
    pub fn to_tree_string(&self, root: &ScriptPath) -> String {
        let mut result = String::new();
        let mut visited = HashSet::new();

        // (file, prefix inherited from its parent, whether it is the last sibling)
        let mut stack = vec![(root.clone(), String::new(), true)];
        while let Some((node, prefix, is_last)) = stack.pop() {
            let (connector, child_prefix) = if is_last {
                ("└── ", format!("{prefix}    "))
            } else {
                ("├── ", format!("{prefix}│   "))
            };
            result.push_str(&format!("{prefix}{connector}{node}\n"));

            if !visited.insert(node.clone()) {
                result.push_str(&format!("{child_prefix}└── (already listed)\n"));
                continue;
            }

            let deps = self.get_direct_deps(&node);
            let last = deps.len().saturating_sub(1);
            for (i, dep) in deps.into_iter().enumerate().rev() {
                stack.push((dep, child_prefix.clone(), i == last));
            }
        }

        result
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
