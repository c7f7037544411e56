//! Dependency graph with topological ordering and cycle detection.
//!
//! Used for the spread ("inlines") relation between types and for the
//! required-field reference relation. Node and edge iteration follows
//! insertion order, so results are deterministic for a given input.

use std::collections::{HashMap, HashSet, VecDeque};

/// Error type for cycle detection.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleError {
    /// The cycles detected in the graph. Each path ends with its first node.
    pub cycles: Vec<Vec<String>>,
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Circular dependencies detected: ")?;
        for (i, cycle) in self.cycles.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", cycle.join(" -> "))?;
        }
        Ok(())
    }
}

impl std::error::Error for CycleError {}

/// Directed graph where an edge `a -> b` means "a depends on b".
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Nodes in insertion order
    nodes: Vec<String>,

    /// Node name -> position in `nodes`
    index: HashMap<String, usize>,

    /// Node name -> ordered, de-duplicated dependencies
    dependencies: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Adding an existing node is a no-op.
    pub fn add_node(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.index.contains_key(&name) {
            return;
        }
        self.index.insert(name.clone(), self.nodes.len());
        self.dependencies.insert(name.clone(), Vec::new());
        self.nodes.push(name);
    }

    /// Record that `from` depends on `to`. Both nodes are added if missing.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let from = from.into();
        let to = to.into();
        self.add_node(from.clone());
        self.add_node(to.clone());
        if let Some(deps) = self.dependencies.get_mut(&from) {
            if !deps.contains(&to) {
                deps.push(to);
            }
        }
    }

    /// Check whether a node exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dependencies of a node, in insertion order.
    pub fn dependencies(&self, name: &str) -> &[String] {
        self.dependencies.get(name).map_or(&[], |d| d.as_slice())
    }

    /// Topological sort using Kahn's algorithm.
    ///
    /// Returns node names with dependencies before dependents. Ties are
    /// broken by insertion order.
    pub fn topological_order(&self) -> Result<Vec<String>, CycleError> {
        // in_degree[X] = number of nodes X still waits for
        let mut in_degree: Vec<usize> = self
            .nodes
            .iter()
            .map(|n| self.dependencies(n).len())
            .collect();

        // dependents[Y] = nodes that depend on Y, in insertion order
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            for dep in self.dependencies(node) {
                if let Some(&j) = self.index.get(dep) {
                    dependents[j].push(i);
                }
            }
        }

        let mut queue: VecDeque<usize> = (0..self.nodes.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();

        let mut result = Vec::with_capacity(self.nodes.len());
        while let Some(i) = queue.pop_front() {
            result.push(self.nodes[i].clone());
            for &d in &dependents[i] {
                in_degree[d] -= 1;
                if in_degree[d] == 0 {
                    queue.push_back(d);
                }
            }
        }

        // If we didn't process all nodes, there's a cycle
        if result.len() != self.nodes.len() {
            return Err(CycleError {
                cycles: self.detect_cycles(),
            });
        }

        Ok(result)
    }

    /// Detect cycles.
    ///
    /// Returns each cycle as a path that starts and ends on the same node.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut path = Vec::new();

        for name in &self.nodes {
            if !visited.contains(name) {
                self.dfs_cycles(name, &mut visited, &mut rec_stack, &mut path, &mut cycles);
            }
        }

        cycles
    }

    /// DFS helper for cycle detection.
    fn dfs_cycles(
        &self,
        node: &String,
        visited: &mut HashSet<String>,
        rec_stack: &mut HashSet<String>,
        path: &mut Vec<String>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        visited.insert(node.clone());
        rec_stack.insert(node.clone());
        path.push(node.clone());

        for dep in self.dependencies(node) {
            if !visited.contains(dep) {
                self.dfs_cycles(dep, visited, rec_stack, path, cycles);
            } else if rec_stack.contains(dep) {
                // Found a cycle - extract it from the path
                if let Some(start_idx) = path.iter().position(|n| n == dep) {
                    let mut cycle: Vec<String> = path[start_idx..].to_vec();
                    cycle.push(dep.clone()); // Complete the cycle
                    cycles.push(cycle);
                }
            }
        }

        path.pop();
        rec_stack.remove(node);
    }
}
