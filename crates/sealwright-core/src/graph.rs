//! Key dependency graph with DFS cycle detection and topological ordering

use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Directed graph of key name -> key names it depends on
///
/// Nodes keep insertion order so that cycle paths and evaluation orders are
/// deterministic for a given sequence of edges.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<String>,
    edges: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node with no edges
    pub fn add_node(&mut self, key: &str) {
        if !self.edges.contains_key(key) {
            self.nodes.push(key.to_string());
            self.edges.insert(key.to_string(), Vec::new());
        }
    }

    /// Record that `key` depends on `depends_on`
    pub fn add_dependency(&mut self, key: &str, depends_on: &str) {
        self.add_node(key);
        self.add_node(depends_on);
        if let Some(deps) = self.edges.get_mut(key) {
            if !deps.iter().any(|d| d == depends_on) {
                deps.push(depends_on.to_string());
            }
        }
    }

    /// Record several dependencies of `key` at once
    pub fn add_dependencies<S: AsRef<str>>(&mut self, key: &str, depends_on: &[S]) {
        self.add_node(key);
        for dep in depends_on {
            self.add_dependency(key, dep.as_ref());
        }
    }

    pub fn dependencies(&self, key: &str) -> &[String] {
        self.edges.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find the first cycle reachable in node order
    ///
    /// The returned path starts and ends with the same key, e.g.
    /// `["a", "b", "a"]`; a self-loop is `["a", "a"]`.
    pub fn detect_cycle(&self) -> Option<Vec<String>> {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();
        let mut on_stack = HashSet::new();

        for node in &self.nodes {
            if visited.contains(node.as_str()) {
                continue;
            }
            if let Some(cycle) = self.find_cycle(node, &mut visited, &mut stack, &mut on_stack) {
                return Some(cycle);
            }
        }
        None
    }

    fn find_cycle<'a>(
        &'a self,
        node: &'a str,
        visited: &mut HashSet<&'a str>,
        stack: &mut Vec<&'a str>,
        on_stack: &mut HashSet<&'a str>,
    ) -> Option<Vec<String>> {
        visited.insert(node);
        stack.push(node);
        on_stack.insert(node);

        for dep in self.dependencies(node) {
            if on_stack.contains(dep.as_str()) {
                let start = stack.iter().position(|n| *n == dep.as_str()).unwrap_or(0);
                let mut path: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
                path.push(dep.clone());
                return Some(path);
            }
            if !visited.contains(dep.as_str()) {
                if let Some(cycle) = self.find_cycle(dep, visited, stack, on_stack) {
                    return Some(cycle);
                }
            }
        }

        stack.pop();
        on_stack.remove(node);
        None
    }

    /// Order all nodes so that every key comes after its dependencies
    pub fn topological_sort(&self) -> Result<Vec<String>> {
        if let Some(path) = self.detect_cycle() {
            return Err(Error::Cycle { path });
        }

        let mut resolved = Vec::with_capacity(self.nodes.len());
        let mut seen = HashSet::new();
        for node in &self.nodes {
            self.visit(node, &mut resolved, &mut seen);
        }
        Ok(resolved)
    }

    /// Post-order DFS; only called on an acyclic graph
    fn visit<'a>(&'a self, key: &'a str, resolved: &mut Vec<String>, seen: &mut HashSet<&'a str>) {
        if !seen.insert(key) {
            return;
        }
        for dep in self.dependencies(key) {
            self.visit(dep, resolved, seen);
        }
        resolved.push(key.to_string());
    }
}
