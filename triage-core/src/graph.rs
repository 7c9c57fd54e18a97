//! Dependency graph builder and cycle detector.
//!
//! Edges run from a dependency to its dependents ("X enables Y"), the reverse
//! of how tasks list them.

use std::collections::{HashMap, HashSet};

use crate::task::{TaskId, TaskRecord};

/// Dependency -> dependents adjacency plus per-node dependent counts.
///
/// Every task of the batch is a node, even with no dependents. A dependency id
/// that is not itself a task still becomes a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// Nodes in insertion order: batch tasks first, then dangling ids.
    order: Vec<TaskId>,
    dependents: HashMap<TaskId, Vec<TaskId>>,
}

impl DependencyGraph {
    pub fn build(tasks: &[TaskRecord]) -> Self {
        let mut graph = Self::default();
        for task in tasks {
            graph.ensure_node(task.id);
        }
        for task in tasks {
            for &dep in &task.dependencies {
                graph.ensure_node(dep);
                if let Some(list) = graph.dependents.get_mut(&dep) {
                    list.push(task.id);
                }
            }
        }
        graph
    }

    fn ensure_node(&mut self, id: TaskId) {
        if !self.dependents.contains_key(&id) {
            self.order.push(id);
            self.dependents.insert(id, Vec::new());
        }
    }

    pub fn nodes(&self) -> &[TaskId] {
        &self.order
    }

    /// Tasks that list `id` as a dependency, in batch order.
    pub fn dependents_of(&self, id: TaskId) -> &[TaskId] {
        self.dependents.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dependent_count(&self, id: TaskId) -> usize {
        self.dependents_of(id).len()
    }

    /// Largest dependent count over all nodes, dangling ones included.
    pub fn max_dependents(&self) -> usize {
        self.dependents.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Every node that lies on at least one cycle.
    ///
    /// Depth-first search with an explicit frame stack. When an edge reaches a
    /// node that is still on the current path, every node on the path is
    /// marked. O(V + E); self-edges close the path immediately.
    ///
    /// Nodes pushed after a mark are unvisited, so the marked nodes on the path
    /// are always a prefix of it. Marking walks down from the top and stops at
    /// the first node already marked.
    pub fn find_cycles(&self) -> HashSet<TaskId> {
        let mut visited: HashSet<TaskId> = HashSet::new();
        let mut on_path: HashSet<TaskId> = HashSet::new();
        let mut cycle_nodes: HashSet<TaskId> = HashSet::new();

        // (node, index of the next dependent to visit)
        let mut path: Vec<(TaskId, usize)> = Vec::new();

        for &root in &self.order {
            if visited.contains(&root) {
                continue;
            }
            visited.insert(root);
            on_path.insert(root);
            path.push((root, 0));

            while let Some(&(node, next)) = path.last() {
                match self.dependents_of(node).get(next) {
                    Some(&neighbor) => {
                        if let Some(top) = path.last_mut() {
                            top.1 += 1;
                        }
                        if !visited.contains(&neighbor) {
                            visited.insert(neighbor);
                            on_path.insert(neighbor);
                            path.push((neighbor, 0));
                        } else if on_path.contains(&neighbor) {
                            for &(id, _) in path.iter().rev() {
                                if !cycle_nodes.insert(id) {
                                    break;
                                }
                            }
                        }
                    }
                    None => {
                        path.pop();
                        on_path.remove(&node);
                    }
                }
            }
        }

        cycle_nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: TaskId, deps: &[TaskId]) -> TaskRecord {
        TaskRecord::new(id, format!("task {id}")).with_dependencies(deps.iter().copied())
    }

    #[test]
    fn test_reverse_edges_and_counts() {
        let g = DependencyGraph::build(&[task(1, &[]), task(2, &[1]), task(3, &[1, 2])]);
        assert_eq!(g.nodes(), &[1, 2, 3]);
        assert_eq!(g.dependents_of(1), &[2, 3]);
        assert_eq!(g.dependents_of(2), &[3]);
        assert_eq!(g.dependent_count(3), 0);
        assert_eq!(g.max_dependents(), 2);
    }

    #[test]
    fn test_dangling_dependency_becomes_node() {
        let g = DependencyGraph::build(&[task(1, &[99])]);
        assert_eq!(g.nodes(), &[1, 99]);
        assert_eq!(g.dependents_of(99), &[1]);
        assert_eq!(g.dependent_count(1), 0);
    }

    #[test]
    fn test_acyclic_has_no_cycle_nodes() {
        let g = DependencyGraph::build(&[task(1, &[]), task(2, &[1]), task(3, &[2])]);
        assert!(g.find_cycles().is_empty());
    }

    #[test]
    fn test_two_node_cycle() {
        let g = DependencyGraph::build(&[task(1, &[2]), task(2, &[1]), task(3, &[])]);
        let cycles = g.find_cycles();
        assert_eq!(cycles, HashSet::from([1, 2]));
    }

    #[test]
    fn test_three_node_cycle_with_tail() {
        // 4 hangs off the cycle but is not part of it.
        let g = DependencyGraph::build(&[
            task(1, &[3]),
            task(2, &[1]),
            task(3, &[2]),
            task(4, &[3]),
        ]);
        let cycles = g.find_cycles();
        assert!(cycles.contains(&1) && cycles.contains(&2) && cycles.contains(&3));
        assert!(!cycles.contains(&4));
    }

    #[test]
    fn test_self_dependency_terminates() {
        let g = DependencyGraph::build(&[task(1, &[1]), task(2, &[])]);
        assert_eq!(g.find_cycles(), HashSet::from([1]));
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let n = 200_000;
        let tasks: Vec<_> = (1..=n)
            .map(|id| if id == 1 { task(id, &[n]) } else { task(id, &[id - 1]) })
            .collect();
        let g = DependencyGraph::build(&tasks);
        assert_eq!(g.find_cycles().len(), n as usize);
    }

    #[test]
    fn test_fan_in_back_edges_mark_each_node_once() {
        // Task 1 depends on every other task and each task i depends on i - 1,
        // so every node on the descending chain closes a cycle back to 1.
        let n: TaskId = 50_000;
        let tasks: Vec<_> = (1..=n)
            .map(|id| {
                if id == 1 {
                    TaskRecord::new(1, "hub").with_dependencies(2..=n)
                } else {
                    task(id, &[id - 1])
                }
            })
            .collect();
        let g = DependencyGraph::build(&tasks);
        assert_eq!(g.dependents_of(2), &[1, 3]);

        let cycles = g.find_cycles();
        assert_eq!(cycles.len(), n as usize);
        assert!(cycles.contains(&1) && cycles.contains(&n));
    }

    #[test]
    fn test_cycle_marking_after_backtrack() {
        // 1 -> 2 -> 3 -> 1 is found first; 4 is pushed after backtracking to 2
        // and closes its own cycle through 2.
        let g = DependencyGraph::build(&[
            task(1, &[3]),
            task(2, &[1, 4]),
            task(3, &[2]),
            task(4, &[2]),
            task(5, &[4]),
        ]);
        assert_eq!(g.find_cycles(), HashSet::from([1, 2, 3, 4]));
    }
}
