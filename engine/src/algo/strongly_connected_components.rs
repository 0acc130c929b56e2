//! Strongly connected components with Tarjan's algorithm.
//!
//! The DFS is iterative with an explicit stack of neighbor iterators, so large road networks
//! do not overflow the call stack.

use crate::datastr::{graph::*, rank_select_map::BitVec};

/// Component ids of all nodes. Ids are assigned in the order the components are completed,
/// which is a reverse topological order of the condensation.
#[derive(Debug, Clone, PartialEq)]
pub struct StronglyConnectedComponents {
    component: Vec<u32>,
    component_sizes: Vec<usize>,
}

const UNVISITED: usize = usize::MAX;

impl StronglyConnectedComponents {
    pub fn new<G: for<'a> LinkIterable<'a, NodeId>>(graph: &G) -> Self {
        let n = graph.num_nodes();
        let mut dfs_num = vec![UNVISITED; n];
        let mut dfs_low = vec![0; n];
        let mut on_stack = BitVec::new(n);
        let mut component = vec![0; n];
        let mut component_sizes = Vec::new();

        let mut dfs_num_counter = 0;
        let mut tarjan_stack = Vec::new();
        let mut stack = Vec::new();

        for root in 0..n {
            if dfs_num[root] != UNVISITED {
                continue;
            }

            dfs_num[root] = dfs_num_counter;
            dfs_low[root] = dfs_num_counter;
            dfs_num_counter += 1;
            tarjan_stack.push(root);
            on_stack.set(root);
            stack.push((root, graph.link_iter(root as NodeId)));

            while let Some(&mut (node, ref mut neighbors)) = stack.last_mut() {
                if let Some(neighbor) = neighbors.next() {
                    let neighbor = neighbor as usize;
                    if dfs_num[neighbor] == UNVISITED {
                        dfs_num[neighbor] = dfs_num_counter;
                        dfs_low[neighbor] = dfs_num_counter;
                        dfs_num_counter += 1;
                        tarjan_stack.push(neighbor);
                        on_stack.set(neighbor);
                        stack.push((neighbor, graph.link_iter(neighbor as NodeId)));
                    } else if on_stack.get(neighbor) {
                        dfs_low[node] = std::cmp::min(dfs_low[node], dfs_num[neighbor]);
                    }
                } else {
                    stack.pop();
                    if let Some(&(parent, _)) = stack.last() {
                        dfs_low[parent] = std::cmp::min(dfs_low[parent], dfs_low[node]);
                    }

                    if dfs_low[node] == dfs_num[node] {
                        let id = component_sizes.len() as u32;
                        let mut size = 0;
                        while let Some(member) = tarjan_stack.pop() {
                            on_stack.unset(member);
                            component[member] = id;
                            size += 1;
                            if member == node {
                                break;
                            }
                        }
                        component_sizes.push(size);
                    }
                }
            }
        }

        StronglyConnectedComponents { component, component_sizes }
    }

    pub fn num_components(&self) -> usize {
        self.component_sizes.len()
    }

    pub fn component(&self, node: NodeId) -> u32 {
        self.component[node as usize]
    }

    /// Id of the component with the most nodes, the first one found on ties.
    pub fn largest_component(&self) -> Option<u32> {
        self.component_sizes
            .iter()
            .enumerate()
            .max_by(|(i, a), (j, b)| a.cmp(b).then(j.cmp(i)))
            .map(|(id, _)| id as u32)
    }

    /// A bit for every node, set exactly for the nodes of the largest component.
    pub fn largest_scc_as_bitmask(&self) -> BitVec {
        let mut bits = BitVec::new(self.component.len());
        if let Some(largest) = self.largest_component() {
            for (node, &component) in self.component.iter().enumerate() {
                if component == largest {
                    bits.set(node);
                }
            }
        }
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AdjacencyLists(Vec<Vec<NodeId>>);

    impl Graph for AdjacencyLists {
        fn num_nodes(&self) -> usize {
            self.0.len()
        }

        fn num_arcs(&self) -> usize {
            self.0.iter().map(Vec::len).sum()
        }

        fn degree(&self, node: NodeId) -> usize {
            self.0[node as usize].len()
        }
    }

    impl<'a> LinkIterable<'a, NodeId> for AdjacencyLists {
        type Iter = std::iter::Cloned<std::slice::Iter<'a, NodeId>>;

        fn link_iter(&'a self, node: NodeId) -> Self::Iter {
            self.0[node as usize].iter().cloned()
        }
    }

    #[test]
    fn two_cycles_and_a_bridge() {
        // 0 <-> 1 -> 2 -> 3 -> 4 -> 2, 5 isolated
        let graph = AdjacencyLists(vec![vec![1], vec![0, 2], vec![3], vec![4], vec![2], vec![]]);
        let scc = StronglyConnectedComponents::new(&graph);
        assert_eq!(scc.num_components(), 3);
        assert_eq!(scc.component(0), scc.component(1));
        assert_eq!(scc.component(2), scc.component(3));
        assert_eq!(scc.component(2), scc.component(4));
        assert_ne!(scc.component(0), scc.component(2));
        assert_ne!(scc.component(5), scc.component(0));

        let bits = scc.largest_scc_as_bitmask();
        let selected: Vec<usize> = (0..6).filter(|&node| bits.get(node)).collect();
        assert_eq!(selected, vec![2, 3, 4]);
    }

    #[test]
    fn long_path_does_not_overflow() {
        let n = 200_000;
        let graph = AdjacencyLists((0..n).map(|node| vec![((node + 1) % n) as NodeId]).collect());
        let scc = StronglyConnectedComponents::new(&graph);
        assert_eq!(scc.num_components(), 1);
        assert_eq!(scc.largest_scc_as_bitmask().count_ones(), n);
    }

    #[test]
    fn empty_graph() {
        let scc = StronglyConnectedComponents::new(&AdjacencyLists(Vec::new()));
        assert_eq!(scc.largest_component(), None);
        assert!(scc.largest_scc_as_bitmask().is_empty());
    }
}
