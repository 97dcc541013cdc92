//! Maximum-cardinality bipartite matching between reference and estimate notes.
//!
//! Every scoring tier builds the same kind of graph (an edge wherever a
//! reference/estimate pair is compatible) and asks for the largest set of
//! disjoint pairs. Only the size of the matching feeds the metrics, so any
//! maximum matching is as good as another.

use std::collections::VecDeque;

/// A set of disjoint `(reference_index, estimate_index)` pairs, sorted by reference index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matching {
    pairs: Vec<(usize, usize)>,
}

impl Matching {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }
}

/// Find a maximum matching in the bipartite graph with `n_reference` left
/// vertices, `n_estimate` right vertices, and an edge wherever
/// `compatible(r, e)` holds.
///
/// Hopcroft–Karp: O(E·√V) after the O(n_reference·n_estimate) edge scan.
pub fn maximum_bipartite_match<F>(n_reference: usize, n_estimate: usize, compatible: F) -> Matching
where
    F: Fn(usize, usize) -> bool,
{
    let adjacency: Vec<Vec<usize>> = (0..n_reference)
        .map(|r| (0..n_estimate).filter(|&e| compatible(r, e)).collect())
        .collect();

    let mut search = HopcroftKarp::new(&adjacency, n_estimate);
    search.run();

    let pairs = search
        .ref_mate
        .iter()
        .enumerate()
        .filter_map(|(r, mate)| mate.map(|e| (r, e)))
        .collect();

    Matching { pairs }
}

const UNREACHED: usize = usize::MAX;

struct HopcroftKarp<'a> {
    adjacency: &'a [Vec<usize>],
    ref_mate: Vec<Option<usize>>,
    est_mate: Vec<Option<usize>>,
    /// BFS layer of each reference vertex in the current phase.
    layer: Vec<usize>,
}

impl<'a> HopcroftKarp<'a> {
    fn new(adjacency: &'a [Vec<usize>], n_estimate: usize) -> Self {
        Self {
            adjacency,
            ref_mate: vec![None; adjacency.len()],
            est_mate: vec![None; n_estimate],
            layer: vec![UNREACHED; adjacency.len()],
        }
    }

    fn run(&mut self) {
        while self.build_layers() {
            for r in 0..self.adjacency.len() {
                if self.ref_mate[r].is_none() {
                    self.augment(r);
                }
            }
        }
    }

    /// Layer the graph from every free reference vertex. Returns whether
    /// some free estimate vertex is reachable, i.e. an augmenting path exists.
    fn build_layers(&mut self) -> bool {
        let mut queue = VecDeque::new();
        for r in 0..self.adjacency.len() {
            if self.ref_mate[r].is_none() {
                self.layer[r] = 0;
                queue.push_back(r);
            } else {
                self.layer[r] = UNREACHED;
            }
        }

        let mut found_free = false;
        while let Some(r) = queue.pop_front() {
            let adjacency = self.adjacency;
            for &e in &adjacency[r] {
                match self.est_mate[e] {
                    None => found_free = true,
                    Some(next) if self.layer[next] == UNREACHED => {
                        self.layer[next] = self.layer[r] + 1;
                        queue.push_back(next);
                    }
                    Some(_) => {}
                }
            }
        }

        found_free
    }

    /// Depth-first search for an augmenting path along increasing layers.
    fn augment(&mut self, r: usize) -> bool {
        let adjacency = self.adjacency;
        for &e in &adjacency[r] {
            let mate = self.est_mate[e];
            let extends = match mate {
                None => true,
                Some(next) => self.layer[next] == self.layer[r] + 1 && self.augment(next),
            };
            if extends {
                self.ref_mate[r] = Some(e);
                self.est_mate[e] = Some(r);
                return true;
            }
        }

        // Dead end for the rest of this phase.
        self.layer[r] = UNREACHED;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_edges(n_ref: usize, n_est: usize, edges: &[(usize, usize)]) -> Matching {
        maximum_bipartite_match(n_ref, n_est, |r, e| edges.contains(&(r, e)))
    }

    fn assert_valid(matching: &Matching, edges: &[(usize, usize)]) {
        let mut refs: Vec<_> = matching.pairs().iter().map(|p| p.0).collect();
        let mut ests: Vec<_> = matching.pairs().iter().map(|p| p.1).collect();
        refs.dedup();
        ests.sort_unstable();
        ests.dedup();
        assert_eq!(refs.len(), matching.len(), "reference used twice");
        assert_eq!(ests.len(), matching.len(), "estimate used twice");
        for pair in matching.pairs() {
            assert!(edges.contains(pair), "pair {pair:?} is not an edge");
        }
    }

    #[test]
    fn empty_graph() {
        assert!(match_edges(0, 0, &[]).is_empty());
        assert!(match_edges(3, 0, &[]).is_empty());
        assert!(match_edges(0, 3, &[]).is_empty());
        assert!(match_edges(2, 2, &[]).is_empty());
    }

    #[test]
    fn greedy_choice_is_repaired_by_augmenting_path() {
        // r0 can take e0 or e1, r1 only e0. Greedy r0->e0 would block r1.
        let edges = [(0, 0), (0, 1), (1, 0)];
        let matching = match_edges(2, 2, &edges);
        assert_eq!(matching.len(), 2);
        assert_valid(&matching, &edges);
    }

    #[test]
    fn long_augmenting_chain() {
        // Staircase: r_i connects to e_i and e_{i+1}; r_last only to e_0.
        let n = 6;
        let mut edges: Vec<(usize, usize)> = (0..n - 1).flat_map(|i| [(i, i), (i, i + 1)]).collect();
        edges.push((n - 1, 0));
        let matching = match_edges(n, n, &edges);
        assert_eq!(matching.len(), n);
        assert_valid(&matching, &edges);
    }

    #[test]
    fn limited_by_smaller_side() {
        let edges: Vec<(usize, usize)> = (0..4).flat_map(|r| (0..2).map(move |e| (r, e))).collect();
        let matching = match_edges(4, 2, &edges);
        assert_eq!(matching.len(), 2);
        assert_valid(&matching, &edges);
    }

    #[test]
    fn star_contention() {
        // Three references all want the single estimate e1; only r2 has an alternative.
        let edges = [(0, 1), (1, 1), (2, 1), (2, 0)];
        let matching = match_edges(3, 2, &edges);
        assert_eq!(matching.len(), 2);
        assert_valid(&matching, &edges);
    }

    #[test]
    fn pairs_sorted_by_reference() {
        let edges = [(2, 0), (0, 2), (1, 1)];
        let matching = match_edges(3, 3, &edges);
        assert_eq!(matching.pairs(), &[(0, 2), (1, 1), (2, 0)]);
    }
}
