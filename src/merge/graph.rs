//! The travel-reordering pass loop: builds primary edges from coincident
//! endpoints, then grows the pairing through zero-distance, seeded-shortest,
//! and residual passes, maintaining loop-freedom throughout via
//! [`check_for_loops`].

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use super::node::{edge_distance, Edge, Node, Nodelist, REJECTED};

const COINCIDENT_EPSILON: f64 = 1e-6;

fn coincident(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.0 - b.0).abs() < COINCIDENT_EPSILON && (a.1 - b.1).abs() < COINCIDENT_EPSILON
}

/// Finds every node `v` whose start coincides with `u`'s end, sharing tool
/// and pass id with `u`. Implements Pass 0's primary-edge rule, including its
/// degenerate "peck-drill" tie-break when more than one candidate exists.
fn primary_candidates(nodes: &[Node], u: usize) -> Vec<usize> {
    let start = nodes[u].end;
    let mut candidates: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(v, n)| {
            *v != u && n.tool == nodes[u].tool && n.pass_id == nodes[u].pass_id && coincident(n.start, start)
        })
        .map(|(v, _)| v)
        .collect();

    if candidates.len() > 1 {
        candidates.retain(|&v| coincident(nodes[v].start, nodes[v].end));
    }
    candidates
}

pub fn pass0_primary_edges(nodes: &[Node]) -> Vec<Edge> {
    let mut edges = Vec::new();
    for u in 0..nodes.len() {
        for v in primary_candidates(nodes, u) {
            edges.push(Edge { prev: u, next: v, distance: 0.0, weight: 0 });
        }
    }
    edges
}

/// Deduplicates edges by `(prev, next)`, orders weight<max first (stable),
/// weight==max by ascending distance, weight>=[`REJECTED`] last, then sweeps
/// maintaining a disjoint set of [`Nodelist`] chains, resolving forks and
/// cycles as they arise. Returns the edges in nodelist (then leftover) order.
pub fn check_for_loops(mut edges: Vec<Edge>) -> Vec<Edge> {
    let mut seen = HashSet::new();
    edges.retain(|e| seen.insert((e.prev, e.next)));

    let max_weight = edges.iter().filter(|e| e.weight < REJECTED).map(|e| e.weight).max().unwrap_or(0);
    let (below, rest): (Vec<Edge>, Vec<Edge>) = edges.into_iter().partition(|e| e.weight < max_weight);
    let (mut at_max, rejected): (Vec<Edge>, Vec<Edge>) = rest.into_iter().partition(|e| e.weight < REJECTED);
    at_max.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap());

    let mut ordered = below;
    ordered.extend(at_max);

    let mut lists: Vec<Nodelist> = Vec::new();
    // node id -> (list index, true if last, false if first), for endpoint lookup.
    let mut ends: HashMap<usize, (usize, bool)> = HashMap::new();
    let mut leftover: Vec<Edge> = Vec::new();

    for mut edge in ordered {
        let prev_interior = lists.iter().position(|l| l.contains_interior(edge.prev));
        let next_interior = lists.iter().position(|l| l.contains_interior(edge.next));

        if let Some(li) = prev_interior.or(next_interior) {
            trace!(prev = edge.prev, next = edge.next, "fork detected in nodelist interior");
            let list = &lists[li];
            let has_inverse = list.ids.windows(2).any(|w| w[0] == edge.next && w[1] == edge.prev);
            if has_inverse {
                edge.weight = REJECTED;
                leftover.push(edge);
                continue;
            }
            let displaced_idx = list
                .ids
                .windows(2)
                .position(|w| w[0] == edge.prev || w[1] == edge.next);
            let displaceable = displaced_idx
                .filter(|&i| i == 0 || i == list.edges.len() - 1)
                .map(|i| (i, list.edges[i]));
            match displaceable {
                Some((i, old)) if old.distance > edge.distance => {
                    lists[li].edges[i].weight = REJECTED;
                    leftover.push(Edge { weight: REJECTED, ..old });
                    if i == 0 {
                        lists[li].ids.remove(0);
                        lists[li].edges.remove(0);
                    } else {
                        lists[li].ids.pop();
                        lists[li].edges.pop();
                    }
                    reindex_ends(&lists, &mut ends);
                    push_edge_into_lists(&mut lists, &mut ends, edge);
                }
                _ => {
                    edge.weight = REJECTED;
                    leftover.push(edge);
                }
            }
            continue;
        }

        let prev_is_last = ends.get(&edge.prev).copied().filter(|(_, last)| *last);
        let next_is_first = ends.get(&edge.next).copied().filter(|(_, last)| !*last);

        if let (Some((lp, _)), Some((ln, _))) = (prev_is_last, next_is_first) {
            if lp == ln {
                trace!(prev = edge.prev, next = edge.next, "cycle detected");
                let mut candidate = lists[lp].clone();
                candidate.append_edge(edge);
                let max_idx = candidate.max_edge().unwrap();
                if max_idx == candidate.edges.len() - 1 {
                    // the new edge itself is the longest: reject it, list unchanged.
                    leftover.push(Edge { weight: REJECTED, ..candidate.edges[max_idx] });
                } else {
                    let popped = candidate.edges[max_idx];
                    candidate.edges[max_idx].weight = REJECTED;
                    leftover.push(Edge { weight: REJECTED, ..popped });
                    candidate.rotate_at(max_idx);
                    lists[lp] = candidate;
                    reindex_ends(&lists, &mut ends);
                }
                continue;
            }
            debug!(left = lp, right = ln, "concatenating nodelists");
            let right = lists.remove(ln);
            let lp = if ln < lp { lp - 1 } else { lp };
            lists[lp].ids.extend(right.ids.into_iter().skip(1));
            lists[lp].edges.push(edge);
            lists[lp].edges.extend(right.edges);
            reindex_ends(&lists, &mut ends);
            continue;
        }

        push_edge_into_lists(&mut lists, &mut ends, edge);
    }

    let mut out = Vec::new();
    for list in &lists {
        out.extend(list.edges.iter().copied());
    }
    out.extend(leftover);
    out.extend(rejected);
    out
}

fn push_edge_into_lists(lists: &mut Vec<Nodelist>, ends: &mut HashMap<usize, (usize, bool)>, edge: Edge) {
    if let Some((li, true)) = ends.get(&edge.prev).copied() {
        lists[li].append_edge(edge);
    } else if let Some((li, false)) = ends.get(&edge.next).copied() {
        lists[li].prepend_edge(edge);
    } else {
        lists.push(Nodelist::single(edge.prev, edge.next, edge));
    }
    reindex_ends(lists, ends);
}

fn reindex_ends(lists: &[Nodelist], ends: &mut HashMap<usize, (usize, bool)>) {
    ends.clear();
    for (i, list) in lists.iter().enumerate() {
        ends.insert(list.first(), (i, false));
        ends.insert(list.last(), (i, true));
    }
}

fn paired_ids(edges: &[Edge]) -> (HashSet<usize>, HashSet<usize>) {
    let mut sources = HashSet::new();
    let mut targets = HashSet::new();
    for e in edges.iter().filter(|e| !e.is_rejected()) {
        sources.insert(e.prev);
        targets.insert(e.next);
    }
    (sources, targets)
}

fn unpaired(nodes: &[Node], paired: &HashSet<usize>) -> Vec<usize> {
    (0..nodes.len()).filter(|id| !paired.contains(id)).collect()
}

/// Runs the full pass loop (primary, secondary, seeded travelling, residual,
/// rotation) and returns the accepted edges in final path order.
pub fn optimise(nodes: &[Node]) -> Vec<Edge> {
    if nodes.is_empty() {
        return Vec::new();
    }

    let mut accepted = check_for_loops(pass0_primary_edges(nodes));
    debug!(count = accepted.len(), "pass 0 primary edges");

    let mut pass = 1u32;
    loop {
        let (sources, targets) = paired_ids(&accepted);
        let unpaired_sources = unpaired(nodes, &sources);
        let unpaired_targets = unpaired(nodes, &targets);

        let mut candidates: Vec<Edge> = Vec::new();
        for &u in &unpaired_sources {
            for &v in &unpaired_targets {
                if u == v {
                    continue;
                }
                let d = edge_distance(nodes, u, v);
                if d < COINCIDENT_EPSILON {
                    candidates.push(Edge { prev: u, next: v, distance: d, weight: pass });
                }
            }
        }
        if candidates.is_empty() {
            break;
        }
        let mut union: Vec<Edge> = accepted.iter().filter(|e| !e.is_rejected()).copied().collect();
        union.extend(candidates);
        let resolved = check_for_loops(union);
        let added = resolved.iter().filter(|e| e.weight == pass && !e.is_rejected()).count();
        accepted = resolved;
        debug!(pass, added, "secondary zero-distance pass");
        if added == 0 {
            break;
        }
        pass += 1;
    }

    // Seeded travelling: one pass, shortest-first, over whatever remains unpaired.
    let (sources, targets) = paired_ids(&accepted);
    let unpaired_sources = unpaired(nodes, &sources);
    let unpaired_targets = unpaired(nodes, &targets);
    let has_any_pairing = !sources.is_empty();

    let mut candidates: Vec<Edge> = Vec::new();
    for &u in &unpaired_sources {
        for &v in &unpaired_targets {
            if u == v {
                continue;
            }
            candidates.push(Edge { prev: u, next: v, distance: edge_distance(nodes, u, v), weight: pass + 1 });
        }
    }
    candidates.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap());

    if !has_any_pairing {
        // No pairing exists yet anywhere: seed with just the single shortest edge.
        if let Some(first) = candidates.into_iter().next() {
            let mut union: Vec<Edge> = accepted.iter().filter(|e| !e.is_rejected()).copied().collect();
            union.push(first);
            accepted = check_for_loops(union);
        }
    } else if !candidates.is_empty() {
        let mut union: Vec<Edge> = accepted.iter().filter(|e| !e.is_rejected()).copied().collect();
        union.extend(candidates);
        accepted = check_for_loops(union);
    }
    debug!(count = accepted.iter().filter(|e| !e.is_rejected()).count(), "after seeded travelling pass");

    // Residual: greedily pair whatever is still left, one edge at a time.
    loop {
        let (sources, targets) = paired_ids(&accepted);
        let unpaired_sources = unpaired(nodes, &sources);
        let unpaired_targets = unpaired(nodes, &targets);
        if unpaired_sources.len() <= 1 {
            break;
        }
        let mut best: Option<Edge> = None;
        for &u in &unpaired_sources {
            for &v in &unpaired_targets {
                if u == v {
                    continue;
                }
                let candidate = Edge { prev: u, next: v, distance: edge_distance(nodes, u, v), weight: REJECTED - 1 };
                let mut union: Vec<Edge> = accepted.iter().filter(|e| !e.is_rejected()).copied().collect();
                union.push(candidate);
                let resolved = check_for_loops(union);
                let survives = resolved.iter().any(|e| e.prev == u && e.next == v && !e.is_rejected());
                if !survives {
                    continue;
                }
                let better = match &best {
                    None => true,
                    Some(b) => {
                        candidate.distance < b.distance
                            || (candidate.distance == b.distance && candidate.next > b.next)
                    }
                };
                if better {
                    best = Some(candidate);
                }
            }
        }
        match best {
            Some(edge) => {
                let mut union: Vec<Edge> = accepted.iter().filter(|e| !e.is_rejected()).copied().collect();
                union.push(edge);
                accepted = check_for_loops(union);
            }
            None => break,
        }
    }

    rotate_if_shorter(nodes, accepted)
}

/// Compares closing the open path (last → first) against its longest edge;
/// rotates the path so the longer edge becomes the cut if that shortens the
/// implied loop.
fn rotate_if_shorter(nodes: &[Node], edges: Vec<Edge>) -> Vec<Edge> {
    let live: Vec<Edge> = edges.iter().filter(|e| !e.is_rejected()).copied().collect();
    if live.len() < 2 {
        return edges;
    }
    let mut list = Nodelist { ids: Vec::new(), edges: live.clone() };
    list.ids.push(live[0].prev);
    for e in &live {
        list.ids.push(e.next);
    }
    if list.ids.first() == list.ids.last() {
        return edges;
    }
    let closing = edge_distance(nodes, list.last(), list.first());
    let Some(max_idx) = list.max_edge() else { return edges };
    if closing < list.edges[max_idx].distance {
        list.rotate_at(max_idx);
    }
    list.edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::node::Node;

    fn node(id: usize, start: (f64, f64), end: (f64, f64)) -> Node {
        Node { id, tool: "T1".into(), pass_id: id as u32, start, end, path: format!("n{id}").into() }
    }

    #[test]
    fn primary_edge_on_coincident_endpoints() {
        let nodes = vec![node(0, (0.0, 0.0), (1.0, 0.0)), node(1, (1.0, 0.0), (2.0, 0.0))];
        let edges = pass0_primary_edges(&nodes);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].weight, 0);
    }

    #[test]
    fn no_primary_edge_without_coincidence() {
        let nodes = vec![node(0, (0.0, 0.0), (1.0, 0.0)), node(1, (5.0, 5.0), (6.0, 5.0))];
        assert!(pass0_primary_edges(&nodes).is_empty());
    }

    #[test]
    fn check_for_loops_rejects_interior_fork() {
        let edges = vec![
            Edge { prev: 0, next: 1, distance: 1.0, weight: 0 },
            Edge { prev: 1, next: 2, distance: 1.0, weight: 0 },
            Edge { prev: 3, next: 1, distance: 0.5, weight: 0 },
        ];
        let out = check_for_loops(edges);
        let rejected: Vec<_> = out.iter().filter(|e| e.is_rejected()).collect();
        assert!(!rejected.is_empty());
    }

    #[test]
    fn optimise_scenario_f_chains_primary_edges() {
        // N0: (0,0)->(1,0); N1: (5,5)->(6,5); N2: (1,0)->(5,5)
        let nodes = vec![
            node(0, (0.0, 0.0), (1.0, 0.0)),
            node(1, (5.0, 5.0), (6.0, 5.0)),
            node(2, (1.0, 0.0), (5.0, 5.0)),
        ];
        let edges = optimise(&nodes);
        let live: Vec<_> = edges.iter().filter(|e| !e.is_rejected()).collect();
        assert!(live.iter().any(|e| e.prev == 0 && e.next == 2));
        assert!(live.iter().any(|e| e.prev == 2 && e.next == 1));
    }

    #[test]
    fn optimise_empty_input_yields_no_edges() {
        assert!(optimise(&[]).is_empty());
    }
}
