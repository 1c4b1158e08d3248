//! StateGraph: the graph asset (states, transitions, adjacency) and path planning.
//!
//! Paths are found by breadth-first search over an explicit adjacency map.
//! Outgoing transitions are visited in insertion order, so for a given graph
//! the planned route between two states is always the same fewest-hop route.

use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};

use crate::error::{GraphError, Result};
use crate::state::{GraphState, Transition, TransitionDef, TransitionId};

#[derive(Clone, Debug, Default)]
pub struct StateGraph {
    states: Vec<GraphState>,
    by_name: HashMap<String, usize>,
    transitions: Vec<Transition>,
    /// state name -> outgoing transitions, in insertion order
    adjacency: HashMap<String, Vec<TransitionId>>,
    initial_state: Option<String>,
    next_transition: u32,
}

impl StateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state(&mut self, state: GraphState) -> Result<()> {
        if state.name.is_empty() {
            return Err(GraphError::EmptyStateName);
        }
        if self.by_name.contains_key(&state.name) {
            return Err(GraphError::DuplicateState(state.name));
        }
        self.by_name.insert(state.name.clone(), self.states.len());
        self.adjacency.entry(state.name.clone()).or_default();
        self.states.push(state);
        Ok(())
    }

    /// Remove a state together with every transition entering or leaving it.
    pub fn remove_state(&mut self, name: &str) -> Result<()> {
        if !self.by_name.contains_key(name) {
            return Err(GraphError::UnknownState(name.to_string()));
        }
        self.states.retain(|s| s.name != name);
        self.transitions.retain(|t| t.from != name && t.to != name);
        if self.initial_state.as_deref() == Some(name) {
            self.initial_state = None;
        }
        self.rebuild_indices();
        Ok(())
    }

    pub fn add_transition(&mut self, def: TransitionDef) -> Result<TransitionId> {
        for endpoint in [&def.from, &def.to] {
            if !self.by_name.contains_key(endpoint.as_str()) {
                return Err(GraphError::UnknownState(endpoint.clone()));
            }
        }
        if !def.duration.is_finite() || def.duration < 0.0 {
            return Err(GraphError::InvalidDuration {
                from: def.from,
                to: def.to,
                duration: def.duration,
            });
        }
        let (begin, end) = (def.begin_time_range, def.end_time_range);
        if !(0.0..=1.0).contains(&begin) || !(0.0..=1.0).contains(&end) || begin > end {
            return Err(GraphError::InvalidTimeRange {
                from: def.from,
                to: def.to,
                begin,
                end,
            });
        }

        let id = TransitionId(self.next_transition);
        self.next_transition = self.next_transition.wrapping_add(1);
        self.adjacency.entry(def.from.clone()).or_default().push(id);
        self.transitions.push(Transition::from_def(id, def));
        Ok(id)
    }

    pub fn remove_transition(&mut self, id: TransitionId) -> Result<()> {
        let before = self.transitions.len();
        self.transitions.retain(|t| t.id != id);
        if self.transitions.len() == before {
            return Err(GraphError::UnknownTransition(id));
        }
        for outgoing in self.adjacency.values_mut() {
            outgoing.retain(|t| *t != id);
        }
        Ok(())
    }

    pub fn set_initial_state(&mut self, name: &str) -> Result<()> {
        if !self.by_name.contains_key(name) {
            return Err(GraphError::UnknownState(name.to_string()));
        }
        self.initial_state = Some(name.to_string());
        Ok(())
    }

    /// The explicitly chosen initial state, or else the first state added.
    pub fn initial_state(&self) -> Option<&str> {
        self.initial_state
            .as_deref()
            .or_else(|| self.states.first().map(|s| s.name.as_str()))
    }

    pub fn get_state(&self, name: &str) -> Option<&GraphState> {
        self.by_name.get(name).and_then(|&i| self.states.get(i))
    }

    pub fn states(&self) -> &[GraphState] {
        &self.states
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.id == id)
    }

    pub fn transitions_from<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Transition> + 'a {
        self.adjacency
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.transition(*id))
    }

    /// Ordered transitions leading from `from` to `to`. Empty when the states are
    /// equal, unknown, or not connected.
    pub fn calculate_path(&self, from: &str, to: &str) -> Vec<TransitionId> {
        self.calculate_path_bounded(from, to, usize::MAX)
    }

    /// Like `calculate_path`, but routes longer than `max_hops` count as unreachable.
    pub fn calculate_path_bounded(&self, from: &str, to: &str, max_hops: usize) -> Vec<TransitionId> {
        if from == to || !self.by_name.contains_key(from) || !self.by_name.contains_key(to) {
            return Vec::new();
        }

        // state -> (previous state, transition taken to reach it)
        let mut parent: HashMap<&str, (&str, TransitionId)> = HashMap::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
        visited.insert(from);
        queue.push_back((from, 0));

        while let Some((node, depth)) = queue.pop_front() {
            if depth >= max_hops {
                continue;
            }
            for t in self.transitions_from(node) {
                let next = t.to.as_str();
                if !visited.insert(next) {
                    continue;
                }
                parent.insert(next, (node, t.id));
                if next == to {
                    return Self::unwind(&parent, from, to);
                }
                queue.push_back((next, depth + 1));
            }
        }
        Vec::new()
    }

    fn unwind(parent: &HashMap<&str, (&str, TransitionId)>, from: &str, to: &str) -> Vec<TransitionId> {
        let mut path = Vec::new();
        let mut cursor = to;
        while cursor != from {
            match parent.get(cursor) {
                Some(&(prev, id)) => {
                    path.push(id);
                    cursor = prev;
                }
                None => return Vec::new(),
            }
        }
        path.reverse();
        path
    }

    fn rebuild_indices(&mut self) {
        self.by_name.clear();
        self.adjacency.clear();
        for (i, s) in self.states.iter().enumerate() {
            self.by_name.insert(s.name.clone(), i);
            self.adjacency.entry(s.name.clone()).or_default();
        }
        for t in &self.transitions {
            self.adjacency.entry(t.from.clone()).or_default().push(t.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> StateGraph {
        // A -> B -> D, A -> C -> D, D -> A
        let mut g = StateGraph::new();
        for name in ["A", "B", "C", "D"] {
            g.add_state(GraphState::new(name)).unwrap();
        }
        g.add_transition(TransitionDef::new("A", "B", 0.1)).unwrap();
        g.add_transition(TransitionDef::new("A", "C", 0.1)).unwrap();
        g.add_transition(TransitionDef::new("B", "D", 0.1)).unwrap();
        g.add_transition(TransitionDef::new("C", "D", 0.1)).unwrap();
        g.add_transition(TransitionDef::new("D", "A", 0.1)).unwrap();
        g
    }

    #[test]
    fn same_state_has_empty_path() {
        assert!(diamond().calculate_path("A", "A").is_empty());
    }

    #[test]
    fn direct_edge_is_single_hop() {
        let g = diamond();
        assert_eq!(g.calculate_path("A", "B"), vec![TransitionId(0)]);
    }

    #[test]
    fn bfs_prefers_first_inserted_route() {
        let g = diamond();
        assert_eq!(g.calculate_path("A", "D"), vec![TransitionId(0), TransitionId(2)]);
        // Repeated queries are deterministic
        assert_eq!(g.calculate_path("A", "D"), g.calculate_path("A", "D"));
    }

    #[test]
    fn cycles_terminate() {
        let g = diamond();
        assert_eq!(
            g.calculate_path("B", "C"),
            vec![TransitionId(2), TransitionId(4), TransitionId(1)]
        );
    }

    #[test]
    fn hop_bound_limits_search() {
        let g = diamond();
        assert!(g.calculate_path_bounded("B", "C", 2).is_empty());
        assert_eq!(g.calculate_path_bounded("B", "C", 3).len(), 3);
    }

    #[test]
    fn unknown_endpoints_yield_empty_path() {
        let g = diamond();
        assert!(g.calculate_path("A", "Z").is_empty());
        assert!(g.calculate_path("Z", "A").is_empty());
    }

    #[test]
    fn removing_a_state_drops_incident_transitions() {
        let mut g = diamond();
        g.remove_state("B").unwrap();
        assert!(g.get_state("B").is_none());
        assert_eq!(g.transitions().len(), 3);
        assert_eq!(g.calculate_path("A", "D"), vec![TransitionId(1), TransitionId(3)]);
    }

    #[test]
    fn removing_a_transition_reroutes() {
        let mut g = diamond();
        g.remove_transition(TransitionId(0)).unwrap();
        assert_eq!(g.calculate_path("A", "D"), vec![TransitionId(1), TransitionId(3)]);
        assert_eq!(
            g.remove_transition(TransitionId(0)),
            Err(GraphError::UnknownTransition(TransitionId(0)))
        );
    }

    #[test]
    fn validation_rejects_bad_definitions() {
        let mut g = diamond();
        assert_eq!(
            g.add_state(GraphState::new("A")),
            Err(GraphError::DuplicateState("A".into()))
        );
        assert_eq!(g.add_state(GraphState::new("")), Err(GraphError::EmptyStateName));
        assert!(matches!(
            g.add_transition(TransitionDef::new("A", "Z", 0.1)),
            Err(GraphError::UnknownState(_))
        ));
        assert!(matches!(
            g.add_transition(TransitionDef::new("A", "B", -1.0)),
            Err(GraphError::InvalidDuration { .. })
        ));
        assert!(matches!(
            g.add_transition(TransitionDef::new("A", "B", 0.1).with_window(0.7, 0.2)),
            Err(GraphError::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn initial_state_defaults_to_first() {
        let mut g = diamond();
        assert_eq!(g.initial_state(), Some("A"));
        g.set_initial_state("C").unwrap();
        assert_eq!(g.initial_state(), Some("C"));
        g.remove_state("C").unwrap();
        assert_eq!(g.initial_state(), Some("A"));
    }
}
