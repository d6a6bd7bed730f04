/* Perform subset construction to convert an NFA into a DFA, then apply the
 * table-filling algorithm with union-find partition recovery to produce the
 * minimal DFA. */

use crate::fa::{FAState, Symbol, FA};
use crate::nfa::NFA;
use bitvec::prelude::*;
use std::collections::VecDeque;
use std::collections::{HashMap, HashSet};

#[derive(Debug)]
pub struct DFA {
    states: Vec<DFAState>,
    start_state: usize,
    accept_states: BitVec<u8>,
    alphabet: HashSet<char>,
    regex: String,
}

#[derive(Debug, Clone)]
pub struct DFAState {
    id: usize,
    names: BitVec<u8>, // The set of NFA states this DFA state stands for
    transitions: HashMap<Symbol, usize>,
}

impl FAState for DFAState {
    fn add_transition(&mut self, symbol: Symbol, to: usize) {
        self.transitions.insert(symbol, to);
    }
}

impl DFAState {
    fn new(id: usize, names: BitVec<u8>) -> Self {
        DFAState {
            id,
            names,
            transitions: HashMap::new(),
        }
    }

    pub fn get_transitions(&self) -> &HashMap<Symbol, usize> {
        &self.transitions
    }

    pub fn get_id(&self) -> usize {
        self.id
    }

    pub fn get_names(&self) -> &BitVec<u8> {
        &self.names
    }
}

impl FA for DFA {
    fn add_transition(&mut self, from: usize, symbol: Symbol, to: usize) {
        self.states[from].add_transition(symbol, to);
    }

    fn set_accept_state(&mut self, state_id: usize) {
        self.accept_states.set(state_id, true);
    }

    fn add_state(&mut self) -> usize {
        let state_id = self.states.len();
        let new_state = DFAState::new(state_id, BitVec::new());
        self.states.push(new_state);
        self.accept_states.push(false);
        state_id
    }

    fn get_num_states(&self) -> usize {
        self.states.len()
    }

    fn get_start_state(&self) -> usize {
        self.start_state
    }

    fn get_alphabet(&self) -> &HashSet<char> {
        &self.alphabet
    }

    fn get_acceptor_states(&self) -> &BitVec<u8> {
        &self.accept_states
    }

    fn get_regex(&self) -> &String {
        &self.regex
    }

    fn get_state_transitions(&self, state_id: usize) -> Vec<(Symbol, usize)> {
        self.states[state_id]
            .get_transitions()
            .iter()
            .map(|(symbol, target)| (symbol.clone(), *target))
            .collect()
    }
}

impl DFA {
    fn new() -> Self {
        DFA {
            states: Vec::new(),
            start_state: 0,
            accept_states: BitVec::new(),
            alphabet: HashSet::new(),
            regex: String::new(),
        }
    }

    fn add_named_state(&mut self, names: BitVec<u8>) -> usize {
        let state_id = self.add_state();
        self.states[state_id].names = names;
        state_id
    }

    fn set_regex(&mut self, regex: String) {
        self.regex = regex;
    }

    pub fn get_state(&self, id: usize) -> &DFAState {
        match self.states.get(id) {
            Some(state) => state,
            None => panic!("Invalid state index provided"),
        }
    }

    /// Run the DFA over the input, accepting iff the walk consumes every
    /// character and ends in an accept state. A missing transition rejects.
    pub fn accepts(&self, input: &str) -> bool {
        let mut state = self.start_state;
        for ch in input.chars() {
            let transitions = self.get_state(state).get_transitions();
            match transitions.get(&Symbol::Char(ch)) {
                Some(target) => state = *target,
                None => return false,
            }
        }
        self.accept_states[state]
    }
}

/// Depth-first expansion of a seed set along epsilon transitions. The seed
/// set is part of the closure.
fn get_epsilon_closure(nfa: &NFA, nfa_states: &BitVec<u8>) -> BitVec<u8> {
    let num_states = nfa.get_num_states();

    let mut epsilon_closure: BitVec<u8, Lsb0> = BitVec::repeat(false, num_states);
    let mut visited: BitVec<u8, Lsb0> = BitVec::repeat(false, num_states);

    let mut work_list: VecDeque<usize> = nfa_states.iter_ones().collect();
    for state in work_list.iter() {
        visited.set(*state, true);
    }

    while let Some(state) = work_list.pop_front() {
        epsilon_closure.set(state, true);

        let transitions = nfa.get_state(state).get_transitions();
        let eps_transitions = match transitions.get(&Symbol::Epsilon) {
            Some(targets) => targets,
            None => continue,
        };
        for target in eps_transitions {
            let target = *target;
            if !visited[target] {
                visited.set(target, true);
                work_list.push_back(target);
            }
        }
    }
    epsilon_closure
}

// The set of NFA states reachable from any state in q via a single c edge
fn delta(nfa: &NFA, q: &BitVec<u8>, c: char) -> BitVec<u8> {
    let mut result = BitVec::repeat(false, q.len());
    for node in q.iter_ones() {
        let transitions = nfa.get_state(node).get_transitions();
        let target_state_ids = match transitions.get(&Symbol::Char(c)) {
            None => continue,
            Some(state_ids) => state_ids,
        };
        for state_id in target_state_ids {
            result.set(*state_id, true);
        }
    }
    result
}

/// Convert an NFA into a DFA over the explicit alphabet using subset
/// construction. Each DFA state is backed by the set of NFA states it
/// represents; that name set is the dedup key.
pub fn construct_dfa(nfa: &NFA, alphabet: &HashSet<char>) -> DFA {
    let mut result = DFA::new();
    result.alphabet = alphabet.clone();

    let nfa_accepts = nfa.get_acceptor_states();

    // Sort the alphabet so that state ids come out in a stable order
    let mut sigma: Vec<char> = alphabet.iter().copied().collect();
    sigma.sort();

    let mut nfa_states = BitVec::repeat(false, nfa.get_num_states());
    nfa_states.set(nfa.get_start_state(), true);

    let q0 = get_epsilon_closure(nfa, &nfa_states);

    let mut q_list: HashMap<BitVec<u8>, usize> = HashMap::new(); // Name set to DFA state
    let mut work_list: VecDeque<BitVec<u8>> = VecDeque::new();

    let di = result.add_named_state(q0.clone());
    result.start_state = di;
    q_list.insert(q0.clone(), di);
    work_list.push_back(q0.clone());

    let has_common = (q0 & nfa_accepts).any();
    if has_common {
        result.set_accept_state(di);
    }

    while let Some(q) = work_list.pop_front() {
        for c in sigma.iter() {
            let end_states = delta(nfa, &q, *c);
            if end_states.not_any() {
                continue;
            }
            let t = get_epsilon_closure(nfa, &end_states);

            if !q_list.contains_key(&t) {
                let di = result.add_named_state(t.clone());
                q_list.insert(t.clone(), di);
                work_list.push_back(t.clone());
                let has_common = (t.clone() & nfa_accepts).any();
                if has_common {
                    result.set_accept_state(di);
                }
            }

            let dq = match q_list.get(&q) {
                Some(dq) => *dq,
                None => panic!("Worklist entry missing from the name set table"),
            };
            let dt = match q_list.get(&t) {
                Some(dt) => *dt,
                None => panic!("Freshly inserted name set missing from the table"),
            };
            result.add_transition(dq, Symbol::Char(*c), dt);
        }
    }

    result.set_regex(nfa.get_regex().to_string());
    result
}

// Pairs are keyed (min, max) so that lookup order never matters
fn pair_key(p: usize, q: usize) -> (usize, usize) {
    if p <= q {
        (p, q)
    } else {
        (q, p)
    }
}

fn find(parent: &mut Vec<usize>, state: usize) -> usize {
    if parent[state] == state {
        return state;
    }
    let above = parent[state];
    let root = find(parent, above);
    parent[state] = root; // path compression
    root
}

// The smaller root wins, so every class root is its lowest member id
fn union(parent: &mut Vec<usize>, s1: usize, s2: usize) {
    let root1 = find(parent, s1);
    let root2 = find(parent, s2);
    if root1 < root2 {
        parent[root2] = root1;
    } else if root2 < root1 {
        parent[root1] = root2;
    }
}

/// Minimize a DFA with the table-filling algorithm. Pairs of states are
/// marked distinguishable, the unmarked pairs are merged through union-find,
/// and a fresh DFA is rebuilt over the equivalence classes. The class
/// representative is its lowest state id, so output ids are deterministic.
pub fn construct_minimal_dfa(dfa: &DFA) -> DFA {
    let num_states = dfa.get_num_states();
    let accept_states = dfa.get_acceptor_states();

    let mut sigma: Vec<char> = dfa.get_alphabet().iter().copied().collect();
    sigma.sort();

    // 1. Mark pairs where exactly one state is accepting
    let mut table: HashMap<(usize, usize), bool> = HashMap::new();
    for p in 0..num_states {
        for q in (p + 1)..num_states {
            table.insert((p, q), accept_states[p] != accept_states[q]);
        }
    }

    // 2. Sweep until no pair gets newly marked
    let mut changed = true;
    while changed {
        changed = false;
        for p in 0..num_states {
            for q in (p + 1)..num_states {
                if table[&(p, q)] {
                    continue;
                }
                for c in sigma.iter() {
                    let p_target = dfa.get_state(p).get_transitions().get(&Symbol::Char(*c));
                    let q_target = dfa.get_state(q).get_transitions().get(&Symbol::Char(*c));

                    match (p_target, q_target) {
                        (Some(p_target), Some(q_target)) => {
                            if p_target == q_target {
                                continue;
                            }
                            let successors = pair_key(*p_target, *q_target);
                            if table[&successors] {
                                table.insert((p, q), true);
                                changed = true;
                                break;
                            }
                        }
                        (None, None) => {}
                        // Only one of the two has a transition on c
                        _ => {
                            table.insert((p, q), true);
                            changed = true;
                            break;
                        }
                    }
                }
            }
        }
    }

    // 3. Union every unmarked pair into equivalence classes
    let mut parent: Vec<usize> = (0..num_states).collect();
    for p in 0..num_states {
        for q in (p + 1)..num_states {
            if !table[&(p, q)] {
                union(&mut parent, p, q);
            }
        }
    }

    // 4. Rebuild: walking ids in ascending order means each class is created
    // at its representative, which is the class minimum
    let mut result = DFA::new();
    result.alphabet = dfa.get_alphabet().clone();

    let mut state_map: HashMap<usize, usize> = HashMap::new();
    for old in 0..num_states {
        let root = find(&mut parent, old);
        if !state_map.contains_key(&root) {
            let names = dfa.get_state(root).get_names().clone();
            let new_id = result.add_named_state(names);
            if accept_states[root] {
                result.set_accept_state(new_id);
            }
            state_map.insert(root, new_id);
        }
    }

    // Transitions of merged states collapse onto one entry; unmarked pairs
    // are equivalent, so the collapsed entries always agree
    for old in 0..num_states {
        let source = state_map[&find(&mut parent, old)];
        for (symbol, target) in dfa.get_state(old).get_transitions() {
            let target = state_map[&find(&mut parent, *target)];
            result.add_transition(source, symbol.clone(), target);
        }
    }

    result.start_state = state_map[&find(&mut parent, dfa.get_start_state())];
    result.set_regex(dfa.get_regex().to_string());
    result
}

#[cfg(test)]
mod dfa_tests {
    use super::{construct_dfa, construct_minimal_dfa, get_epsilon_closure};
    use crate::fa::{Symbol, FA};
    use crate::nfa::construct_nfa;
    use bitvec::prelude::*;
    use std::collections::HashSet;

    fn alphabet_ab() -> HashSet<char> {
        HashSet::from(['a', 'b'])
    }

    #[test]
    fn test_epsilon_closure_includes_seed() {
        let nfa = construct_nfa("a*").unwrap();
        let mut seed = BitVec::repeat(false, nfa.get_num_states());
        seed.set(nfa.get_start_state(), true);

        let closure = get_epsilon_closure(&nfa, &seed);
        assert!(closure[nfa.get_start_state()]);
        // The star start reaches both the inner start and the end
        assert!(closure[0]);
        assert!(closure[nfa.get_end_state()]);
    }

    #[test]
    fn test_subset_construction_literal() {
        let nfa = construct_nfa("a").unwrap();
        let dfa = construct_dfa(&nfa, &alphabet_ab());

        assert_eq!(dfa.get_num_states(), 2);
        assert!(!dfa.get_acceptor_states()[dfa.get_start_state()]);
        assert_eq!(dfa.get_acceptor_states().count_ones(), 1);
    }

    #[test]
    fn test_subset_construction_name_sets_unique() {
        let nfa = construct_nfa("(a|b)*abb").unwrap();
        let dfa = construct_dfa(&nfa, &alphabet_ab());

        let mut seen = HashSet::new();
        for id in 0..dfa.get_num_states() {
            let names = dfa.get_state(id).get_names().clone();
            assert!(seen.insert(names), "Duplicate name set for state {}", id);
        }
    }

    #[test]
    fn test_subset_construction_soundness() {
        let nfa = construct_nfa("(a|b)*abb").unwrap();
        let dfa = construct_dfa(&nfa, &alphabet_ab());

        assert!(dfa.accepts("abb"));
        assert!(dfa.accepts("aabb"));
        assert!(dfa.accepts("babb"));
        assert!(dfa.accepts("abababb"));
        assert!(!dfa.accepts(""));
        assert!(!dfa.accepts("ab"));
        assert!(!dfa.accepts("abba"));
        assert!(!dfa.accepts("c"));
    }

    #[test]
    fn test_minimal_dfa_star_is_single_state() {
        let nfa = construct_nfa("(a|b)*").unwrap();
        let dfa = construct_dfa(&nfa, &alphabet_ab());
        let minimal = construct_minimal_dfa(&dfa);

        assert_eq!(minimal.get_num_states(), 1);
        let start = minimal.get_start_state();
        assert!(minimal.get_acceptor_states()[start]);

        let transitions = minimal.get_state(start).get_transitions();
        assert_eq!(transitions.get(&Symbol::Char('a')), Some(&start));
        assert_eq!(transitions.get(&Symbol::Char('b')), Some(&start));
    }

    #[test]
    fn test_minimal_dfa_literal_has_no_dead_state() {
        let nfa = construct_nfa("a").unwrap();
        let dfa = construct_dfa(&nfa, &alphabet_ab());
        let minimal = construct_minimal_dfa(&dfa);

        assert_eq!(minimal.get_num_states(), 2);

        // Rejection is a missing transition, not a materialized dead state
        let accept_id = minimal.get_acceptor_states().iter_ones().next().unwrap();
        assert!(minimal.get_state(accept_id).get_transitions().is_empty());
    }

    #[test]
    fn test_minimal_dfa_merges_equivalent_accepts() {
        // a|b gives two accepting DFA states with identical behavior
        let nfa = construct_nfa("a|b").unwrap();
        let dfa = construct_dfa(&nfa, &alphabet_ab());
        assert_eq!(dfa.get_num_states(), 3);

        let minimal = construct_minimal_dfa(&dfa);
        assert_eq!(minimal.get_num_states(), 2);
        assert!(minimal.accepts("a"));
        assert!(minimal.accepts("b"));
        assert!(!minimal.accepts("ab"));
    }

    #[test]
    fn test_minimizer_soundness() {
        let inputs = [
            "", "a", "b", "ab", "ba", "abb", "aabb", "abab", "ababb", "bbabb", "abba",
        ];
        for regex in ["(a|b)*abb", "a(a|b)*", "ab+a?", "(ab)*(ba)*"] {
            let nfa = construct_nfa(regex).unwrap();
            let dfa = construct_dfa(&nfa, &alphabet_ab());
            let minimal = construct_minimal_dfa(&dfa);

            assert!(minimal.get_num_states() <= dfa.get_num_states());
            for input in inputs {
                assert_eq!(
                    dfa.accepts(input),
                    minimal.accepts(input),
                    "Acceptance of {:?} changed after minimizing {}",
                    input,
                    regex
                );
            }
        }
    }

    #[test]
    fn test_minimizer_leaves_input_untouched() {
        let nfa = construct_nfa("(a|b)*").unwrap();
        let dfa = construct_dfa(&nfa, &alphabet_ab());
        let before = dfa.get_num_states();

        let _ = construct_minimal_dfa(&dfa);
        assert_eq!(dfa.get_num_states(), before);
        assert!(dfa.accepts("ab"));
    }
}
