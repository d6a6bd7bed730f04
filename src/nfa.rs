/* Thompson construction of an NFA from the postfix form produced by the
 * shunting module. Fragments are (start, end) pairs into a single state
 * arena, combined by a stack walk over the postfix string. */

use bitvec::prelude::*;
use color_eyre::eyre::{Report, Result};
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use crate::fa::{FAState, Symbol, FA};
use crate::shunting::{self, RegexError};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NFAState {
    id: usize,
    transitions: HashMap<Symbol, HashSet<usize>>,
}

#[derive(Debug)]
pub struct NFA {
    states: Vec<NFAState>,
    start_state: usize,
    end_state: usize,
    accept_states: BitVec<u8>,
    alphabet: HashSet<char>,
    regex: String,
}

impl Hash for NFAState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl FAState for NFAState {
    fn add_transition(&mut self, symbol: Symbol, to: usize) {
        self.transitions.entry(symbol).or_default().insert(to);
    }
}

impl NFAState {
    fn new(id: usize) -> Self {
        NFAState {
            id,
            transitions: HashMap::new(),
        }
    }

    pub fn get_transitions(&self) -> &HashMap<Symbol, HashSet<usize>> {
        &self.transitions
    }

    pub fn get_id(&self) -> usize {
        self.id
    }
}

impl FA for NFA {
    fn add_transition(&mut self, from: usize, symbol: Symbol, to: usize) {
        self.states[from].add_transition(symbol, to);
    }

    fn set_accept_state(&mut self, state_id: usize) {
        self.accept_states.set(state_id, true);
    }

    fn add_state(&mut self) -> usize {
        let state_id = self.states.len();
        let new_state = NFAState::new(state_id);
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
        let mut transitions = Vec::new();
        for (symbol, targets) in self.states[state_id].get_transitions() {
            for target in targets {
                transitions.push((symbol.clone(), *target));
            }
        }
        transitions
    }
}

impl NFA {
    fn new() -> Self {
        NFA {
            states: Vec::new(),
            start_state: 0,
            end_state: 0,
            accept_states: BitVec::new(),
            alphabet: HashSet::new(),
            regex: String::new(),
        }
    }

    pub fn get_state(&self, id: usize) -> &NFAState {
        match self.states.get(id) {
            Some(state) => state,
            None => panic!("Invalid state index provided"),
        }
    }

    pub fn get_end_state(&self) -> usize {
        self.end_state
    }
}

/// A Thompson fragment: start and accepting end ids into the shared arena.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: usize,
    end: usize,
}

fn literal(nfa: &mut NFA, character: char) -> Fragment {
    let start = nfa.add_state();
    let end = nfa.add_state();
    nfa.alphabet.insert(character);
    nfa.add_transition(start, Symbol::Char(character), end);
    nfa.set_accept_state(end);
    Fragment { start, end }
}

fn concatenation(nfa: &mut NFA, first: Fragment, second: Fragment) -> Fragment {
    nfa.accept_states.set(first.end, false);
    nfa.add_transition(first.end, Symbol::Epsilon, second.start);
    Fragment {
        start: first.start,
        end: second.end,
    }
}

fn alternation(nfa: &mut NFA, first: Fragment, second: Fragment) -> Fragment {
    let start = nfa.add_state();
    let end = nfa.add_state();

    nfa.add_transition(start, Symbol::Epsilon, first.start);
    nfa.add_transition(start, Symbol::Epsilon, second.start);

    nfa.accept_states.set(first.end, false);
    nfa.accept_states.set(second.end, false);

    nfa.add_transition(first.end, Symbol::Epsilon, end);
    nfa.add_transition(second.end, Symbol::Epsilon, end);

    nfa.set_accept_state(end);
    Fragment { start, end }
}

fn kleene_star(nfa: &mut NFA, inner: Fragment) -> Fragment {
    let start = nfa.add_state();
    let end = nfa.add_state();

    nfa.add_transition(start, Symbol::Epsilon, inner.start);
    nfa.add_transition(start, Symbol::Epsilon, end);

    nfa.accept_states.set(inner.end, false);
    nfa.add_transition(inner.end, Symbol::Epsilon, inner.start);
    nfa.add_transition(inner.end, Symbol::Epsilon, end);

    nfa.set_accept_state(end);
    Fragment { start, end }
}

// Like star but without the start to end epsilon, so the inner fragment is
// traversed at least once.
fn plus(nfa: &mut NFA, inner: Fragment) -> Fragment {
    let start = nfa.add_state();
    let end = nfa.add_state();

    nfa.add_transition(start, Symbol::Epsilon, inner.start);

    nfa.accept_states.set(inner.end, false);
    nfa.add_transition(inner.end, Symbol::Epsilon, inner.start);
    nfa.add_transition(inner.end, Symbol::Epsilon, end);

    nfa.set_accept_state(end);
    Fragment { start, end }
}

// Like star but without the loop back from the inner end to the inner start.
fn optional(nfa: &mut NFA, inner: Fragment) -> Fragment {
    let start = nfa.add_state();
    let end = nfa.add_state();

    nfa.add_transition(start, Symbol::Epsilon, inner.start);
    nfa.add_transition(start, Symbol::Epsilon, end);

    nfa.accept_states.set(inner.end, false);
    nfa.add_transition(inner.end, Symbol::Epsilon, end);

    nfa.set_accept_state(end);
    Fragment { start, end }
}

fn build_from_postfix(postfix: &str) -> Result<NFA> {
    let mut nfa = NFA::new();
    let mut stack: Vec<Fragment> = Vec::new();

    for ch in postfix.chars() {
        match ch {
            '·' => {
                let second = stack.pop();
                let first = stack.pop();
                match (first, second) {
                    (Some(first), Some(second)) => {
                        let fragment = concatenation(&mut nfa, first, second);
                        stack.push(fragment);
                    }
                    _ => {
                        let err = RegexError::MalformedPostfix(postfix.to_string());
                        return Err(Report::new(err));
                    }
                }
            }
            '|' => {
                let second = stack.pop();
                let first = stack.pop();
                match (first, second) {
                    (Some(first), Some(second)) => {
                        let fragment = alternation(&mut nfa, first, second);
                        stack.push(fragment);
                    }
                    _ => {
                        let err = RegexError::MalformedPostfix(postfix.to_string());
                        return Err(Report::new(err));
                    }
                }
            }
            '*' | '+' | '?' => {
                let inner = match stack.pop() {
                    Some(inner) => inner,
                    None => {
                        let err = RegexError::MalformedPostfix(postfix.to_string());
                        return Err(Report::new(err));
                    }
                };
                let fragment = match ch {
                    '*' => kleene_star(&mut nfa, inner),
                    '+' => plus(&mut nfa, inner),
                    _ => optional(&mut nfa, inner),
                };
                stack.push(fragment);
            }
            '(' | ')' => {
                // Parentheses never survive the shunting rewrite
                let err = RegexError::UnknownOperator(ch);
                return Err(Report::new(err));
            }
            _ => {
                let fragment = literal(&mut nfa, ch);
                stack.push(fragment);
            }
        }
    }

    if stack.len() != 1 {
        let err = RegexError::MalformedPostfix(postfix.to_string());
        return Err(Report::new(err));
    }

    let fragment = stack.pop().unwrap();
    nfa.start_state = fragment.start;
    nfa.end_state = fragment.end;
    Ok(nfa)
}

/// Construct an NFA from an infix regex using Thompson construction over its
/// postfix rewrite.
pub fn construct_nfa(regex: &str) -> Result<NFA> {
    let postfix = shunting::to_postfix(regex)?;
    let mut nfa = build_from_postfix(&postfix)?;
    nfa.regex = regex.to_string();
    Ok(nfa)
}

#[cfg(test)]
mod nfa_tests {
    use super::{build_from_postfix, construct_nfa};
    use crate::fa::{Symbol, FA};
    use crate::shunting::RegexError;

    #[test]
    fn test_literal_shape() {
        let nfa = construct_nfa("a").unwrap();
        assert_eq!(nfa.get_num_states(), 2);

        let start = nfa.get_state(nfa.get_start_state());
        let targets = start.get_transitions().get(&Symbol::Char('a')).unwrap();
        assert!(targets.contains(&nfa.get_end_state()));

        assert!(nfa.get_acceptor_states()[nfa.get_end_state()]);
        assert!(!nfa.get_acceptor_states()[nfa.get_start_state()]);
    }

    #[test]
    fn test_single_accept_state() {
        // Operators must unmark sub-fragment ends, one accept state remains
        for regex in ["ab", "a|b", "a*", "a+", "a?", "(a|b)*c"] {
            let nfa = construct_nfa(regex).unwrap();
            assert_eq!(
                nfa.get_acceptor_states().count_ones(),
                1,
                "Expected exactly one accept state for {}",
                regex
            );
            assert!(nfa.get_acceptor_states()[nfa.get_end_state()]);
        }
    }

    #[test]
    fn test_concatenation_links_fragments() {
        let nfa = construct_nfa("ab").unwrap();
        assert_eq!(nfa.get_num_states(), 4);

        // The end of the first literal is epsilon linked to the start of the
        // second and is no longer accepting
        let first_end = nfa.get_state(1);
        let epsilon_targets = first_end.get_transitions().get(&Symbol::Epsilon).unwrap();
        assert!(epsilon_targets.contains(&2));
        assert!(!nfa.get_acceptor_states()[1]);
    }

    #[test]
    fn test_star_loops_back() {
        let nfa = construct_nfa("a*").unwrap();
        // literal start/end plus new star start/end
        assert_eq!(nfa.get_num_states(), 4);

        let star_start = nfa.get_state(nfa.get_start_state());
        let targets = star_start.get_transitions().get(&Symbol::Epsilon).unwrap();
        assert!(targets.contains(&0), "star start must reach the inner start");
        assert!(
            targets.contains(&nfa.get_end_state()),
            "star start must skip to the end"
        );

        let inner_end = nfa.get_state(1);
        let targets = inner_end.get_transitions().get(&Symbol::Epsilon).unwrap();
        assert!(targets.contains(&0), "inner end must loop back");
        assert!(targets.contains(&nfa.get_end_state()));
    }

    #[test]
    fn test_plus_has_no_skip() {
        let nfa = construct_nfa("a+").unwrap();
        let plus_start = nfa.get_state(nfa.get_start_state());
        let targets = plus_start.get_transitions().get(&Symbol::Epsilon).unwrap();
        assert!(
            !targets.contains(&nfa.get_end_state()),
            "plus start must not skip the inner fragment"
        );
    }

    #[test]
    fn test_optional_has_no_loop() {
        let nfa = construct_nfa("a?").unwrap();
        let inner_end = nfa.get_state(1);
        let targets = inner_end.get_transitions().get(&Symbol::Epsilon).unwrap();
        assert!(!targets.contains(&0), "optional inner end must not loop back");
    }

    #[test]
    fn test_alphabet_collection() {
        let nfa = construct_nfa("(a|b)*c").unwrap();
        let alphabet = nfa.get_alphabet();
        assert_eq!(alphabet.len(), 3);
        assert!(alphabet.contains(&'a'));
        assert!(alphabet.contains(&'b'));
        assert!(alphabet.contains(&'c'));
    }

    #[test]
    fn test_malformed_postfix_extra_operand() {
        let result = build_from_postfix("ab");
        assert!(result.is_err());
        match result.unwrap_err().downcast_ref().unwrap() {
            RegexError::MalformedPostfix(_) => {}
            err => panic!("Expected MalformedPostfix, got {:?}", err),
        }
    }

    #[test]
    fn test_malformed_postfix_missing_operand() {
        let result = build_from_postfix("a·");
        assert!(result.is_err());
        match result.unwrap_err().downcast_ref().unwrap() {
            RegexError::MalformedPostfix(_) => {}
            err => panic!("Expected MalformedPostfix, got {:?}", err),
        }
    }

    #[test]
    fn test_unknown_operator_in_postfix() {
        let result = build_from_postfix("a(");
        assert!(result.is_err());
        match result.unwrap_err().downcast_ref().unwrap() {
            RegexError::UnknownOperator('(') => {}
            err => panic!("Expected UnknownOperator, got {:?}", err),
        }
    }
}
