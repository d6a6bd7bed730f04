/* Longest-match scanner. Every rule's DFA is simulated at the current
 * position; the winning candidate is the longest match, with rule priority
 * breaking length ties and registration order breaking priority ties. */

use crate::dfa::DFA;
use crate::fa::{Symbol, FA};
use color_eyre::eyre::{Report, Result};
use std::cmp::Reverse;

#[derive(Debug)]
pub enum ScanError {
    UnrecognizedCharacter { character: char, position: usize },
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::UnrecognizedCharacter {
                character,
                position,
            } => {
                write!(
                    f,
                    "Error: No valid token found at position {} for character '{}'",
                    position, character
                )
            }
        }
    }
}

impl std::error::Error for ScanError {}

/// A lexeme recognized by the scanner, tagged with its syntactic category
/// and its starting offset in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    category: String,
    token: String,
    position: usize,
}

impl Token {
    fn new(category: &str, token: String, position: usize) -> Self {
        Token {
            category: category.to_string(),
            token,
            position,
        }
    }

    pub fn get_category(&self) -> &str {
        &self.category
    }

    pub fn get_token(&self) -> &str {
        &self.token
    }

    pub fn get_position(&self) -> usize {
        self.position
    }
}

#[derive(Debug)]
pub struct TokenRule {
    dfa: DFA,
    category: String,
    priority: i32,
}

impl TokenRule {
    pub fn new(dfa: DFA, category: &str, priority: i32) -> Self {
        TokenRule {
            dfa,
            category: category.to_string(),
            priority,
        }
    }

    pub fn get_dfa(&self) -> &DFA {
        &self.dfa
    }

    pub fn get_category(&self) -> &str {
        &self.category
    }

    pub fn get_priority(&self) -> i32 {
        self.priority
    }
}

// A candidate produced by walking one rule at one position
#[derive(Debug)]
struct TokenMatch {
    length: usize,
    priority: i32,
    rule_index: usize,
}

#[derive(Debug, Default)]
pub struct Tokenizer {
    rules: Vec<TokenRule>,
}

impl Tokenizer {
    pub fn new() -> Self {
        Tokenizer { rules: Vec::new() }
    }

    /// Register a rule. The rule list is re-sorted by descending priority;
    /// the sort is stable, so registration order survives inside a priority
    /// level and stays available as the final tie-breaker.
    pub fn add_rule(&mut self, dfa: DFA, category: &str, priority: i32) {
        self.rules.push(TokenRule::new(dfa, category, priority));
        self.rules.sort_by_key(|rule| Reverse(rule.priority));
    }

    pub fn get_rules(&self) -> &Vec<TokenRule> {
        &self.rules
    }

    /// Split the input into tokens, left to right. Fails on the first
    /// position where no rule matches.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>> {
        let chars: Vec<char> = input.chars().collect();
        let mut tokens = Vec::new();
        let mut position = 0;

        while position < chars.len() {
            let best = match self.find_best_match(&chars, position) {
                Some(best) => best,
                None => {
                    let err = ScanError::UnrecognizedCharacter {
                        character: chars[position],
                        position,
                    };
                    return Err(Report::new(err));
                }
            };
            let lexeme: String = chars[position..position + best.length].iter().collect();
            let category = self.rules[best.rule_index].get_category();
            tokens.push(Token::new(category, lexeme, position));
            position += best.length;
        }

        Ok(tokens)
    }

    // Walk every rule and keep the strictly best candidate. Rules are
    // visited in descending priority order, so on a full (length, priority)
    // tie the earliest registered rule wins.
    fn find_best_match(&self, input: &[char], position: usize) -> Option<TokenMatch> {
        let mut best: Option<TokenMatch> = None;

        for (rule_index, rule) in self.rules.iter().enumerate() {
            let length = match try_match(rule, input, position) {
                Some(length) => length,
                None => continue,
            };
            let candidate = TokenMatch {
                length,
                priority: rule.priority,
                rule_index,
            };
            best = match best {
                None => Some(candidate),
                Some(best) => {
                    if candidate.length > best.length
                        || (candidate.length == best.length && candidate.priority > best.priority)
                    {
                        Some(candidate)
                    } else {
                        Some(best)
                    }
                }
            };
        }
        best
    }
}

// Walk the rule's DFA from the given position. The walk halts as soon as
// the current state has no transition on the current character; the length
// of the longest prefix that ended in an accept state is the match.
fn try_match(rule: &TokenRule, input: &[char], start_pos: usize) -> Option<usize> {
    let dfa = rule.get_dfa();
    let accept_states = dfa.get_acceptor_states();

    let mut max_length = 0;
    let mut state = dfa.get_start_state();
    let mut current_pos = start_pos;

    while current_pos < input.len() {
        let transitions = dfa.get_state(state).get_transitions();
        state = match transitions.get(&Symbol::Char(input[current_pos])) {
            Some(target) => *target,
            None => break,
        };
        if accept_states[state] {
            max_length = current_pos - start_pos + 1;
        }
        current_pos += 1;
    }

    if max_length > 0 {
        Some(max_length)
    } else {
        None
    }
}

#[cfg(test)]
mod scanner_tests {
    use super::{ScanError, Tokenizer};
    use crate::dfa::{construct_dfa, construct_minimal_dfa, DFA};
    use crate::nfa::construct_nfa;
    use std::collections::HashSet;

    fn compile(regex: &str, alphabet: &HashSet<char>) -> DFA {
        let nfa = construct_nfa(regex).unwrap();
        let dfa = construct_dfa(&nfa, alphabet);
        construct_minimal_dfa(&dfa)
    }

    fn alphabet() -> HashSet<char> {
        let mut alphabet: HashSet<char> = ('a'..='z').collect();
        alphabet.extend('0'..='9');
        alphabet
    }

    #[test]
    fn test_longest_match_wins() {
        let sigma = alphabet();
        let mut tokenizer = Tokenizer::new();
        tokenizer.add_rule(compile("i", &sigma), "LETTER_I", 2);
        tokenizer.add_rule(compile("if", &sigma), "KEYWORD_IF", 1);

        // Lower priority but longer, so the keyword wins
        let tokens = tokenizer.tokenize("if").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].get_category(), "KEYWORD_IF");
        assert_eq!(tokens[0].get_token(), "if");
    }

    #[test]
    fn test_priority_breaks_length_ties() {
        let sigma = alphabet();
        let mut tokenizer = Tokenizer::new();
        tokenizer.add_rule(compile("x", &sigma), "LOW", 1);
        tokenizer.add_rule(compile("x", &sigma), "HIGH", 9);

        let tokens = tokenizer.tokenize("x").unwrap();
        assert_eq!(tokens[0].get_category(), "HIGH");
    }

    #[test]
    fn test_registration_order_breaks_priority_ties() {
        let sigma = alphabet();
        let mut tokenizer = Tokenizer::new();
        tokenizer.add_rule(compile("x", &sigma), "FIRST", 5);
        tokenizer.add_rule(compile("x", &sigma), "SECOND", 5);

        let tokens = tokenizer.tokenize("x").unwrap();
        assert_eq!(tokens[0].get_category(), "FIRST");
    }

    #[test]
    fn test_positions_are_contiguous() {
        let sigma = alphabet();
        let mut tokenizer = Tokenizer::new();
        tokenizer.add_rule(compile("ab+", &sigma), "AB", 2);
        tokenizer.add_rule(compile("c", &sigma), "C", 1);

        let input = "abbcab";
        let tokens = tokenizer.tokenize(input).unwrap();

        let mut expected_position = 0;
        let mut rebuilt = String::new();
        for token in &tokens {
            assert_eq!(token.get_position(), expected_position);
            expected_position += token.get_token().len();
            rebuilt.push_str(token.get_token());
        }
        assert_eq!(rebuilt, input);
    }

    #[test]
    fn test_unrecognized_character_reports_position() {
        let sigma = alphabet();
        let mut tokenizer = Tokenizer::new();
        tokenizer.add_rule(compile("ab", &sigma), "AB", 1);

        let result = tokenizer.tokenize("abq");
        assert!(result.is_err());
        match result.unwrap_err().downcast_ref().unwrap() {
            ScanError::UnrecognizedCharacter {
                character,
                position,
            } => {
                assert_eq!(*character, 'q');
                assert_eq!(*position, 2);
            }
        }
    }

    #[test]
    fn test_no_implicit_whitespace_skipping() {
        let sigma: HashSet<char> = HashSet::from(['a', ' ']);
        let mut tokenizer = Tokenizer::new();
        tokenizer.add_rule(compile("a", &sigma), "A", 1);

        // Whitespace is not a rule here, so it must fail
        let result = tokenizer.tokenize("a a");
        assert!(result.is_err());

        tokenizer.add_rule(compile(" ", &sigma), "SPACE", 0);
        let tokens = tokenizer.tokenize("a a").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].get_category(), "SPACE");
    }
}
