/* Rule registration facade. Compiles each microsyntax rule through the
 * rewrite -> NFA -> DFA -> minimal DFA pipeline, allocates descending
 * priorities in registration order, and hands the result to the scanner. */

use color_eyre::eyre::{Result, WrapErr};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use crate::dfa::{construct_dfa, construct_minimal_dfa, DFA};
use crate::nfa::construct_nfa;
use crate::scanner::Tokenizer;

// Registration order hands out priorities downward from here
const PRIORITY_BASE: i32 = 1000;

#[derive(Debug)]
pub enum BuildError {
    RuleCompilation { category: String, regex: String },
    MalformedMicrosyntax(String),
    FileOpen(String),
    FileRead(String),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::RuleCompilation { category, regex } => {
                write!(
                    f,
                    "Error compiling rule for category {} with regex {}",
                    category, regex
                )
            }
            BuildError::MalformedMicrosyntax(line) => {
                write!(f, "Error: Malformed microsyntax entry detected: {}", line)
            }
            BuildError::FileOpen(err_line) => write!(f, "{}", err_line),
            BuildError::FileRead(err_line) => write!(f, "{}", err_line),
        }
    }
}

impl std::error::Error for BuildError {}

/// Compile a single regex into a minimized DFA over the given alphabet.
pub fn compile_regex_to_dfa(regex: &str, alphabet: &HashSet<char>) -> Result<DFA> {
    let nfa = construct_nfa(regex)?;
    let dfa = construct_dfa(&nfa, alphabet);
    Ok(construct_minimal_dfa(&dfa))
}

#[derive(Debug, Default)]
pub struct TokenizerBuilder {}

impl TokenizerBuilder {
    pub fn new() -> Self {
        TokenizerBuilder {}
    }

    /// Build a tokenizer from (regex, category) pairs and an explicit
    /// alphabet. Earlier entries get higher priorities, so registration
    /// order doubles as the conflict preference. A rule that fails to
    /// compile reports the category it was defining.
    pub fn build_tokenizer(
        &self,
        rule_list: Vec<(String, String)>,
        alphabet: &HashSet<char>,
    ) -> Result<Tokenizer> {
        let mut tokenizer = Tokenizer::new();
        let mut priority = PRIORITY_BASE;

        for (regex, category) in rule_list {
            let dfa = compile_regex_to_dfa(&regex, alphabet).wrap_err_with(|| {
                BuildError::RuleCompilation {
                    category: category.clone(),
                    regex: regex.clone(),
                }
            })?;
            tokenizer.add_rule(dfa, &category, priority);
            priority -= 1;
        }

        Ok(tokenizer)
    }
}

/// Read a microsyntax file of `regex::CATEGORY` lines into (regex, category)
/// pairs, preserving line order.
pub fn read_microsyntax_file(file_path: &str) -> Result<Vec<(String, String)>, BuildError> {
    let file_path = PathBuf::from(file_path);

    let file = match File::open(file_path) {
        Ok(file) => file,
        Err(error) => {
            let err_line = format!("Error: Failed to open the microsyntax file {}", error);
            return Err(BuildError::FileOpen(err_line));
        }
    };
    let reader = BufReader::new(file);

    let mut rule_list: Vec<(String, String)> = Vec::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                let err_line = format!(
                    "Error: Failed to read line number {} in microsyntax file {}",
                    line_number, error
                );
                return Err(BuildError::FileRead(err_line));
            }
        };

        if line.is_empty() {
            continue;
        }

        let content: Vec<&str> = line.split("::").collect();

        if content.len() != 2 {
            return Err(BuildError::MalformedMicrosyntax(line.to_string()));
        }

        rule_list.push((content[0].to_string(), content[1].to_string()));
    }

    Ok(rule_list)
}
