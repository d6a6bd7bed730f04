//! # lexforge
//!
//! A lexical analysis toolkit built around the classic automaton pipeline:
//!
//! - Rewrite infix regexes to postfix with explicit concatenation
//! - Convert regexes to NFAs using Thompson Construction
//! - Convert NFAs to DFAs using Subset Construction
//! - Minimize DFAs with the table-filling algorithm
//! - Tokenize input under a longest-match, highest-priority discipline
//! - Compute FIRST and FOLLOW sets for context-free grammars
//! - Export the automata as Graphviz dot files

// Re-export the modules
pub mod analyzer;
pub mod builder;
pub mod dfa;
pub mod fa;
pub mod grammar;
pub mod nfa;
pub mod scanner;
pub mod shunting;
pub mod visualizer;

// Re-export commonly used items for convenience
pub use analyzer::StaticAnalyzer;
pub use builder::{compile_regex_to_dfa, read_microsyntax_file, TokenizerBuilder};
pub use dfa::{construct_dfa, construct_minimal_dfa};
pub use nfa::construct_nfa;
pub use scanner::{Token, Tokenizer};
pub use shunting::to_postfix;
pub use visualizer::save_fa;
