use color_eyre::eyre::{Report, Result};
use std::collections::HashSet;

// The empty production body is a terminal spelled "ε"; the end of input
// marker is the terminal "$"
pub const EPSILON: &str = "ε";
pub const END_MARKER: &str = "$";

#[derive(Debug)]
pub enum GrammarError {
    UnknownStartSymbol(String),
}

impl std::fmt::Display for GrammarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarError::UnknownStartSymbol(name) => {
                write!(
                    f,
                    "Error: Start symbol {} is not a non-terminal of the grammar",
                    name
                )
            }
        }
    }
}

impl std::error::Error for GrammarError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
}

/// A named grammar atom, either terminal or non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    name: String,
    kind: SymbolKind,
}

impl Symbol {
    pub fn terminal(name: &str) -> Self {
        Symbol {
            name: name.to_string(),
            kind: SymbolKind::Terminal,
        }
    }

    pub fn non_terminal(name: &str) -> Self {
        Symbol {
            name: name.to_string(),
            kind: SymbolKind::NonTerminal,
        }
    }

    pub fn epsilon() -> Self {
        Symbol::terminal(EPSILON)
    }

    pub fn end_marker() -> Self {
        Symbol::terminal(END_MARKER)
    }

    pub fn is_epsilon(&self) -> bool {
        self.name == EPSILON
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_kind(&self) -> SymbolKind {
        self.kind
    }
}

/// A production: one non-terminal on the left, an ordered symbol sequence on
/// the right. The right side may be the singleton ε.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    left: Symbol,
    right: Vec<Symbol>,
}

impl Production {
    pub fn new(left: Symbol, right: Vec<Symbol>) -> Self {
        Production { left, right }
    }

    pub fn get_left(&self) -> &Symbol {
        &self.left
    }

    pub fn get_right(&self) -> &Vec<Symbol> {
        &self.right
    }
}

#[derive(Debug)]
pub struct Grammar {
    terminals: HashSet<Symbol>,
    non_terminals: HashSet<Symbol>,
    productions: Vec<Production>,
    start_symbol: Symbol,
}

impl Grammar {
    /// Assemble a grammar. The start symbol must be one of the registered
    /// non-terminals.
    pub fn new(
        terminals: HashSet<Symbol>,
        non_terminals: HashSet<Symbol>,
        productions: Vec<Production>,
        start_symbol: Symbol,
    ) -> Result<Self> {
        if !non_terminals.contains(&start_symbol) {
            let err = GrammarError::UnknownStartSymbol(start_symbol.get_name().to_string());
            return Err(Report::new(err));
        }
        Ok(Grammar {
            terminals,
            non_terminals,
            productions,
            start_symbol,
        })
    }

    pub fn get_terminals(&self) -> &HashSet<Symbol> {
        &self.terminals
    }

    pub fn get_non_terminals(&self) -> &HashSet<Symbol> {
        &self.non_terminals
    }

    pub fn get_productions(&self) -> &Vec<Production> {
        &self.productions
    }

    pub fn get_start_symbol(&self) -> &Symbol {
        &self.start_symbol
    }
}

#[cfg(test)]
mod grammar_tests {
    use super::{Grammar, GrammarError, Production, Symbol};
    use std::collections::HashSet;

    #[test]
    fn test_start_symbol_must_be_non_terminal() {
        let s = Symbol::non_terminal("S");
        let a = Symbol::terminal("a");

        let terminals = HashSet::from([a.clone()]);
        let non_terminals = HashSet::from([s.clone()]);
        let productions = vec![Production::new(s, vec![a])];

        let result = Grammar::new(
            terminals,
            non_terminals,
            productions,
            Symbol::non_terminal("T"),
        );
        assert!(result.is_err());
        match result.unwrap_err().downcast_ref().unwrap() {
            GrammarError::UnknownStartSymbol(name) => assert_eq!(name, "T"),
        }
    }

    #[test]
    fn test_epsilon_is_a_named_terminal() {
        let epsilon = Symbol::epsilon();
        assert!(epsilon.is_epsilon());
        assert_eq!(epsilon, Symbol::terminal("ε"));
        assert_ne!(epsilon, Symbol::non_terminal("ε"));
    }
}
