/* FIRST and FOLLOW set computation over a grammar. Both are fixed-point
 * iterations of set unions over a finite symbol universe, so every sweep is
 * monotone and termination is guaranteed. */

use std::collections::{HashMap, HashSet};

use crate::grammar::{Grammar, Symbol, SymbolKind};

pub struct StaticAnalyzer<'g> {
    grammar: &'g Grammar,
}

impl<'g> StaticAnalyzer<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        StaticAnalyzer { grammar }
    }

    /// Compute FIRST for every grammar symbol. FIRST of a terminal is the
    /// terminal itself; FIRST of a non-terminal accumulates over its
    /// productions until no sweep adds a symbol.
    pub fn first_sets(&self) -> HashMap<Symbol, HashSet<Symbol>> {
        let mut first_sets: HashMap<Symbol, HashSet<Symbol>> = HashMap::new();

        for symbol in self.grammar.get_non_terminals() {
            first_sets.insert(symbol.clone(), HashSet::new());
        }
        for symbol in self.grammar.get_terminals() {
            let mut set = HashSet::new();
            set.insert(symbol.clone());
            first_sets.insert(symbol.clone(), set);
        }

        // Reusable buffer: additions are staged while reading the map and
        // applied afterwards
        let mut symbols_to_add: Vec<Symbol> = Vec::new();

        let mut changed = true;
        while changed {
            changed = false;

            for production in self.grammar.get_productions() {
                let left = production.get_left();
                let right = production.get_right();
                symbols_to_add.clear();

                if right.len() == 1 && right[0].is_epsilon() {
                    symbols_to_add.push(Symbol::epsilon());
                } else {
                    let mut all_derive_epsilon = true;

                    for item in right {
                        let first_item = first_sets.get(item);

                        let derives_epsilon = match first_item {
                            Some(first_item) => {
                                for symbol in first_item {
                                    if !symbol.is_epsilon() {
                                        symbols_to_add.push(symbol.clone());
                                    }
                                }
                                first_item.iter().any(|symbol| symbol.is_epsilon())
                            }
                            None => false,
                        };

                        if !derives_epsilon {
                            all_derive_epsilon = false;
                            break;
                        }
                    }

                    if all_derive_epsilon {
                        symbols_to_add.push(Symbol::epsilon());
                    }
                }

                if let Some(first_left) = first_sets.get_mut(left) {
                    for symbol in symbols_to_add.drain(..) {
                        if first_left.insert(symbol) {
                            changed = true;
                        }
                    }
                }
            }
        }

        first_sets
    }

    /// Compute FOLLOW for every non-terminal. FOLLOW of the start symbol
    /// seeds with the end marker; each production then propagates the FIRST
    /// of what comes after a non-terminal, falling through to the
    /// producer's FOLLOW across nullable tails.
    pub fn follow_sets(&self) -> HashMap<Symbol, HashSet<Symbol>> {
        let first_sets = self.first_sets();

        let mut follow_sets: HashMap<Symbol, HashSet<Symbol>> = HashMap::new();
        for symbol in self.grammar.get_non_terminals() {
            follow_sets.insert(symbol.clone(), HashSet::new());
        }

        // The grammar constructor guarantees the start symbol is registered
        if let Some(follow_start) = follow_sets.get_mut(self.grammar.get_start_symbol()) {
            follow_start.insert(Symbol::end_marker());
        }

        let mut symbols_to_add: Vec<Symbol> = Vec::new();

        let mut changed = true;
        while changed {
            changed = false;

            for production in self.grammar.get_productions() {
                let left = production.get_left();
                let right = production.get_right();

                for (position, item) in right.iter().enumerate() {
                    if item.get_kind() != SymbolKind::NonTerminal {
                        continue;
                    }
                    symbols_to_add.clear();

                    let mut tail_derives_epsilon = true;
                    for successor in &right[position + 1..] {
                        let first_successor = first_sets.get(successor);

                        let derives_epsilon = match first_successor {
                            Some(first_successor) => {
                                for symbol in first_successor {
                                    if !symbol.is_epsilon() {
                                        symbols_to_add.push(symbol.clone());
                                    }
                                }
                                first_successor.iter().any(|symbol| symbol.is_epsilon())
                            }
                            None => false,
                        };

                        if !derives_epsilon {
                            tail_derives_epsilon = false;
                            break;
                        }
                    }

                    if tail_derives_epsilon {
                        if let Some(follow_left) = follow_sets.get(left) {
                            symbols_to_add.extend(follow_left.iter().cloned());
                        }
                    }

                    if let Some(follow_item) = follow_sets.get_mut(item) {
                        for symbol in symbols_to_add.drain(..) {
                            if follow_item.insert(symbol) {
                                changed = true;
                            }
                        }
                    }
                }
            }
        }

        follow_sets
    }
}
