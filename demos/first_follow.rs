use std::collections::HashSet;

use lexforge::grammar::{Grammar, Production, Symbol};
use lexforge::StaticAnalyzer;

fn main() {
    // S -> a S b | ε
    let s = Symbol::non_terminal("S");
    let a = Symbol::terminal("a");
    let b = Symbol::terminal("b");
    let epsilon = Symbol::epsilon();

    let terminals = HashSet::from([a.clone(), b.clone(), epsilon.clone()]);
    let non_terminals = HashSet::from([s.clone()]);

    let productions = vec![
        Production::new(s.clone(), vec![a.clone(), s.clone(), b.clone()]),
        Production::new(s.clone(), vec![epsilon.clone()]),
    ];

    let grammar = Grammar::new(terminals, non_terminals, productions, s.clone()).unwrap();
    let analyzer = StaticAnalyzer::new(&grammar);

    let first = analyzer.first_sets();
    let follow = analyzer.follow_sets();

    println!("FIRST(S):");
    for symbol in &first[&s] {
        println!("  {}", symbol.get_name());
    }

    println!("FOLLOW(S):");
    for symbol in &follow[&s] {
        println!("  {}", symbol.get_name());
    }
}
