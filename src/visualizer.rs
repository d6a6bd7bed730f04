use petgraph::dot::Dot;
use petgraph::graph::DiGraph;
use std::fs::File;
use std::io::Write;
use std::process::Command;

use color_eyre::eyre::Result;

use crate::fa::{Symbol, FA};

fn generate_dot<T: FA>(fa: &T) -> String {
    let mut graph = DiGraph::new();
    let mut node_map = std::collections::HashMap::new();

    // Add nodes
    for state in 0..fa.get_num_states() {
        let node = graph.add_node(format!("State {}", state));
        node_map.insert(state, node);
    }

    // Add edges
    for state in 0..fa.get_num_states() {
        for (symbol, target) in fa.get_state_transitions(state) {
            let symbol_str = match symbol {
                Symbol::Char(c) => c.to_string(),
                Symbol::Epsilon => "𝛆".to_string(),
            };
            graph.add_edge(node_map[&state], node_map[&target], symbol_str);
        }
    }

    // Mark Start and Accept States

    let start_node = node_map[&fa.get_start_state()];
    graph[start_node] = format!("Start\nState {}", fa.get_start_state());

    for accept in fa.get_acceptor_states().iter_ones() {
        let accept_node = node_map[&accept];
        graph[accept_node] = graph[accept_node].clone() + &format!("\nAccept\nState {}", accept);
    }

    Dot::new(&graph).to_string()
}

/// Save the finite automaton as a Graphviz dot file and render it to a jpg
/// when the dot binary is available.
pub fn save_fa<T: FA>(fa: &T, filename: &str) -> Result<()> {
    let dot = generate_dot(fa);

    let dot_filename = format!("{}.dot", filename);
    let mut dot_file = File::create(&dot_filename)?;
    dot_file.write_all(dot.as_bytes())?;

    let rendered = Command::new("dot")
        .args(["-Tjpg", &dot_filename, "-o", &format!("{}.jpg", filename)])
        .output();

    match rendered {
        Ok(_) => println!("FA visualization saved as {}.jpg", filename),
        Err(_) => println!("Graphviz not available, dot file saved as {}", dot_filename),
    }

    Ok(())
}
