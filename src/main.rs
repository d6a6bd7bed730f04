use clap::{Arg, Command};
use color_eyre::eyre::Result;
use std::collections::HashSet;

use lexforge::{
    construct_dfa, construct_minimal_dfa, construct_nfa, read_microsyntax_file, save_fa,
    TokenizerBuilder,
};

fn default_alphabet() -> HashSet<char> {
    let mut alphabet: HashSet<char> = (32u8..=126).map(|ch| ch as char).collect();
    alphabet.insert('\t');
    alphabet.insert('\n');
    alphabet
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Command::new("lexforge")
        .version("0.1.0")
        .about("A lexer generator: compiles microsyntax rules into minimal DFAs and tokenizes input with them")
        .arg(
            Arg::new("rules")
                .short('r')
                .value_name("RULES")
                .help("Path to the microsyntax file with regex::CATEGORY lines")
                .required(true),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .value_name("INPUT")
                .help("Path to the input file to tokenize")
                .required(true),
        )
        .arg(
            Arg::new("alphabet")
                .short('a')
                .value_name("ALPHABET")
                .help("The input alphabet as a literal character string, printable ASCII if omitted"),
        )
        .arg(
            Arg::new("save-nfa")
                .short('n')
                .help("Save the NFA after Thompson Construction of each rule")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("save-dfa")
                .short('d')
                .help("Save the un-optimized DFA obtained after Subset Construction of each rule")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("save-minimal-dfa")
                .short('m')
                .help("Save the minimal DFA after the table-filling minimization of each rule")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let rule_file = args.get_one::<String>("rules").unwrap();
    let input_file = args.get_one::<String>("input").unwrap();

    let alphabet = match args.get_one::<String>("alphabet") {
        Some(chars) => chars.chars().collect(),
        None => default_alphabet(),
    };

    let save_nfa = args.get_flag("save-nfa");
    let save_dfa = args.get_flag("save-dfa");
    let save_minimal_dfa = args.get_flag("save-minimal-dfa");

    let rule_list = read_microsyntax_file(rule_file)?;

    if save_nfa || save_dfa || save_minimal_dfa {
        for (regex, category) in rule_list.iter() {
            let nfa = construct_nfa(regex)?;
            if save_nfa {
                save_fa(&nfa, &format!("{}_nfa", category))?;
            }
            let dfa = construct_dfa(&nfa, &alphabet);
            if save_dfa {
                save_fa(&dfa, &format!("{}_dfa", category))?;
            }
            if save_minimal_dfa {
                let minimal_dfa = construct_minimal_dfa(&dfa);
                save_fa(&minimal_dfa, &format!("{}_minimal_dfa", category))?;
            }
        }
    }

    let tokenizer = TokenizerBuilder::new().build_tokenizer(rule_list, &alphabet)?;

    let input = std::fs::read_to_string(input_file)?;
    let token_list = tokenizer.tokenize(&input)?;

    for token in token_list {
        println!(
            "{}: {:?} at position {}",
            token.get_category(),
            token.get_token(),
            token.get_position()
        );
    }

    Ok(())
}
