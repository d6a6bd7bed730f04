use std::collections::HashSet;

use lexforge::TokenizerBuilder;

fn main() {
    let mut rule_list: Vec<(String, String)> = Vec::new();

    rule_list.push(("if|while".to_string(), "KEYWORD".to_string()));
    rule_list.push(("(a|b|c)(a|b|c|0|1)*".to_string(), "IDENTIFIER".to_string()));
    rule_list.push(("(0|1)+".to_string(), "NUMBER".to_string()));
    rule_list.push(("=".to_string(), "ASSIGN".to_string()));
    rule_list.push((" +".to_string(), "WHITESPACE".to_string()));

    let mut alphabet: HashSet<char> = ('a'..='z').collect();
    alphabet.extend(['0', '1', '=', ' ']);

    let tokenizer = TokenizerBuilder::new()
        .build_tokenizer(rule_list, &alphabet)
        .unwrap();

    let token_list = tokenizer.tokenize("while ab1 = 101").unwrap();

    for token in token_list {
        println!(
            "The token is {:?} and the category is {}",
            token.get_token(),
            token.get_category()
        );
    }
}
