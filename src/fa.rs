use bitvec::prelude::BitVec;
use std::collections::HashSet;

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Symbol {
    Epsilon,
    Char(char),
}

pub trait FA {
    fn add_transition(&mut self, from: usize, symbol: Symbol, to: usize);
    fn set_accept_state(&mut self, state_id: usize);
    fn add_state(&mut self) -> usize;
    fn get_num_states(&self) -> usize;
    fn get_start_state(&self) -> usize;
    fn get_alphabet(&self) -> &HashSet<char>;
    fn get_acceptor_states(&self) -> &BitVec<u8>;
    fn get_regex(&self) -> &String;
    fn get_state_transitions(&self, state_id: usize) -> Vec<(Symbol, usize)>;
}

pub trait FAState {
    fn add_transition(&mut self, symbol: Symbol, to: usize);
}
