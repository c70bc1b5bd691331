pub mod cli;
pub mod hook;
pub mod inspect;
pub mod state;
