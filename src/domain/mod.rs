/// Pure data and rules: no I/O, no timing, no host coupling.

pub mod cell;
pub mod command;
pub mod script;
