// crates/gale-cli/src/commands/mod.rs
//
// Command module declarations for the Gale CLI.

pub mod divisor;
pub mod simulate;
