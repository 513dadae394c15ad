//! A small interactive command interpreter with a bounded history.
//!
//! This crate provides the building blocks of a minimal shell: a whitespace
//! tokenizer, a ten-entry command history ring with `!!`/`!n` re-execution,
//! built-in commands implemented in Rust, and a launcher for external
//! programs that can run in the foreground or the background. It is
//! intentionally small and easy to read, suitable for experiments with
//! process management and interactive loops.
//!
//! The main entry point is [`Interpreter`], which owns the read-eval loop and
//! dispatches commands through a set of pluggable factories. The public
//! modules [`command`], [`env`] and [`history`] expose the traits and types
//! needed to implement your own commands and to inspect the session state.

mod builtin;
pub mod command;
pub mod env;
mod external;
pub mod history;
mod interpreter;
mod lexer;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::Interpreter;
