use crate::env::Environment;
use anyhow::Result;
use std::io::Write;

pub type ExitCode = i32;

/// A fully-constructed command, ready to run once.
pub trait ExecutableCommand {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

/// Creates commands by name.
///
/// The dispatcher asks each registered factory in turn; the first one that
/// recognizes `name` produces the command. `in_background` is the stripped
/// trailing-`&` flag; builtins run in-process and ignore it.
pub trait CommandFactory {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
        in_background: bool,
    ) -> Option<Box<dyn ExecutableCommand>>;
}
