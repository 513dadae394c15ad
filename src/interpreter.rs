use crate::command::{CommandFactory, ExitCode};
use crate::env::Environment;
use crate::lexer;
use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io;

/// Longest input accepted per line; anything beyond is silently dropped.
const MAX_LINE_BYTES: usize = 1023;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only support commands defined in this crate — BuiltinCommand and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal interactive interpreter with a bounded command history.
///
/// Each entered line is recorded in a ten-entry ring, tokenized, checked for
/// a trailing `&`, and dispatched either to a built-in command or to an
/// external program. `!!` and `!n` re-execute earlier lines from the ring.
///
/// Example
/// ```no_run
/// use minish::Interpreter;
/// let mut sh = Interpreter::default();
/// let code = sh.run_line("echo hello world").unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            commands,
        }
    }

    /// Run one entered line through the full pipeline:
    /// trim, record to history, tokenize, strip the background flag, dispatch.
    ///
    /// Blank input is a no-op. Returns the dispatched command's exit code, or
    /// an error for the recoverable failure cases (unknown command, history
    /// reference that does not resolve, failed spawn); the caller reports
    /// those and keeps the session alive.
    pub fn run_line(&mut self, line: &str) -> Result<ExitCode> {
        let line = clamp_line(line).trim();
        if line.is_empty() {
            return Ok(0);
        }

        // The history copy is taken from the whole line, `&` included,
        // before any token is cut from it.
        self.env.history.record(line);

        let mut tokens = lexer::split_into_tokens(line);
        let in_background = lexer::extract_background(&mut tokens);
        let Some((&name, args)) = tokens.split_first() else {
            // The line was a bare `&`.
            return Ok(0);
        };

        if name.starts_with('!') {
            return self.rerun_from_history(name);
        }
        self.run(name, args, in_background)
    }

    /// Run a single command invocation by name with arguments.
    ///
    /// Returns the command's exit code or an error if the command cannot be
    /// created or fails to execute.
    pub fn run(&mut self, name: &str, args: &[&str], in_background: bool) -> Result<ExitCode> {
        let mut stdout = io::stdout();
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, args, in_background) {
                return cmd.execute(&mut stdout, &mut self.env);
            }
        }
        Err(anyhow::anyhow!("command not found: {}", name))
    }

    /// Resolves a `!!` or `!n` reference and re-runs the resolved line.
    ///
    /// The reference was recorded like any other line; rolling the counter
    /// back first means the expansion request never keeps a slot, and the
    /// expanded text records over it when it re-enters [`Self::run_line`].
    fn rerun_from_history(&mut self, reference: &str) -> Result<ExitCode> {
        self.env.history.rollback();
        let resolved = if reference == "!!" {
            self.env.history.resolve_previous()?
        } else {
            self.env.history.resolve_numbered(&reference[1..])?
        };
        // Once the ring has wrapped, `!n` can land on the rolled-back
        // request's own slot and read the request back out. Re-running such
        // a line would never terminate, so refuse it instead.
        if resolved.starts_with('!') {
            return Err(anyhow::anyhow!(
                "history reference {reference} resolves to itself"
            ));
        }
        println!("{resolved}");
        self.run_line(&resolved)
    }

    /// The interactive read-eval loop.
    ///
    /// Prompts with the current working directory, reads one line, and feeds
    /// it through [`Self::run_line`]. Recoverable errors are printed and the
    /// loop continues; the loop ends on `exit` or end-of-file. Ctrl-C while
    /// reading prints the history listing and re-issues the prompt without
    /// treating the interrupted read as input.
    pub fn repl(&mut self) -> Result<ExitCode> {
        let mut rl = DefaultEditor::new()?;

        while !self.env.should_exit {
            let prompt = format!("{}> ", self.env.current_dir.display());
            match rl.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    if let Err(err) = self.run_line(&line) {
                        eprintln!("shell error: {err:#}");
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!();
                    if let Err(err) = self.env.history.write_listing(&mut io::stdout()) {
                        eprintln!("shell error: {err}");
                    }
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    return Err(err).context("unable to read command, terminating");
                }
            }
        }
        Ok(0)
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `pwd`, `cd`, `exit`, `history`
    /// - external command launcher
    fn default() -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Pwd>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<HistoryList>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}

fn clamp_line(line: &str) -> &str {
    if line.len() <= MAX_LINE_BYTES {
        return line;
    }
    let mut end = MAX_LINE_BYTES;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}
