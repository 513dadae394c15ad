//! A bounded ring of the most recently entered command lines, and the
//! resolution of `!!`/`!n` references against it.

use std::io::Write;
use thiserror::Error;

/// How many commands the ring remembers.
pub const HISTORY_DEPTH: usize = 10;

/// Failures when resolving a `!!` or `!n` history reference.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("no previous command")]
    NoPreviousCommand,
    #[error("please input an integer after !")]
    NotInteger,
    #[error("{}{} command doesn't exist", .0, ordinal_suffix(*.0))]
    OutOfRange(usize),
}

fn ordinal_suffix(n: usize) -> &'static str {
    match n {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Fixed-capacity command history.
///
/// Entry number `i` (1-based) lives in slot `(i - 1) % HISTORY_DEPTH`; a new
/// entry overwrites, and thereby drops, whatever occupied its slot. `count`
/// advances by exactly one per recorded line, so it doubles as the absolute
/// ordinal of the next entry.
#[derive(Debug, Default)]
pub struct History {
    entries: [Option<String>; HISTORY_DEPTH],
    count: usize,
}

impl History {
    /// Stores an owned, trimmed copy of `line`. Whitespace-only input is
    /// ignored and does not advance the counter.
    pub fn record(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        self.entries[self.count % HISTORY_DEPTH] = Some(line.to_owned());
        self.count += 1;
    }

    /// Steps the counter back one position.
    ///
    /// Called before resolving a `!!`/`!n` reference so the expansion request
    /// itself never keeps a slot: the resolved line re-enters the normal
    /// pipeline and records over it.
    pub fn rollback(&mut self) {
        self.count = self.count.saturating_sub(1);
    }

    /// Number of lines recorded so far (absolute, not capped by the ring).
    pub fn count(&self) -> usize {
        self.count
    }

    /// The last `min(count, HISTORY_DEPTH)` entries, oldest first, each with
    /// its 1-based absolute ordinal.
    pub fn list(&self) -> impl Iterator<Item = (usize, &str)> {
        let start = self.count.saturating_sub(HISTORY_DEPTH);
        (start..self.count).filter_map(|i| {
            self.entries[i % HISTORY_DEPTH]
                .as_deref()
                .map(|line| (i + 1, line))
        })
    }

    /// Writes the listing in `N. line` form, one entry per line.
    ///
    /// Shared by the `history` builtin and the interrupt display.
    pub fn write_listing(&self, out: &mut dyn Write) -> std::io::Result<()> {
        for (ordinal, line) in self.list() {
            writeln!(out, "{ordinal}. {line}")?;
        }
        Ok(())
    }

    /// Resolves `!!`: the most recently completed command.
    pub fn resolve_previous(&self) -> Result<String, HistoryError> {
        if self.count == 0 {
            return Err(HistoryError::NoPreviousCommand);
        }
        Ok(self.slot(self.count))
    }

    /// Resolves `!n` from the numeral following the `!`.
    ///
    /// A numeral that fails to parse, or parses to zero, is `NotInteger`
    /// (matching what `atoi` would have said); a number past the current
    /// counter is `OutOfRange`. The lookup goes straight to the ring slot of
    /// ordinal `n`, so a reference that has aged out of the window returns
    /// whatever entry occupies that slot now.
    pub fn resolve_numbered(&self, numeral: &str) -> Result<String, HistoryError> {
        if self.count == 0 {
            return Err(HistoryError::NoPreviousCommand);
        }
        let n: usize = numeral.parse().map_err(|_| HistoryError::NotInteger)?;
        if n == 0 {
            return Err(HistoryError::NotInteger);
        }
        if n > self.count {
            return Err(HistoryError::OutOfRange(n));
        }
        Ok(self.slot(n))
    }

    fn slot(&self, ordinal: usize) -> String {
        // Callers guarantee 1 <= ordinal; the slot of a recorded ordinal is
        // always occupied.
        self.entries[(ordinal - 1) % HISTORY_DEPTH]
            .as_deref()
            .unwrap_or_default()
            .to_owned()
    }
}
