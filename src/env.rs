use crate::external::Jobs;
use crate::history::History;
use std::env as stdenv;
use std::path::PathBuf;

/// Session state owned by the interpreter and threaded through every command.
#[derive(Debug)]
pub struct Environment {
    pub current_dir: PathBuf,
    pub history: History,
    pub jobs: Jobs,
    pub should_exit: bool,
}

impl Environment {
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|err| {
            eprintln!("cannot query working directory: {err}");
            PathBuf::from(".")
        });
        Self {
            current_dir,
            history: History::default(),
            jobs: Jobs::default(),
            should_exit: false,
        }
    }
}


#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Mutex, MutexGuard, OnceLock};

    /// Tests that read or change the process working directory serialize on
    /// this lock; the cwd is process-global state.
    pub fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX.get_or_init(|| Mutex::new(())).lock().unwrap()
    }
}
