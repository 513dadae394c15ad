use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};

/// Command that is not a builtin.
///
/// Spawned as a child process with inherited standard streams. A foreground
/// command blocks the session until the child exits or is killed by a signal;
/// a background command is handed to the job table and control returns to
/// the prompt immediately.
pub struct ExternalCommand {
    path: OsString,
    args: Vec<OsString>,
    in_background: bool,
}

impl ExternalCommand {
    pub fn new(path: OsString, args: Vec<OsString>, in_background: bool) -> Self {
        Self {
            path,
            args,
            in_background,
        }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
        in_background: bool,
    ) -> Option<Box<dyn ExecutableCommand>> {
        let search_paths = std::env::var_os("PATH").unwrap_or_default();
        let executable = find_command_path(&search_paths, Path::new(name))?;
        Some(Box::new(ExternalCommand::new(
            executable.as_os_str().to_owned(),
            args.iter().map(|x| x.into()).collect(),
            in_background,
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let child = Command::new(&self.path)
            .args(&self.args)
            .current_dir(&env.current_dir)
            .spawn()
            .with_context(|| format!("failed to start {}", self.path.to_string_lossy()))?;

        let code = if self.in_background {
            env.jobs.adopt(child);
            0
        } else {
            wait_for(child)?
        };

        // Sweep finished background children after every external dispatch
        // so they never pile up as zombies.
        env.jobs.reap_finished();
        Ok(code)
    }
}

/// Blocks until `child` reaches a terminal state.
///
/// `wait` only returns once the child has exited or been killed by a signal;
/// a stopped child keeps the call blocked, which is exactly the foreground
/// semantics we want.
fn wait_for(mut child: Child) -> Result<ExitCode> {
    let exit_status = child.wait().context("failed to wait for child")?;
    match exit_status.code() {
        Some(x) => Ok(x),
        None => Ok(terminated_by_signal(exit_status)),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Children running in the background, not yet reaped.
#[derive(Debug, Default)]
pub struct Jobs {
    children: Vec<Child>,
}

impl Jobs {
    /// Takes ownership of a freshly spawned background child.
    pub fn adopt(&mut self, child: Child) {
        self.children.push(child);
    }

    /// Collects the exit status of every finished child without blocking.
    ///
    /// Only a child whose exit status was actually collected leaves the
    /// table; a failed query keeps the child around for the next sweep, since
    /// dropping it here would leave it unreaped for good.
    pub fn reap_finished(&mut self) {
        self.children
            .retain_mut(|child| !matches!(child.try_wait(), Ok(Some(_))));
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it exists.
/// - `./foo` on Unix or any `./`-prefixed path on other platforms: returns it if it exists.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first existing match.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => {
            // Empty path -> not found
            None
        }
        (Some(x), None) => {
            // Single component -> search in PATH
            find_in_path(search_paths, x.as_os_str()).map(Cow::Owned)
        }
        _ => {
            // Multiple components -> search in current dir
            find_by_path(path).map(Cow::Borrowed)
        }
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        let path = dir.join(cmd);
        if let Some(path) = find_by_path(&path) {
            return Some(path.to_owned());
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::testing::lock_current_dir;
    use std::ffi::OsStr;
    use std::fs;
    use std::fs::File;
    use std::time::Duration;

    #[cfg(unix)]
    fn osstr(s: &str) -> &OsStr {
        OsStr::new(s)
    }

    #[test]
    #[cfg(unix)]
    fn absolute_existing_true() {
        let path = Path::new("/bin/sh");
        let res = find_command_path(osstr("/bin"), path);
        assert!(res.is_some(), "Expected to find /bin/sh via absolute path");
        let found = res.unwrap();
        assert_eq!(found.as_ref(), path);
    }

    #[test]
    #[cfg(unix)]
    fn absolute_nonexisting() {
        let path = Path::new("/bin/nonexisting");
        let res = find_command_path(osstr("/bin"), path);
        assert!(
            res.is_none(),
            "Expected not to find /bin/nonexisting via absolute path"
        );
    }

    #[test]
    #[cfg(unix)]
    fn single_component_found_in_path() {
        // Search for "sh" in PATH that includes /bin
        let path = Path::new("sh");
        let res = find_command_path(osstr("/bin"), path);
        let found = res.expect("Expected to find 'sh' in /bin via PATH search");
        assert!(
            found.as_ref().ends_with("sh"),
            "Found path should end with 'sh' but was {:?}",
            found
        );
        assert!(
            found.as_ref().starts_with("/bin"),
            "Expected path in /bin, got {:?}",
            found
        );
    }

    #[test]
    #[cfg(unix)]
    fn single_component_not_found_in_path() {
        let path = Path::new("nonexisting");
        let res = find_command_path(osstr("/bin"), path);
        assert!(res.is_none(), "Expected not to find 'nonexisting' in PATH");
    }

    #[test]
    #[cfg(unix)]
    fn multiple_components_relative_existing() {
        let _lock = lock_current_dir();
        // Create a temporary working directory with a nested file: bin/sh
        let cwd_before = std::env::current_dir().expect("cwd");
        let tmp_base =
            std::env::temp_dir().join(format!("external_tests_{}_mc", std::process::id()));
        let _ = fs::remove_dir_all(&tmp_base);
        fs::create_dir_all(tmp_base.join("bin")).expect("create temp bin dir");
        let file_path = tmp_base.join("bin").join("sh");
        File::create(&file_path).expect("touch bin/sh");

        std::env::set_current_dir(&tmp_base).expect("set cwd");
        let res = find_command_path(osstr("/does/not/matter"), Path::new("bin/sh"));
        // Restore cwd early to avoid interference even on failure
        std::env::set_current_dir(&cwd_before).ok();

        let found = res.expect("Expected to find relative 'bin/sh' in current dir");
        assert!(found.as_ref().ends_with("bin/sh"));
        // Clean up
        let _ = fs::remove_dir_all(tmp_base);
    }

    #[test]
    #[cfg(unix)]
    fn empty_path_is_none() {
        let res = find_command_path(osstr("/bin"), Path::new(""));
        assert!(res.is_none(), "Empty path should not resolve to anything");
    }

    #[test]
    #[cfg(unix)]
    fn jobs_reap_collects_finished_children() {
        let mut jobs = Jobs::default();
        let child = Command::new("true").spawn().expect("spawn true");
        jobs.adopt(child);
        assert_eq!(jobs.len(), 1);

        // Give the child ample time to exit, then sweep.
        std::thread::sleep(Duration::from_millis(200));
        jobs.reap_finished();
        assert!(jobs.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn jobs_reap_keeps_running_children() {
        let mut jobs = Jobs::default();
        let child = Command::new("sleep").arg("5").spawn().expect("spawn sleep");
        let pid = child.id();
        jobs.adopt(child);

        jobs.reap_finished();
        assert_eq!(jobs.len(), 1, "sleeping child must stay in the table");

        // Don't leave the sleeper behind.
        let _ = Command::new("kill").arg(pid.to_string()).status();
        std::thread::sleep(Duration::from_millis(200));
        jobs.reap_finished();
        assert!(jobs.is_empty());
    }
}
