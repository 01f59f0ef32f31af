//! # Process Execution Utilities (`common::process`)
//!
//! File: lib/src/common/process.rs
//!
//! ## Overview
//!
//! This module runs external programs on behalf of the pipeline. It wraps
//! `std::process::Command` with the handful of behaviors pipeline steps need:
//!
//! - **Running Commands:** one synchronous invocation in a given working directory.
//! - **Input Redirection:** feeding a file to the child's standard input.
//! - **Capturing Output:** keeping the raw stdout bytes for the caller.
//! - **Debug Streaming:** echoing each stdout line to the `debug` log.
//! - **Exit Code Handling:** turning a non-zero exit into `UtilsError::CommandExecution`.
//! - **Shell Execution:** running the joined command line through `sh -c` (`cmd /C` on Windows).
//! - **Batches:** fanning independent commands out over a worker pool (`run_pool`).
//!
//! ## Architecture
//!
//! - `CommandArg` is the token type. Anything that can sensibly appear on a
//!   command line (strings, paths, numbers) converts into it, and every token is
//!   rendered to text when the `CommandSpec` is built.
//! - `CommandSpec` holds the tokens, the working directory and the
//!   `CommandOptions` flags. It is never empty.
//! - `run_command` executes one spec. Stdout is piped only when it is captured
//!   or streamed; stderr is always piped so failures can report it. Both pipes
//!   are drained while waiting for the child, so a noisy child cannot fill a
//!   pipe and stall.
//! - `decode_output` is the single place bytes become text (lossy UTF-8).
//! - `run_pool` runs every command of a batch on scoped worker threads and
//!   reports *all* failures together once the batch has finished.
//!
//! There is no timeout: a child that never exits blocks the caller.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pipeline_utils::common::process::{self, CommandOutcome, CommandSpec};
//! use pipeline_utils::core::error::Result;
//! use std::path::Path;
//!
//! # fn run_example() -> Result<()> {
//! let work_dir = Path::new("/data/run42");
//!
//! // Plain invocation, non-zero exit is an error.
//! process::run(["gzip", "-k", "reads.fq"], work_dir)?;
//!
//! // Capture stdout, feed a file on stdin.
//! let spec = CommandSpec::new(["wc", "-l"], work_dir)?
//!     .input_file(work_dir.join("reads.fq"))
//!     .capture_output(true);
//! if let CommandOutcome::Captured { stdout, .. } = process::run_command(&spec)? {
//!     println!("{}", process::decode_output(&stdout));
//! }
//!
//! // Independent commands in parallel.
//! process::run_pool(
//!     vec![vec!["gzip", "a.fq"], vec!["gzip", "b.fq"]],
//!     work_dir,
//! )?;
//! # Ok(())
//! # }
//! ```
//!
use crate::core::error::{BatchFailure, Result, UtilsError};
use anyhow::{bail, Context};
use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, error};

/// A single command-line token before it is rendered to text.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandArg {
    Text(String),
    Path(PathBuf),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl CommandArg {
    /// Renders the token the way it will be passed to the child process.
    pub fn to_text(&self) -> String {
        match self {
            CommandArg::Text(text) => text.clone(),
            CommandArg::Path(path) => path.to_string_lossy().into_owned(),
            CommandArg::Int(value) => value.to_string(),
            CommandArg::UInt(value) => value.to_string(),
            CommandArg::Float(value) => value.to_string(),
        }
    }
}

impl fmt::Display for CommandArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for CommandArg {
    fn from(value: &str) -> Self {
        CommandArg::Text(value.to_string())
    }
}

impl From<String> for CommandArg {
    fn from(value: String) -> Self {
        CommandArg::Text(value)
    }
}

impl From<&String> for CommandArg {
    fn from(value: &String) -> Self {
        CommandArg::Text(value.clone())
    }
}

impl From<&Path> for CommandArg {
    fn from(value: &Path) -> Self {
        CommandArg::Path(value.to_path_buf())
    }
}

impl From<PathBuf> for CommandArg {
    fn from(value: PathBuf) -> Self {
        CommandArg::Path(value)
    }
}

impl From<&PathBuf> for CommandArg {
    fn from(value: &PathBuf) -> Self {
        CommandArg::Path(value.clone())
    }
}

impl From<f64> for CommandArg {
    fn from(value: f64) -> Self {
        CommandArg::Float(value)
    }
}

impl From<f32> for CommandArg {
    fn from(value: f32) -> Self {
        CommandArg::Float(f64::from(value))
    }
}

// Pointer-sized integers fit the 64-bit variants on every supported target;
// anything wider keeps its exact decimal text.
impl From<usize> for CommandArg {
    fn from(value: usize) -> Self {
        u64::try_from(value).map_or_else(|_| CommandArg::Text(value.to_string()), CommandArg::UInt)
    }
}

impl From<isize> for CommandArg {
    fn from(value: isize) -> Self {
        i64::try_from(value).map_or_else(|_| CommandArg::Text(value.to_string()), CommandArg::Int)
    }
}

// Lossless integer conversions.
macro_rules! impl_from_integer {
    ($variant:ident, $wide:ty; $($t:ty),*) => {
        $(
            impl From<$t> for CommandArg {
                fn from(value: $t) -> Self {
                    CommandArg::$variant(<$wide>::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(Int, i64; i8, i16, i32, i64);
impl_from_integer!(UInt, u64; u8, u16, u32, u64);

/// Behavior flags for a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOptions {
    /// Fail with `UtilsError::CommandExecution` when the exit code is non-zero.
    pub check_return_code: bool,
    /// Log every stdout line at debug level once the process has exited.
    pub print_output_to_debug: bool,
    /// Run the joined command line through the platform shell.
    pub run_in_shell: bool,
    /// File connected to the child's standard input.
    pub input_file: Option<PathBuf>,
    /// Return the raw stdout bytes to the caller.
    pub capture_output: bool,
}

impl Default for CommandOptions {
    fn default() -> Self {
        Self {
            check_return_code: true,
            print_output_to_debug: false,
            run_in_shell: false,
            input_file: None,
            capture_output: false,
        }
    }
}

/// A fully-rendered command ready to run: tokens, working directory and flags.
///
/// The token list always holds at least the program name.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    args: Vec<String>,
    working_dir: PathBuf,
    options: CommandOptions,
}

impl CommandSpec {
    /// Builds a spec with default options, rendering every token to text.
    ///
    /// # Errors
    ///
    /// Returns `UtilsError::EmptyCommand` if `tokens` yields nothing.
    pub fn new<I, T, P>(tokens: I, working_dir: P) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<CommandArg>,
        P: Into<PathBuf>,
    {
        let args: Vec<String> = tokens
            .into_iter()
            .map(|token| Into::<CommandArg>::into(token).to_text())
            .collect();
        if args.is_empty() {
            bail!(UtilsError::EmptyCommand);
        }
        Ok(Self {
            args,
            working_dir: working_dir.into(),
            options: CommandOptions::default(),
        })
    }

    pub fn check_return_code(mut self, enabled: bool) -> Self {
        self.options.check_return_code = enabled;
        self
    }

    pub fn print_output_to_debug(mut self, enabled: bool) -> Self {
        self.options.print_output_to_debug = enabled;
        self
    }

    pub fn run_in_shell(mut self, enabled: bool) -> Self {
        self.options.run_in_shell = enabled;
        self
    }

    pub fn input_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.input_file = Some(path.into());
        self
    }

    pub fn capture_output(mut self, enabled: bool) -> Self {
        self.options.capture_output = enabled;
        self
    }

    /// Replaces all flags at once.
    pub fn with_options(mut self, options: CommandOptions) -> Self {
        self.options = options;
        self
    }

    /// The program name (first token).
    pub fn program(&self) -> &str {
        // Non-empty by construction.
        &self.args[0]
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn options(&self) -> &CommandOptions {
        &self.options
    }

    /// The tokens joined by single spaces, as logged and as handed to the shell.
    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }

    /// Builds the `std::process::Command` for this spec (stdio is wired by the caller).
    fn build_command(&self) -> Command {
        let mut command = if self.options.run_in_shell {
            shell_command(&self.command_line())
        } else {
            let mut direct = Command::new(&self.args[0]);
            direct.args(&self.args[1..]);
            direct
        };
        command.current_dir(&self.working_dir);
        command
    }
}

#[cfg(not(windows))]
fn shell_command(line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(line);
    command
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(line);
    command
}

/// Result of one invocation.
///
/// The variant follows the `capture_output` flag: without capture the caller
/// only gets the exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    ExitCode(i32),
    Captured { code: i32, stdout: Vec<u8> },
}

impl CommandOutcome {
    pub fn code(&self) -> i32 {
        match self {
            CommandOutcome::ExitCode(code) => *code,
            CommandOutcome::Captured { code, .. } => *code,
        }
    }

    /// Captured stdout, `None` when capture was not requested.
    pub fn stdout(&self) -> Option<&[u8]> {
        match self {
            CommandOutcome::ExitCode(_) => None,
            CommandOutcome::Captured { stdout, .. } => Some(stdout),
        }
    }
}

/// Decodes process output as UTF-8, replacing invalid sequences with U+FFFD.
///
/// Used for both debug streaming and error reporting so the two never disagree.
pub fn decode_output(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Maps an exit status to an integer code. Signal deaths on Unix become the
/// negated signal number; anything else without a code becomes -1.
fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

/// Opens the file fed to a child's stdin. Directories open fine on Unix but
/// cannot be read, so they are rejected here.
fn open_input_file(path: &Path) -> io::Result<File> {
    let file = File::open(path)?;
    if file.metadata()?.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "is a directory",
        ));
    }
    Ok(file)
}

/// Runs one command to completion.
///
/// Blocks until the child exits. The input file (if any) is opened before the
/// child is spawned and every handle is closed before this function returns,
/// on success and failure alike.
///
/// # Returns
///
/// * `CommandOutcome::Captured` when `capture_output` is set, `CommandOutcome::ExitCode` otherwise.
///
/// # Errors
///
/// - `UtilsError::InputFileMissing` if the input file cannot be opened or is a
///   directory (nothing is spawned).
/// - `UtilsError::CommandSpawn` if the program cannot be started.
/// - `UtilsError::CommandExecution` if `check_return_code` is set and the exit code is non-zero.
pub fn run_command(spec: &CommandSpec) -> Result<CommandOutcome> {
    let options = spec.options();
    debug!(
        "Running command {} at {}",
        spec.command_line(),
        spec.working_dir().display()
    );

    // Stdin source: the input file, or whatever the parent has.
    let stdin = match &options.input_file {
        Some(path) => {
            let file = open_input_file(path).map_err(|source| {
                error!("Input file {} could not be opened: {}", path.display(), source);
                UtilsError::InputFileMissing {
                    path: path.clone(),
                    source,
                }
            })?;
            Stdio::from(file)
        }
        None => Stdio::inherit(),
    };

    // Stdout is only intercepted when somebody is going to read it.
    let stdout = if options.print_output_to_debug || options.capture_output {
        Stdio::piped()
    } else {
        Stdio::inherit()
    };

    let mut command = spec.build_command();
    command.stdin(stdin).stdout(stdout).stderr(Stdio::piped());

    let child = command.spawn().map_err(|source| {
        error!("Failed to start {}: {}", spec.program(), source);
        UtilsError::CommandSpawn {
            program: spec.program().to_string(),
            source,
        }
    })?;
    // The builder still owns the parent's end of the input file.
    drop(command);

    let output = child
        .wait_with_output()
        .with_context(|| format!("Failed to wait for '{}'", spec.program()))?;
    let code = exit_code(&output.status);
    debug!("Process finished with code {}", code);

    if options.print_output_to_debug {
        for line in decode_output(&output.stdout).lines() {
            debug!("{}", line);
        }
    }

    if options.check_return_code && code != 0 {
        let stderr = decode_output(&output.stderr).trim_end().to_string();
        error!("Command error running {}: {}", spec.program(), stderr);
        bail!(UtilsError::CommandExecution {
            program: spec.program().to_string(),
            code,
            stderr,
        });
    }

    Ok(if options.capture_output {
        CommandOutcome::Captured {
            code,
            stdout: output.stdout,
        }
    } else {
        CommandOutcome::ExitCode(code)
    })
}

/// Runs `tokens` in `working_dir` with default options.
pub fn run<I, T, P>(tokens: I, working_dir: P) -> Result<CommandOutcome>
where
    I: IntoIterator<Item = T>,
    T: Into<CommandArg>,
    P: Into<PathBuf>,
{
    run_command(&CommandSpec::new(tokens, working_dir)?)
}

/// Number of worker threads for a batch of `jobs` commands.
fn pool_size(jobs: usize) -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(jobs)
        .max(1)
}

/// Runs independent commands in parallel, all sharing `working_dir`.
///
/// Each command runs with default options (exit code checked, no capture).
/// Workers keep going after a failure, so every command gets its chance to run;
/// the order in which commands finish is unspecified.
///
/// # Errors
///
/// - An empty command anywhere in the batch fails the call before anything runs.
/// - `UtilsError::BatchFailed` once the whole batch is done if any command
///   failed, listing every failure in submission order. A worker thread that
///   panics is reported as a failure of the command it was running.
pub fn run_pool<B, C, T>(commands: B, working_dir: &Path) -> Result<()>
where
    B: IntoIterator<Item = C>,
    C: IntoIterator<Item = T>,
    T: Into<CommandArg>,
{
    let specs = commands
        .into_iter()
        .enumerate()
        .map(|(index, tokens)| {
            CommandSpec::new(tokens, working_dir)
                .with_context(|| format!("Invalid command at batch position {}", index))
        })
        .collect::<Result<Vec<_>>>()?;
    let total = specs.len();
    debug!("Pooling {} calls", total);
    if total == 0 {
        return Ok(());
    }

    let workers = pool_size(total);
    let next_job = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, Result<CommandOutcome>)>();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let tx = tx.clone();
                let specs = &specs;
                let next_job = &next_job;
                scope.spawn(move || loop {
                    let index = next_job.fetch_add(1, Ordering::SeqCst);
                    let Some(spec) = specs.get(index) else {
                        break;
                    };
                    // Receiver outlives the scope, send cannot fail.
                    let _ = tx.send((index, run_command(spec)));
                })
            })
            .collect();
        drop(tx);

        for (worker, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() {
                error!("Pool worker {} panicked", worker);
            }
        }
    });

    let mut results: Vec<Option<Result<CommandOutcome>>> = (0..total).map(|_| None).collect();
    for (index, result) in rx.iter() {
        results[index] = Some(result);
    }

    let failures: Vec<BatchFailure> = results
        .into_iter()
        .enumerate()
        .filter_map(|(index, result)| {
            let message = match result {
                Some(Ok(_)) => return None,
                Some(Err(e)) => format!("{:#}", e),
                None => "worker stopped before reporting a result".to_string(),
            };
            Some(BatchFailure {
                index,
                program: specs[index].program().to_string(),
                message,
            })
        })
        .collect();

    if failures.is_empty() {
        debug!("All {} pooled calls succeeded", total);
        return Ok(());
    }
    for failure in &failures {
        error!(
            "Pooled command #{} ({}) failed: {}",
            failure.index, failure.program, failure.message
        );
    }
    bail!(UtilsError::BatchFailed {
        failed: failures.len(),
        total,
        failures,
    })
}
