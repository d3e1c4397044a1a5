//! Subprocess execution utilities.
//!
//! [`ProcessBuilder`] describes a command. A [`CommandRunner`] executes it,
//! forwarding every output line as it arrives and turning a nonzero exit
//! status into [`BuildError::CommandFailed`].

use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::Arc;

use crate::util::errors::{BuildError, Result};
use crate::util::shell::Shell;

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set the working directory the command runs in.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the working directory, if one was set.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd.stdin(Stdio::null());
        cmd
    }

    /// Execute the command, wait for completion and capture its output.
    pub fn exec(&self) -> Result<Output> {
        let mut cmd = self.build_command();
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        cmd.output().map_err(|source| BuildError::Spawn {
            command: self.display_command(),
            source,
        })
    }

    /// Execute the command, calling `on_line` for every line of combined
    /// stdout/stderr as soon as it is available.
    ///
    /// Returns the exit code (`None` when killed by a signal) together with
    /// the full decoded output.
    pub fn exec_streaming(&self, mut on_line: impl FnMut(&str)) -> Result<(Option<i32>, String)> {
        let spawn_err = |source| BuildError::Spawn {
            command: self.display_command(),
            source,
        };

        // stdout and stderr share one pipe, so lines keep the order the
        // child wrote them in.
        let (reader, writer) = io::pipe().map_err(spawn_err)?;
        let mut cmd = self.build_command();
        cmd.stdout(writer.try_clone().map_err(spawn_err)?);
        cmd.stderr(writer);

        let mut child = cmd.spawn().map_err(spawn_err)?;
        // The command still owns the write ends; reading only hits EOF once
        // they are closed here.
        drop(cmd);

        let mut reader = BufReader::new(reader);
        let mut output = String::new();
        let mut raw = Vec::new();
        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw) {
                Ok(0) => break,
                Ok(_) => {
                    let line = decode_lossy(&raw);
                    let line = line.trim_end_matches(['\r', '\n']);
                    on_line(line);
                    output.push_str(line);
                    output.push('\n');
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!("stopped reading output: {}", e);
                    break;
                }
            }
        }

        let status = child.wait().map_err(spawn_err)?;
        Ok((status.code(), output))
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Decode tool output.
///
/// Valid UTF-8 is taken as is. Anything else is decoded with the ANSI code
/// page on Windows, where localized compilers write in it. Bytes that still
/// can't be decoded are dropped.
pub fn decode_lossy(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    #[cfg(windows)]
    if let Some(text) = decode_code_page(bytes, ansi_code_page()) {
        return text;
    }

    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

/// Decode `bytes` in a Windows code page, dropping undecodable bytes.
/// Returns `None` for code pages without a known encoding.
pub fn decode_code_page(bytes: &[u8], code_page: u16) -> Option<String> {
    let encoding = codepage::to_encoding(code_page)?;
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    Some(
        text.chars()
            .filter(|&c| c != char::REPLACEMENT_CHARACTER)
            .collect(),
    )
}

#[cfg(windows)]
fn ansi_code_page() -> u16 {
    // SAFETY: GetACP takes no arguments and only reads process state.
    let acp = unsafe { windows_sys::Win32::Globalization::GetACP() };
    u16::try_from(acp).unwrap_or(1252)
}

/// Hook turning the captured output of a failed command into a diagnosis.
pub type ErrorFormatter<'a> = &'a dyn Fn(&str) -> String;

/// Executes commands on behalf of the build stages.
pub trait CommandRunner {
    /// Run `cmd` to completion.
    ///
    /// A nonzero exit status is always an error. When `formatter` is given it
    /// receives the full output and its result is attached to the error.
    fn run(&mut self, cmd: &ProcessBuilder, formatter: Option<ErrorFormatter<'_>>) -> Result<()>;
}

/// Runs real processes and reports their output through the shell.
pub struct ProcessRunner {
    shell: Arc<Shell>,
    sink: Option<Box<dyn FnMut(&str)>>,
}

impl ProcessRunner {
    /// Create a runner reporting to `shell`.
    pub fn new(shell: Arc<Shell>) -> Self {
        ProcessRunner { shell, sink: None }
    }

    /// Additionally hand every output line to `sink`.
    pub fn with_line_sink(mut self, sink: impl FnMut(&str) + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&mut self, cmd: &ProcessBuilder, formatter: Option<ErrorFormatter<'_>>) -> Result<()> {
        let command = cmd.display_command();
        tracing::debug!("executing command: {}", command);

        let progress = self.shell.spinner(&command);
        let shell = &self.shell;
        let sink = &mut self.sink;

        let (status, output) = cmd.exec_streaming(|line| {
            tracing::debug!("{}", line);
            if shell.is_verbose() {
                shell.raw_line(line);
            } else {
                progress.set_message(line);
            }
            if let Some(sink) = sink.as_mut() {
                sink(line);
            }
        })?;
        progress.finish();

        if status == Some(0) {
            return Ok(());
        }

        let diagnosis = formatter.map(|format| format(&output));
        Err(BuildError::CommandFailed {
            command,
            status,
            diagnosis,
        })
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find CMake.
pub fn find_cmake() -> Option<PathBuf> {
    find_executable("cmake")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::util::shell::{ColorChoice, ShellMode, Verbosity};

    fn quiet_runner() -> ProcessRunner {
        ProcessRunner::new(Arc::new(Shell::new(ShellMode {
            verbosity: Verbosity::Quiet,
            color: ColorChoice::Never,
        })))
    }

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("cmake").args(["--build", ".", "--config", "Release"]);

        assert_eq!(pb.display_command(), "cmake --build . --config Release");
    }

    #[cfg(not(windows))]
    #[test]
    fn test_decode_lossy_drops_invalid_bytes() {
        assert_eq!(decode_lossy(b"ok \xff\xfe done"), "ok  done");
        assert_eq!(decode_lossy("grün".as_bytes()), "grün");
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_streaming_collects_lines() {
        let mut seen = Vec::new();
        let (status, output) = ProcessBuilder::new("sh")
            .args(["-c", "echo first; echo second"])
            .exec_streaming(|line| seen.push(line.to_string()))
            .unwrap();

        assert_eq!(status, Some(0));
        assert_eq!(seen, vec!["first", "second"]);
        assert_eq!(output, "first\nsecond\n");
    }

    #[test]
    fn test_decode_code_page() {
        assert_eq!(
            decode_code_page(b"Fehler: Datei f\xfcr Ger\xe4t", 1252).unwrap(),
            "Fehler: Datei für Gerät"
        );
        assert_eq!(decode_code_page(b"\xcf\xf0\xe8", 1251).unwrap(), "При");
        assert!(decode_code_page(b"abc", 1).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_stdout_and_stderr_keep_their_order() {
        let mut seen = Vec::new();
        let (status, output) = ProcessBuilder::new("sh")
            .args(["-c", "echo one; echo two 1>&2; echo three; echo four 1>&2"])
            .exec_streaming(|line| seen.push(line.to_string()))
            .unwrap();

        assert_eq!(status, Some(0));
        assert_eq!(seen, vec!["one", "two", "three", "four"]);
        assert_eq!(output, "one\ntwo\nthree\nfour\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_fails_after_forwarding_output() {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let captured = Rc::clone(&lines);
        let mut runner = quiet_runner().with_line_sink(move |line| {
            captured.borrow_mut().push(line.to_string());
        });

        let cmd = ProcessBuilder::new("sh").args(["-c", "echo one; echo two 1>&2; exit 2"]);
        let err = runner.run(&cmd, None).unwrap_err();

        match err {
            BuildError::CommandFailed {
                status, diagnosis, ..
            } => {
                assert_eq!(status, Some(2));
                assert!(diagnosis.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(*lines.borrow(), vec!["one", "two"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_formatter_sees_full_output() {
        let mut runner = quiet_runner();
        let cmd = ProcessBuilder::new("sh").args(["-c", "echo 'No CMAKE_CXX_COMPILER could be found.'; exit 1"]);

        let formatter = |output: &str| {
            if output.contains("No CMAKE_CXX_COMPILER") {
                "missing compiler".to_string()
            } else {
                String::new()
            }
        };
        let err = runner.run(&cmd, Some(&formatter)).unwrap_err();

        assert!(matches!(
            err,
            BuildError::CommandFailed { diagnosis: Some(ref d), .. } if d == "missing compiler"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_runner_honours_cwd() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("marker.txt"), "").unwrap();

        let mut runner = quiet_runner();
        let cmd = ProcessBuilder::new("sh")
            .args(["-c", "test -f marker.txt"])
            .cwd(tmp.path());
        runner.run(&cmd, None).unwrap();
    }

    #[test]
    fn test_spawn_failure() {
        let mut runner = quiet_runner();
        let cmd = ProcessBuilder::new("/definitely/not/a/real/program");
        let err = runner.run(&cmd, None).unwrap_err();
        assert!(matches!(err, BuildError::Spawn { .. }));
    }
}
