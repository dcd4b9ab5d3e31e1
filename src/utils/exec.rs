//! External command execution.
//!
//! Plug-in engines that live outside the process (CSS preprocessors) are run
//! as filters: text goes in on stdin, the result comes back on stdout.

use anyhow::{Context, Result, bail};
use std::{
    ffi::OsString,
    io::Write,
    path::Path,
    process::{Command, Stdio},
    thread,
};

/// Run `command` with `args`, feeding `input` to stdin and returning stdout.
///
/// `command[0]` is the program, the rest are leading arguments. A non-zero
/// exit fails with the command's stderr as the message.
pub fn pipe(root: Option<&Path>, command: &[String], args: &[OsString], input: &str) -> Result<String> {
    let (program, leading) = command
        .split_first()
        .context("command must have at least one element")?;

    let mut cmd = Command::new(program);
    cmd.args(leading)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(root) = root {
        cmd.current_dir(root);
    }

    let mut child = cmd
        .spawn()
        .with_context(|| format!("failed to start `{program}`"))?;

    // Feed stdin from another thread so a chatty child cannot deadlock us
    let mut stdin = child.stdin.take().context("child stdin unavailable")?;
    let input = input.to_owned();
    let feeder = thread::spawn(move || stdin.write_all(input.as_bytes()));

    let output = child
        .wait_with_output()
        .with_context(|| format!("failed to wait for `{program}`"))?;
    let fed = feeder
        .join()
        .map_err(|_| anyhow::anyhow!("stdin writer for `{program}` panicked"))?;

    // A failing child may close stdin early; its stderr is the better message
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("`{program}` exited with {}: {}", output.status, stderr.trim());
    }
    fed.with_context(|| format!("failed to write to `{program}`"))?;

    String::from_utf8(output.stdout).with_context(|| format!("`{program}` printed invalid UTF-8"))
}
