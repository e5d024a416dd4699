//! Blocking launch of external renderers

use anyhow::{anyhow, bail, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Split a command line into arguments, honouring single and double quotes
/// and backslash escapes inside double quotes
pub fn split_args(line: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some('"'), '\\') => match chars.next() {
                Some(next) => current.push(next),
                None => bail!("Dangling escape in arguments: {}", line),
            },
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_arg = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if quote.is_some() {
        bail!("Unterminated quote in arguments: {}", line);
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

/// An external command fed through stdin, answering on stdout
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    command: String,
    args: String,
    work_dir: Option<PathBuf>,
}

impl ProcessLauncher {
    pub fn new(command: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: args.into(),
            work_dir: None,
        }
    }

    pub fn work_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.work_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Argument line with `%key%` placeholders replaced; `%wd%` is the
    /// working directory
    pub fn expanded_args(&self, replacements: &[(&str, &str)]) -> String {
        let mut args = self.args.clone();
        if let Some(dir) = &self.work_dir {
            args = args.replace("%wd%", &dir.to_string_lossy());
        }
        for (key, value) in replacements {
            args = args.replace(key, value);
        }
        args
    }

    /// Run the command, write `input` line by line and collect stdout lines.
    /// Stderr output is logged.
    pub fn run(&self, input: &[String], replacements: &[(&str, &str)]) -> Result<Vec<String>> {
        let args = split_args(&self.expanded_args(replacements))?;
        info!("Starting process: {} {}", self.command, args.join(" "));

        let mut cmd = Command::new(&self.command);
        cmd.args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to start {}", self.command))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("No stdin for {}", self.command))?;
        let text: String = input.iter().map(|l| format!("{}\n", l)).collect();
        let writer = std::thread::spawn(move || stdin.write_all(text.as_bytes()));

        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed to wait for {}", self.command))?;
        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Writing input to {} failed: {}", self.command, e),
            Err(_) => warn!("Input writer for {} panicked", self.command),
        }

        for line in String::from_utf8_lossy(&output.stderr).lines() {
            warn!("{}: {}", self.command, line);
        }
        if !output.status.success() {
            bail!("{} exited with {}", self.command, output.status);
        }

        let lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect();
        debug!("Process {} returned {} lines", self.command, lines.len());
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("run --rm -i", vec!["run", "--rm", "-i"])]
    #[case(r#"run -v ".:/data" kgt"#, vec!["run", "-v", ".:/data", "kgt"])]
    #[case(r#"-o 'a b'  "c \"d\"""#, vec!["-o", "a b", r#"c "d""#])]
    #[case(r#"x "" y"#, vec!["x", "", "y"])]
    #[case("   ", vec![])]
    fn test_split_args(#[case] line: &str, #[case] expected: Vec<&str>) {
        assert_eq!(split_args(line).unwrap(), expected);
    }

    #[test]
    fn test_split_args_unterminated() {
        assert!(split_args(r#"run "oops"#).is_err());
    }

    #[test]
    fn test_expanded_args() {
        let launcher = ProcessLauncher::new("docker", r#"run -v "%wd%:/data" -o "%out-fn%""#).work_dir("/tmp/work");
        assert_eq!(
            launcher.expanded_args(&[("%out-fn%", "a.png")]),
            r#"run -v "/tmp/work:/data" -o "a.png""#
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_run_pipes_lines() {
        let launcher = ProcessLauncher::new("cat", "");
        let out = launcher
            .run(&["first".to_string(), "second".to_string()], &[])
            .unwrap();
        assert_eq!(out, vec!["first", "second"]);
    }

    #[test]
    fn test_run_missing_command() {
        let launcher = ProcessLauncher::new("yaml2docx-no-such-command", "");
        assert!(launcher.run(&[], &[]).is_err());
    }
}
