//! Runs the transcoder and relays its `-stats` progress output.

use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct TranscodeRunner {
    command: String,
}

impl TranscodeRunner {
    pub fn new<S: Into<String>>(command: S) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run to completion, calling `on_progress` with the newest progress line
    /// of each chunk written to stderr. A non-zero exit is an error.
    pub async fn run<F>(&self, args: &[String], mut on_progress: F) -> AppResult<()>
    where
        F: FnMut(&str),
    {
        debug!("Executing command: {} {}", self.command, args.join(" "));

        let mut child = TokioCommand::new(&self.command)
            .args(args)
            .kill_on_drop(true)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AppError::process(format!("Failed to start {}: {e}", self.command)))?;

        if let Some(mut stderr) = child.stderr.take() {
            let mut buf = [0u8; 4096];
            loop {
                let read = stderr.read(&mut buf).await?;
                if read == 0 {
                    break;
                }
                // ffmpeg rewrites its stats line with '\r', so only the tail matters
                let chunk = String::from_utf8_lossy(&buf[..read]);
                if let Some(line) = chunk
                    .split(['\r', '\n'])
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .last()
                {
                    on_progress(line);
                }
            }
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(AppError::process(format!(
                "{} exited with {}",
                self.command,
                status
                    .code()
                    .map(|c| format!("code {c}"))
                    .unwrap_or_else(|| "a signal".to_string())
            )));
        }

        info!("{} finished successfully", self.command);
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_progress_lines_are_reported() {
        let runner = TranscodeRunner::new("sh");
        let args = vec!["-c".to_string(), "printf 'frame=1\\rframe=2\\r' >&2".to_string()];

        let mut seen = Vec::new();
        runner.run(&args, |line| seen.push(line.to_string())).await.unwrap();
        assert_eq!(seen.last().map(String::as_str), Some("frame=2"));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_process_error() {
        let runner = TranscodeRunner::new("sh");
        let args = vec!["-c".to_string(), "exit 3".to_string()];

        let err = runner.run(&args, |_| {}).await.unwrap_err();
        assert!(matches!(err, AppError::Process { .. }));
        assert!(err.to_string().contains("code 3"));
    }

    #[tokio::test]
    async fn test_dropped_run_kills_the_child() {
        let marker = std::env::temp_dir().join(format!("f1tv-dl-runner-{}", std::process::id()));
        let _ = std::fs::remove_file(&marker);

        let runner = TranscodeRunner::new("sh");
        let args = vec![
            "-c".to_string(),
            format!("sleep 1; echo late > '{}'", marker.display()),
        ];

        let run = tokio::time::timeout(Duration::from_millis(200), runner.run(&args, |_| {}));
        assert!(run.await.is_err());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "child kept running after the run was dropped");
    }

    #[tokio::test]
    async fn test_missing_binary_is_process_error() {
        let runner = TranscodeRunner::new("definitely-not-a-real-transcoder");
        let err = runner.run(&[], |_| {}).await.unwrap_err();
        assert!(matches!(err, AppError::Process { .. }));
    }
}
