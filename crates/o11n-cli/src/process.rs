//! Apply executor backed by an external process
//!
//! The payload is written to the child's stdin. A zero exit status is success;
//! if the child prints anything on stdout it must be an `ApplyReport` JSON
//! document. A non-zero exit is a rejection carrying the child's stderr.

use o11n_core::{ApplyExecutor, ApplyReport, ExecutorError};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub(crate) struct ProcessExecutor {
    command: String,
    args: Vec<String>,
}

impl ProcessExecutor {
    pub(crate) fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

#[async_trait::async_trait]
impl ApplyExecutor for ProcessExecutor {
    async fn apply(&self, payload: &str) -> Result<ApplyReport, ExecutorError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecutorError::unavailable(format!("{}: {e}", self.command)))?;

        // feed stdin while the output pipes drain, or a chatty child blocks both sides
        let stdin = child.stdin.take();
        let feed = async move {
            let Some(mut stdin) = stdin else {
                return Ok::<(), std::io::Error>(());
            };
            match stdin.write_all(payload.as_bytes()).await {
                Ok(()) => Ok(()),
                // the child may exit without reading; its status decides the outcome
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    tracing::debug!("executor closed stdin early");
                    Ok(())
                }
                Err(e) => Err(e),
            }
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        fed?;
        tracing::debug!(status = %output.status, "executor finished");

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("executor exited with {}", output.status)
            } else {
                stderr
            };
            return Err(ExecutorError::rejected(message));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(ApplyReport::default());
        }
        ApplyReport::from_json(stdout.trim())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> ProcessExecutor {
        ProcessExecutor::new("sh", vec!["-c".into(), script.into()])
    }

    #[tokio::test]
    async fn success_with_report() {
        let executor = sh(r#"cat > /dev/null; echo '{"success":[{"path":"a.rs","messages":["ok"]}]}'"#);
        let report = executor.apply("### File a.rs\n").await.unwrap();
        assert_eq!(report.success.len(), 1);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn success_without_output() {
        let report = sh("cat > /dev/null").apply("payload").await.unwrap();
        assert_eq!(report, ApplyReport::default());
    }

    #[tokio::test]
    async fn payload_arrives_on_stdin() {
        let executor = sh(r#"read line; echo "{\"success\":[{\"path\":\"$line\"}]}""#);
        let report = executor.apply("echoed\n").await.unwrap();
        assert_eq!(report.success[0].path, "echoed");
    }

    #[tokio::test]
    async fn non_zero_exit_is_rejection_with_stderr() {
        let err = sh("cat > /dev/null; echo 'search not found' >&2; exit 3")
            .apply("payload")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "search not found");
    }

    #[tokio::test]
    async fn large_payload_with_chatty_child_completes() {
        let payload = "x".repeat(512 * 1024);
        let report = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            sh("cat >&2").apply(&payload),
        )
        .await
        .expect("executor stalled")
        .unwrap();
        assert_eq!(report, ApplyReport::default());
    }

    #[tokio::test]
    async fn missing_program_is_unavailable() {
        let err = ProcessExecutor::new("/definitely/not/a/program", Vec::new())
            .apply("payload")
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::Unavailable(_)));
    }
}
