//! Token counting through an external tokenizer process.
//!
//! Protocol: the child receives `{"text": "..."}` on stdin in a single write,
//! stdin is closed, and after exit stdout must hold exactly one JSON object,
//! `{"count": N}` or `{"error": "..."}`.

use super::counter::TokenEstimator;
use crate::{Error, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Interpreter found by probing, shared by every tokenizer in the process.
static DISCOVERED_INTERPRETER: OnceCell<String> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Explicit interpreter; skips discovery when set.
    #[serde(default)]
    pub interpreter: Option<String>,
    /// Script passed as the interpreter's first argument.
    pub script_path: PathBuf,
    /// Commands probed with `--version`, in order.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,
}

fn default_candidates() -> Vec<String> {
    vec!["python3".to_string(), "python".to_string()]
}

impl TokenizerConfig {
    pub fn new(script_path: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: None,
            script_path: script_path.into(),
            candidates: default_candidates(),
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = Some(interpreter.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct TokenizerReply {
    count: Option<u64>,
    error: Option<String>,
}

fn parse_reply(stdout: &[u8]) -> Result<u64> {
    let reply: TokenizerReply = serde_json::from_slice(stdout).map_err(|e| {
        Error::Estimation(format!("failed to parse tokenizer output: {}", e))
    })?;
    match reply {
        TokenizerReply {
            error: Some(message),
            ..
        } => Err(Error::Estimation(format!("tokenizer error: {}", message))),
        TokenizerReply {
            count: Some(count), ..
        } => Ok(count),
        _ => Err(Error::Estimation(
            "tokenizer output has neither count nor error".to_string(),
        )),
    }
}

pub struct ProcessTokenizer {
    config: TokenizerConfig,
}

impl ProcessTokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        Self { config }
    }

    async fn interpreter(&self) -> Result<String> {
        if let Some(ref explicit) = self.config.interpreter {
            return Ok(explicit.clone());
        }
        if let Some(found) = DISCOVERED_INTERPRETER.get() {
            return Ok(found.clone());
        }
        for candidate in &self.config.candidates {
            let probe = Command::new(candidate)
                .arg("--version")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await;
            if matches!(probe, Ok(status) if status.success()) {
                debug!(interpreter = candidate.as_str(), "tokenizer interpreter resolved");
                return Ok(DISCOVERED_INTERPRETER.get_or_init(|| candidate.clone()).clone());
            }
        }
        Err(Error::Estimation(
            "Python not found. Please install Python 3.x".to_string(),
        ))
    }
}

#[async_trait]
impl TokenEstimator for ProcessTokenizer {
    async fn count(&self, text: &str) -> Result<u64> {
        let interpreter = self.interpreter().await?;
        let mut child = Command::new(&interpreter)
            .arg(&self.config.script_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::Estimation(format!("failed to start tokenizer process: {}", e))
            })?;

        let payload = serde_json::to_vec(&serde_json::json!({ "text": text }))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload).await.map_err(|e| {
                Error::Estimation(format!("failed to write tokenizer input: {}", e))
            })?;
            // Dropping stdin closes the pipe so the child sees EOF.
        }

        let output = child.wait_with_output().await.map_err(|e| {
            Error::Estimation(format!("failed to wait for tokenizer process: {}", e))
        })?;
        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(Error::Estimation(format!(
                "tokenizer process exited with code {}: {}",
                code,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        parse_reply(&output.stdout)
    }

    fn name(&self) -> &'static str {
        "process"
    }
}
