use async_trait::async_trait;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::ui::core::dates::DateRange;
use crate::ui::core::section::Section;

/// Arguments sent across the bridge. Only primitives, so nothing of the
/// caller leaks into the analytics process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub section: Section,
    pub start_date: String,
    pub end_date: String,
}

impl FetchRequest {
    pub fn new(section: Section, range: &DateRange) -> Self {
        Self {
            section,
            start_date: range.start_iso(),
            end_date: range.end_iso(),
        }
    }
}

/// Terminal failure of a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub error: String,
    #[serde(rename = "errorDetail", skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorInfo {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error)
    }
}

/// A section document as returned by the analytics process.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload(Value);

impl Payload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Looks up a dotted path (`markets.stETH`). An empty path is the root.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        lookup(&self.0, path)
    }

    /// Converts raw analytics output into a payload, or the error it reports.
    pub fn from_output(value: Value) -> Result<Payload, ErrorInfo> {
        if let Some(message) = value.get("error").and_then(Value::as_str) {
            let mut info = ErrorInfo::new(message);
            info.detail = value
                .get("errorDetail")
                .and_then(Value::as_str)
                .map(str::to_string);
            return Err(info);
        }
        Ok(Payload::new(value))
    }
}

pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.')
        .try_fold(value, |current, key| current.get(key))
        .filter(|found| !found.is_null())
}

pub type FetchOutcome = Result<Payload, ErrorInfo>;

#[async_trait]
pub trait FetchBridge: Send + Sync {
    /// One external invocation. Every failure comes back as `Err(ErrorInfo)`.
    async fn fetch(&self, request: &FetchRequest) -> FetchOutcome;
}

/// Runs the analytics scripts with the configured interpreter.
#[derive(Debug, Clone)]
pub struct ScriptBridge {
    python: PathBuf,
    scripts_dir: PathBuf,
    timeout: Option<Duration>,
}

impl ScriptBridge {
    pub fn new(python: impl Into<PathBuf>, scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            scripts_dir: scripts_dir.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn script_for(&self, section: Section) -> PathBuf {
        let name = match section {
            Section::Blackrock => "blackrock.py",
            Section::BinancePolar => "binance_polar.py",
            Section::Eth => "eth.py",
            Section::Bitcoin | Section::Lido => "whalescope.py",
        };
        self.scripts_dir.join(name)
    }

    async fn run(&self, request: &FetchRequest) -> FetchOutcome {
        // Bare interpreter names are resolved through PATH by the spawn.
        if self.python.components().count() > 1 && !self.python.exists() {
            error!("Python command not found: {}", self.python.display());
            return Err(ErrorInfo::new(format!(
                "Python command not found: {}",
                self.python.display()
            )));
        }

        let script = self.script_for(request.section);
        if !script.exists() {
            error!("Script not found: {}", script.display());
            return Err(ErrorInfo::new(format!(
                "Script not found: {}",
                script.display()
            )));
        }

        let mut command = Command::new(&self.python);
        command
            .arg(&script)
            .arg(request.section.as_str())
            .arg(format!("--start-date={}", request.start_date))
            .arg(format!("--end-date={}", request.end_date))
            .env("PYTHONUNBUFFERED", "1")
            .stdin(Stdio::null())
            .kill_on_drop(true);

        info!(
            "Executing {} {} for {} ({} .. {})",
            self.python.display(),
            script.display(),
            request.section,
            request.start_date,
            request.end_date
        );

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, command.output()).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("{} request timed out after {:?}", request.section, limit);
                    return Err(ErrorInfo::new(format!(
                        "Request timed out after {}s",
                        limit.as_secs()
                    )));
                }
            },
            None => command.output().await,
        };

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                error!("Failed to spawn {}: {}", script.display(), e);
                return Err(ErrorInfo::new(format!("Failed to start script: {}", e)));
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !stderr.is_empty() {
            error!("Stderr from {}: {}", request.section, stderr);
            return Err(ErrorInfo::new(stderr));
        }
        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "unknown".to_string(), |c| c.to_string());
            error!("{} exited with status {}", script.display(), code);
            return Err(ErrorInfo::new(format!("Script exited with status {}", code)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("Raw stdout from {}: {}", request.section, stdout.trim());
        parse_output(&stdout)
    }
}

#[async_trait]
impl FetchBridge for ScriptBridge {
    async fn fetch(&self, request: &FetchRequest) -> FetchOutcome {
        self.run(request).await
    }
}

fn parse_output(stdout: &str) -> FetchOutcome {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(ErrorInfo::new("Empty output from script"));
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Payload::from_output(value),
        Err(e) => {
            warn!("Failed to parse analytics output: {}", e);
            Err(ErrorInfo::new(format!("Invalid JSON output: {}", e)).with_detail(trimmed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn request(section: Section) -> FetchRequest {
        FetchRequest {
            section,
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-31".to_string(),
        }
    }

    #[test]
    fn request_serializes_primitives() {
        let json = serde_json::to_value(request(Section::Bitcoin)).unwrap();
        assert_eq!(
            json,
            json!({"section": "bitcoin", "startDate": "2024-01-01", "endDate": "2024-01-31"})
        );
    }

    #[test]
    fn error_objects_become_error_info() {
        let outcome = Payload::from_output(json!({"error": "boom", "errorDetail": "trace"}));
        assert_eq!(outcome, Err(ErrorInfo::new("boom").with_detail("trace")));
        assert!(Payload::from_output(json!({"markets": {}})).is_ok());
    }

    #[test]
    fn malformed_output_is_normalized() {
        let err = parse_output("not json").unwrap_err();
        assert!(err.error.starts_with("Invalid JSON output"));
        assert_eq!(parse_output("  ").unwrap_err().error, "Empty output from script");
    }

    #[test]
    fn lookup_follows_dotted_paths() {
        let payload = Payload::new(json!({"markets": {"stETH": {"eth_staked": 1.5}}, "gone": null}));
        assert_eq!(
            payload.lookup("markets.stETH.eth_staked"),
            Some(&json!(1.5))
        );
        assert!(payload.lookup("markets.rETH").is_none());
        assert!(payload.lookup("gone").is_none());
        assert!(payload.lookup("").is_some());
    }

    #[tokio::test]
    async fn missing_script_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = ScriptBridge::new("/bin/sh", dir.path());
        let err = bridge.fetch(&request(Section::Blackrock)).await.unwrap_err();
        assert!(err.error.starts_with("Script not found"), "{}", err.error);
    }

    #[tokio::test]
    async fn missing_interpreter_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = ScriptBridge::new(dir.path().join("venv/bin/python"), dir.path());
        let err = bridge.fetch(&request(Section::Bitcoin)).await.unwrap_err();
        assert!(err.error.starts_with("Python command not found"));
    }

    #[tokio::test]
    async fn runs_script_and_parses_stdout() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("whalescope.py"),
            "echo \"{\\\"section\\\": \\\"$1\\\", \\\"range\\\": \\\"$2 $3\\\"}\"\n",
        )
        .unwrap();
        let bridge = ScriptBridge::new("/bin/sh", dir.path());
        let payload = bridge.fetch(&request(Section::Bitcoin)).await.unwrap();
        assert_eq!(payload.lookup("section"), Some(&json!("bitcoin")));
        assert_eq!(
            payload.lookup("range"),
            Some(&json!("--start-date=2024-01-01 --end-date=2024-01-31"))
        );
    }

    #[tokio::test]
    async fn stderr_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("eth.py"), "echo 'rate limited' >&2\necho '{}'\n").unwrap();
        let bridge = ScriptBridge::new("/bin/sh", dir.path());
        let err = bridge.fetch(&request(Section::Eth)).await.unwrap_err();
        assert_eq!(err.error, "rate limited");
    }

    #[tokio::test]
    async fn slow_script_times_out() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("binance_polar.py"), "sleep 5\necho '[]'\n").unwrap();
        let bridge = ScriptBridge::new("/bin/sh", dir.path())
            .with_timeout(Some(Duration::from_millis(100)));
        let err = bridge.fetch(&request(Section::BinancePolar)).await.unwrap_err();
        assert!(err.error.starts_with("Request timed out"));
    }
}
