use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "mission", version = "1.0", about, long_about = None)]
pub struct CliArgs {
    /// Path to the configuration file
    #[arg(long = "config", short = 'c')]
    pub config_path: String,

    /// Whether to flush the existing database
    #[arg(long = "flush-data", short = 'f', default_value_t = false)]
    pub flush_data: bool,
}

impl CliArgs {
    /// Load the configuration from the specified file
    pub fn to_config(&self) -> std::io::Result<Config> {
        let file = std::fs::File::open(&self.config_path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| e.into())
    }
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub judge: JudgeConfig,
    pub challenges: Vec<ChallengeConfig>,
}

#[derive(Deserialize, Debug)]
pub struct ServerConfig {
    pub bind_address: Option<String>,
    pub bind_port: Option<u16>,
}

#[derive(Deserialize, Debug)]
pub struct JudgeConfig {
    /// Base URL of the execution sandbox service, without a trailing slash
    pub api_url: String,
    pub api_key: String,
    #[serde(default)]
    pub mode: EvaluatorMode,
    #[serde(default)]
    pub poll: PollPolicy,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorMode {
    /// Evaluate against the remote execution sandbox
    #[default]
    Remote,
    /// Keyword-containment heuristic, no real execution. Opt-in only.
    Keyword,
}

/// How long to keep polling the sandbox for a verdict before giving up.
#[derive(Deserialize, Debug, Clone)]
pub struct PollPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl PollPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    10
}

fn default_interval_ms() -> u64 {
    1000
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChallengeConfig {
    pub id: u32,
    pub title: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub instructions: String,
    /// Language identifiers this challenge accepts
    #[serde(default)]
    pub languages: Vec<String>,
    pub cases: Vec<TestCaseConfig>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TestCaseConfig {
    pub name: String,
    /// Harness source appended to the candidate's code, not wrapped around it
    pub test_code: String,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub expected_output: String,
    /// Only consulted by the keyword evaluator
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let file = std::fs::File::open("data/mission.json").unwrap();
        let reader = std::io::BufReader::new(file);
        let config: Config = serde_json::from_reader(reader).unwrap();
        assert_eq!(config.server.bind_address, Some("127.0.0.1".to_string()));
        assert_eq!(config.judge.mode, EvaluatorMode::Remote);
        assert_eq!(config.judge.poll.max_attempts, 10);
        assert_eq!(config.judge.poll.interval_ms, 1000);
        assert_eq!(config.challenges[0].difficulty, Difficulty::Easy);
        assert_eq!(config.challenges[0].cases[0].name, "returns the sum");
    }

    #[test]
    fn test_poll_policy_defaults() {
        let judge: JudgeConfig = serde_json::from_str(
            r#"{"api_url": "http://localhost:2358", "api_key": "k"}"#,
        )
        .unwrap();
        assert_eq!(judge.mode, EvaluatorMode::Remote);
        assert_eq!(judge.poll.max_attempts, 10);
        assert_eq!(judge.poll.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_case_optional_fields_default_to_empty() {
        let case: TestCaseConfig =
            serde_json::from_str(r#"{"name": "t1", "test_code": "check()"}"#).unwrap();
        assert_eq!(case.input, "");
        assert_eq!(case.expected_output, "");
        assert!(case.keywords.is_empty());
    }
}
