//! Connection check command

use crate::nrepl::{NreplClient, Outcome};
use chrono::{DateTime, Local};
use std::fmt;
use tracing::debug;

/// Expression evaluated to probe the server
pub const LIVENESS_CODE: &str = "(+ 1 1)";

/// Result of a liveness probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected { at: String },
    Unexpected { at: String, result: String },
}

impl ConnectionStatus {
    /// Classify the outcome of evaluating [`LIVENESS_CODE`]
    pub fn from_outcome(outcome: &Outcome, at: DateTime<Local>) -> Self {
        let at = at.format("%Y-%m-%d %H:%M:%S").to_string();
        match outcome {
            Outcome::Value(v) if v == "2" => ConnectionStatus::Connected { at },
            other => ConnectionStatus::Unexpected {
                at,
                result: other.to_string(),
            },
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected { .. })
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connected { at } => write!(f, "✅ Connection successful at {}", at),
            ConnectionStatus::Unexpected { at, result } => write!(
                f,
                "⚠️ Connection issue at {}. Server responded but with unexpected result: {}",
                at, result
            ),
        }
    }
}

/// Check that the nREPL server is up and evaluating
pub async fn cmd_check(client: &NreplClient) -> ConnectionStatus {
    debug!(addr = %client.address(), "Checking nREPL connection");
    let outcome = client.eval(LIVENESS_CODE).await;
    ConnectionStatus::from_outcome(&outcome, Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nrepl::testing::serve_once;
    use crate::nrepl::NreplError;
    use chrono::TimeZone;
    use std::time::Duration;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn test_status_connected() {
        let status = ConnectionStatus::from_outcome(&Outcome::Value("2".to_string()), at());
        assert!(status.is_connected());
        assert_eq!(status.to_string(), "✅ Connection successful at 2026-03-14 09:26:53");
    }

    #[test]
    fn test_status_unexpected_value_is_a_warning() {
        let status = ConnectionStatus::from_outcome(&Outcome::Value("3".to_string()), at());
        assert!(!status.is_connected());
        assert_eq!(
            status.to_string(),
            "⚠️ Connection issue at 2026-03-14 09:26:53. Server responded but with unexpected result: 3"
        );
    }

    #[test]
    fn test_status_transport_failure_is_a_warning() {
        let outcome = Outcome::Failed(NreplError::ConnectionRefused);
        let status = ConnectionStatus::from_outcome(&outcome, at());
        assert!(!status.is_connected());
        assert!(status.to_string().contains("Error: nREPL connection refused"));
    }

    #[tokio::test]
    async fn test_cmd_check_against_server() {
        let port = serve_once(b"d5:value1:26:statusl4:doneee".to_vec()).await;
        let client = NreplClient::new("127.0.0.1", port).with_timeout(Duration::from_secs(2));
        assert!(cmd_check(&client).await.is_connected());
    }
}
