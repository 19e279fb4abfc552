//! Evaluation commands

use crate::nrepl::{NreplClient, Outcome};
use tracing::{error, info};

/// Evaluate code and log the outcome
pub async fn cmd_eval(client: &NreplClient, code: &str) -> Outcome {
    info!("Evaluating Basilisp code: {}", code);

    let outcome = client.eval(code).await;
    if outcome.is_value() {
        info!("Evaluation result: {}", outcome);
    } else {
        error!("Evaluation error: {}", outcome);
    }

    outcome
}

/// Code that prints the docstring of `symbol`
pub fn doc_code(symbol: &str) -> String {
    format!("(doc {})", symbol.trim())
}

/// Look up documentation for a symbol
pub async fn cmd_docs(client: &NreplClient, symbol: &str) -> Outcome {
    info!("Getting documentation for: {}", symbol);
    cmd_eval(client, &doc_code(symbol)).await
}
