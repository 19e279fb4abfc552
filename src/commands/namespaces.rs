//! Namespace inspection commands

use super::cmd_eval;
use crate::nrepl::{NreplClient, Outcome};
use tracing::info;

/// Lists every loaded namespace, sorted, one per line
pub const LIST_NAMESPACES_CODE: &str = r#"(str/join "\n" (sort (map str (all-ns))))"#;

/// Code listing the public vars and the macros of `namespace`, each sorted by name
pub fn ns_vars_code(namespace: &str) -> String {
    format!(
        r#"(let [ns-vars (->> (ns-publics '{ns})
                   (sort-by key)
                   (map (fn [[k v]] (str k))))
      ns-macros (->> (ns-interns '{ns})
                     (filter (fn [[k v]] (:macro (meta v))))
                     (sort-by key)
                     (map (fn [[k v]] (str k " [macro]"))))]
  (str "Variables in namespace {ns}:\n"
       (str/join "\n" ns-vars)
       "\n\nMacros in namespace {ns}:\n"
       (str/join "\n" ns-macros)))"#,
        ns = namespace.trim()
    )
}

/// List the vars and macros of a namespace
pub async fn cmd_ns_vars(client: &NreplClient, namespace: &str) -> Outcome {
    info!("Listing vars in namespace: {}", namespace);
    cmd_eval(client, &ns_vars_code(namespace)).await
}

/// List all namespaces known to the REPL
pub async fn cmd_namespaces(client: &NreplClient) -> Outcome {
    info!("Listing all namespaces");
    cmd_eval(client, LIST_NAMESPACES_CODE).await
}
