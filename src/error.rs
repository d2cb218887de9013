use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// Failure of a single subgraph query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The request never produced a response (DNS, TLS, connection reset, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("subgraph returned HTTP {0}")]
    Status(u16),

    /// The server answered with a non-empty `errors` array.
    #[error("graphql error: {}", join_messages(.0))]
    GraphQl(Vec<GraphQlError>),

    /// The `data` object did not match the expected shape.
    #[error("unexpected payload shape: {0}")]
    Decode(#[from] serde_json::Error),

    /// Neither `data` nor `errors` was present.
    #[error("response contained no data")]
    MissingData,
}

fn join_messages(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphql_error_joins_messages() {
        let err = QueryError::GraphQl(vec![
            GraphQlError {
                message: "indexing error".to_string(),
            },
            GraphQlError {
                message: "store error".to_string(),
            },
        ]);
        assert_eq!(err.to_string(), "graphql error: indexing error; store error");
    }

    #[test]
    fn status_error_display() {
        assert_eq!(QueryError::Status(502).to_string(), "subgraph returned HTTP 502");
    }
}
