//! Error types for the document-graph client

use regaccess_core::RegAccessError;
use thiserror::Error;

/// Errors that can occur when talking to the document graph
#[derive(Debug, Error)]
pub enum GraphError {
    /// HTTP client could not be built
    #[error("Client configuration failed: {0}")]
    ClientBuild(String),

    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// The endpoint refused the session signature
    #[error("Unauthorized - signature rejected")]
    Unauthorized,

    /// Endpoint returned a non-success status
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Body returned by the endpoint
        message: String,
    },

    /// The query or mutation reported errors
    #[error("Graph errors: {}", .0.join("; "))]
    Graph(Vec<String>),

    /// The response carried no `data`
    #[error("Response contained no data")]
    MissingData,

    /// A document did not match the expected shape
    #[error("Document decoding failed: {0}")]
    Decode(String),
}

impl From<GraphError> for RegAccessError {
    fn from(error: GraphError) -> Self {
        Self::Persistence(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_errors_joined() {
        let err = GraphError::Graph(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "Graph errors: a; b");
    }

    #[test]
    fn test_maps_to_persistence() {
        let err: RegAccessError = GraphError::MissingData.into();
        assert_eq!(
            err,
            RegAccessError::Persistence("Response contained no data".to_string())
        );
    }
}
