//! Document-graph persistence for registration & access records.
//!
//! Records and event memberships live in a GraphQL document graph. This crate
//! provides:
//!
//! - [`HttpGraphClient`]: executes queries and signed mutations over HTTP
//! - [`GraphRegAccessStore`]: the `RegAccessStore` implementation on top of it
//! - [`wire`]: the `"1"`/`"0"` boolean and relation encodings used on the wire
//!
//! # Example
//!
//! ```ignore
//! use regaccess_graph::{GraphRegAccessStore, HttpGraphClient};
//! use std::time::Duration;
//!
//! let client = HttpGraphClient::new("http://localhost:5005/graphql", Duration::from_secs(10))?;
//! let store = GraphRegAccessStore::new(client);
//! ```

#![forbid(unsafe_code)]

pub mod client;
pub mod documents;
pub mod error;
pub mod store;
pub mod wire;

pub use client::{DID_HEADER, GraphTransport, HttpGraphClient, SIGNATURE_HEADER};
pub use error::GraphError;
pub use store::GraphRegAccessStore;
