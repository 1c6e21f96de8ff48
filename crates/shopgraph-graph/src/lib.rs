//! # Shopgraph Graph
//!
//! Neo4j backing store for the retail analytics service.
//!
//! Provides the connection pool client, entry-point indexes, the Cypher
//! query catalog and the atomic ingestion write.

pub mod client;
pub mod ingest;
pub mod queries;
pub mod schema;
pub mod store;

pub use client::{GraphClient, GraphConfig};
