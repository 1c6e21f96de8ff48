//! Shopgraph Core Library
//!
//! Graph data model, analytic query catalog and transaction ingestion rules
//! for the retail analytics service. Concrete stores implement
//! [`AnalyticsStore`]; an embedded [`MemoryStore`] ships with this crate.

pub mod catalog;
pub mod error;
pub mod ingest;
pub mod memory;
pub mod schema;
pub mod store;

pub use catalog::{BoundQuery, QueryTemplate, TemplateParam};
pub use catalog::date::DateFilter;
pub use error::{ShopError, ShopResult};
pub use ingest::{IngestState, Ingestion, Submission, now_millis};
pub use memory::MemoryStore;
pub use schema::{Buyer, EdgeType, IndexedPredicate, NodeLabel, Product, Transaction};
pub use store::{AnalyticsStore, CommitReceipt, GraphCounts};
