//! # Opusbox Core
//!
//! Core library for the Opusbox music host: a concurrent batch
//! object-storage gateway that fans multiple binary payloads (or object
//! keys) out as independent operations against an object store, then fans
//! the results back in with partial-failure aggregation and early
//! cancellation.
//!
//! ## Overview
//!
//! - **Gateway Facade** ([`gateway::StorageGateway`]): create/read/delete,
//!   one object or many, plus startup bucket provisioning
//! - **Batch Coordinator** ([`batch::BatchCoordinator`]): one task per key,
//!   advisory one-shot cancellation, join-barrier fan-in, optional deadline
//! - **Access Descriptor Issuer** ([`gateway::DescriptorIssuer`]):
//!   fixed-TTL presigned retrieval handles, regenerated per read
//! - **Object Store Port** ([`store::ObjectStore`]): the four single-object
//!   primitives the gateway orchestrates, with an in-process reference
//!   backend ([`store::MemoryObjectStore`]) for tests and development
//!
//! ## Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use opusbox_core::gateway::{GatewayOptions, StorageGateway};
//! use opusbox_core::store::{MemoryObjectStore, ObjectStore};
//! use opusbox_core::types::PayloadItem;
//!
//! async fn upload_album() -> opusbox_core::Result<()> {
//!     let store = Arc::new(MemoryObjectStore::new()) as Arc<dyn ObjectStore>;
//!     let gateway = StorageGateway::new(store, GatewayOptions::new("tracks"));
//!     gateway.initialize().await?;
//!
//!     let mut payloads = HashMap::new();
//!     payloads.insert(
//!         "side-a".to_string(),
//!         PayloadItem::new("side-a.flac", vec![0u8; 1024]),
//!     );
//!     payloads.insert(
//!         "side-b".to_string(),
//!         PayloadItem::new("side-b.flac", vec![0u8; 2048]),
//!     );
//!
//!     for descriptor in gateway.create_many(payloads).await? {
//!         println!("{} -> {}", descriptor.key, descriptor.url);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The gateway owns no durable state beyond the objects themselves: object
//! keys are the only durable identifiers, and the caller persists them
//! (e.g. in its relational layer) to keep objects retrievable.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod batch;
pub mod error;
pub mod gateway;
pub mod store;
pub mod types;

pub use error::{AggregateBatchError, PerItemFailure, Result, StorageError};
pub use gateway::{DEFAULT_PRESIGN_TTL, GatewayOptions, StorageGateway};
pub use types::{AccessDescriptor, ObjectKey, PayloadItem};
