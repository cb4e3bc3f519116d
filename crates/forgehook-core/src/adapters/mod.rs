//! # Infrastructure Adapters
//!
//! In-memory implementations of the collaborator interfaces, for
//! development wiring and tests. Production deployments inject their own
//! store-backed implementations.

mod memory;

pub use memory::{
    InMemoryGitAdapter, InMemoryPrincipalStore, InMemoryPullReqStore, InMemoryRepositoryStore,
};
