//! Database-style backend implementations
//!
//! These backends provide queryable document storage with transactional commits.

mod in_memory;

#[cfg(any(test, feature = "testing"))]
pub use in_memory::InjectedFault;
pub use in_memory::InMemory;
