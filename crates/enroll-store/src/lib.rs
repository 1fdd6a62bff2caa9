//! # enroll-store
//!
//! MongoDB implementation of `enroll_core::StudentStore`. The collection
//! carries a unique index on `email`, which is the real enforcement point
//! for the duplicate-email invariant under concurrent submissions; the
//! application-level pre-check only exists for the clean 409.
//!
//! The connection is a lifecycle-managed handle built by
//! [`connection::connect_with_retry`] and injected into the workflow at
//! construction, not ambient global state.

pub mod connection;
mod document;
mod mongo;

pub use connection::{connect_with_retry, ConnectOptions};
pub use mongo::MongoStudentStore;
