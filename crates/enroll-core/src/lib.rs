//! # enroll-core
//!
//! Domain layer for the course-enrollment service: the `Student` record,
//! registration validation, the `StudentStore` abstraction, and best-effort
//! notification dispatch.
//!
//! The store trait is the single serialization point for the duplicate-email
//! invariant: implementations must reject a second writer at write time, not
//! only via the application-level pre-check.

pub mod error;
pub mod notify;
pub mod store;
pub mod student;
pub mod taxid;
pub mod validate;

pub use error::{CoreError, Result};
pub use notify::{LogNotifier, MemoryNotifier, Notifier};
pub use store::{MemoryStudentStore, StudentStore};
pub use student::{Student, StudentPatch};
pub use validate::{FieldError, Registration, RegistrationInput};
