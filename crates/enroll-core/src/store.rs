//! Student Storage
//!
//! The `StudentStore` trait plus an in-memory implementation used by tests
//! and local development. Uniqueness on email is enforced at write time by
//! every implementation: the application-level duplicate pre-check is a
//! courtesy, the store is the source of truth when two submissions race.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::student::{Student, StudentPatch};

/// Storage abstraction for student records
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Exact-match lookup by case-normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<Student>>;

    /// Lookup by record id (the public transaction id)
    async fn find_by_id(&self, id: &str) -> Result<Option<Student>>;

    /// Insert a new record; fails with `DuplicateEmail` if the email exists
    async fn create(&self, student: &Student) -> Result<Student>;

    /// Partial update keyed by id; `None` when no record matches
    async fn update_by_id(&self, id: &str, patch: StudentPatch) -> Result<Option<Student>>;

    /// Partial update keyed by email (webhook path: the gateway knows the
    /// customer by email, not by our internal id)
    async fn update_by_email(&self, email: &str, patch: StudentPatch) -> Result<Option<Student>>;
}

/// Records keyed by email, with an id side index into the same map.
///
/// Both indexes live behind one lock: every operation takes a single guard,
/// so no interleaving of lookups and writes can hold one index while waiting
/// on the other.
#[derive(Default)]
struct Records {
    by_email: HashMap<String, Student>,
    by_id: HashMap<Uuid, String>,
}

/// In-memory store (tests and local development)
///
/// `create` checks and inserts under a single write lock, so a racing second
/// writer with the same email is rejected just like by a database unique
/// index.
#[derive(Default)]
pub struct MemoryStudentStore {
    records: RwLock<Records>,
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().unwrap().by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Student>> {
        let records = self.records.read().unwrap();
        Ok(records.by_email.get(&email.to_lowercase()).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Student>> {
        let Ok(uuid) = id.parse::<Uuid>() else {
            return Ok(None);
        };

        let records = self.records.read().unwrap();
        Ok(records
            .by_id
            .get(&uuid)
            .and_then(|email| records.by_email.get(email))
            .cloned())
    }

    async fn create(&self, student: &Student) -> Result<Student> {
        let mut records = self.records.write().unwrap();

        let email = student.email.to_lowercase();
        if records.by_email.contains_key(&email) {
            return Err(CoreError::DuplicateEmail(email));
        }

        records.by_id.insert(student.id, email.clone());
        records.by_email.insert(email, student.clone());

        Ok(student.clone())
    }

    async fn update_by_id(&self, id: &str, patch: StudentPatch) -> Result<Option<Student>> {
        let Ok(uuid) = id.parse::<Uuid>() else {
            return Ok(None);
        };

        let records = &mut *self.records.write().unwrap();

        Ok(records.by_id.get(&uuid).and_then(|email| {
            records.by_email.get_mut(email).map(|student| {
                student.apply(&patch);
                student.clone()
            })
        }))
    }

    async fn update_by_email(&self, email: &str, patch: StudentPatch) -> Result<Option<Student>> {
        let mut records = self.records.write().unwrap();

        Ok(records
            .by_email
            .get_mut(&email.to_lowercase())
            .map(|student| {
                student.apply(&patch);
                student.clone()
            }))
    }
}
