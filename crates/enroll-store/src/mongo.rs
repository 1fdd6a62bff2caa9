//! MongoDB Student Store

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};

use enroll_core::error::{CoreError, Result};
use enroll_core::{Student, StudentPatch, StudentStore};

use crate::document::{update_document, StudentDocument};

const COLLECTION: &str = "students";

/// `StudentStore` over a MongoDB collection with a unique email index
pub struct MongoStudentStore {
    students: Collection<StudentDocument>,
}

impl MongoStudentStore {
    /// Wrap an existing database handle and ensure the unique email index
    pub async fn new(db: &Database) -> Result<Self> {
        let students = db.collection::<StudentDocument>(COLLECTION);
        ensure_indexes(&students).await?;
        Ok(Self { students })
    }

    async fn update_one(
        &self,
        filter: mongodb::bson::Document,
        patch: StudentPatch,
    ) -> Result<Option<Student>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .students
            .find_one_and_update(filter, update_document(&patch), options)
            .await
            .map_err(store_error)?;

        updated.map(Student::try_from).transpose()
    }
}

/// The unique index is the single serialization point for the
/// duplicate-email invariant; a raced second insert fails server-side.
async fn ensure_indexes(students: &Collection<StudentDocument>) -> Result<()> {
    let index = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    students
        .create_index(index, None)
        .await
        .map_err(store_error)?;

    Ok(())
}

fn store_error(err: mongodb::error::Error) -> CoreError {
    CoreError::Store(err.to_string())
}

/// Server error code 11000: unique-index violation
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::Command(command_error) => command_error.code == 11000,
        _ => false,
    }
}

#[async_trait]
impl StudentStore for MongoStudentStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Student>> {
        let document = self
            .students
            .find_one(doc! { "email": email.to_lowercase() }, None)
            .await
            .map_err(store_error)?;

        document.map(Student::try_from).transpose()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Student>> {
        let document = self
            .students
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(store_error)?;

        document.map(Student::try_from).transpose()
    }

    async fn create(&self, student: &Student) -> Result<Student> {
        let document = StudentDocument::from(student);

        self.students
            .insert_one(&document, None)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    CoreError::DuplicateEmail(student.email.clone())
                } else {
                    store_error(e)
                }
            })?;

        Ok(student.clone())
    }

    async fn update_by_id(&self, id: &str, patch: StudentPatch) -> Result<Option<Student>> {
        self.update_one(doc! { "_id": id }, patch).await
    }

    async fn update_by_email(&self, email: &str, patch: StudentPatch) -> Result<Option<Student>> {
        self.update_one(doc! { "email": email.to_lowercase() }, patch)
            .await
    }
}
