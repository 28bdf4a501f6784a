use std::sync::Arc;

use tracing::{info, instrument};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::contact::{Contact, SubmitContactRequest};
use crate::store::ContactStore;

pub struct ContactService {
    store: Arc<dyn ContactStore>,
}

impl ContactService {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    /// Validates and stores a contact form submission. Nothing is written when
    /// validation fails.
    #[instrument(skip_all)]
    pub async fn submit(&self, request: SubmitContactRequest) -> AppResult<Contact> {
        let contact = request.into_new_contact().map_err(AppError::MissingFields)?;
        contact
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let saved = self.store.insert(contact).await?;
        info!(contact_id = saved.id, "Contact form submitted");
        Ok(saved)
    }

    /// Every submission, newest first.
    pub async fn list(&self) -> AppResult<Vec<Contact>> {
        Ok(self.store.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{FailingContactStore, MemoryContactStore};

    fn submission(name: &str, email: &str, message: &str) -> SubmitContactRequest {
        SubmitContactRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn missing_required_fields_store_nothing() {
        let store = Arc::new(MemoryContactStore::default());
        let service = ContactService::new(store.clone());

        for request in [
            submission("", "a@x.com", "hi"),
            submission("A", "", "hi"),
            submission("A", "a@x.com", "  "),
            SubmitContactRequest::default(),
        ] {
            let err = service.submit(request).await.unwrap_err();
            assert!(matches!(err, AppError::MissingFields(_)));
        }
        assert_eq!(store.len(), 0);
    }

    #[actix_web::test]
    async fn oversized_fields_are_validation_errors() {
        let store = Arc::new(MemoryContactStore::default());
        let service = ContactService::new(store.clone());

        let err = service
            .submit(submission(&"n".repeat(201), "a@x.com", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.len(), 0);
    }

    #[actix_web::test]
    async fn newest_submission_is_listed_first() {
        let service = ContactService::new(Arc::new(MemoryContactStore::default()));

        for name in ["first", "second", "third"] {
            service
                .submit(submission(name, "a@x.com", "hi"))
                .await
                .unwrap();
        }

        let names: Vec<_> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[actix_web::test]
    async fn stored_record_gets_server_fields_and_empty_defaults() {
        let service = ContactService::new(Arc::new(MemoryContactStore::default()));

        let saved = service.submit(submission("A", "a@x.com", "hi")).await.unwrap();
        let listed = service.list().await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, saved.id);
        assert_eq!(listed[0].name, "A");
        assert_eq!(listed[0].company, "");
        assert_eq!(listed[0].phone, "");
        assert_eq!(listed[0].service, "");
    }

    #[actix_web::test]
    async fn store_failure_is_internal() {
        let service = ContactService::new(Arc::new(FailingContactStore));

        let err = service
            .submit(submission("A", "a@x.com", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
