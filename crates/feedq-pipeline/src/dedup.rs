use feedq_core::{FeedbackStore, StoreError};

/// Exact-match duplicate check on `text_hash`.
///
/// This is a read-only pre-check that lets callers skip scoring work for
/// known inputs. It is not what guarantees uniqueness: persistence goes
/// through [`FeedbackStore::insert_if_absent`], which is atomic per hash.
pub struct Deduplicator<'a, S> {
    store: &'a S,
}

impl<'a, S: FeedbackStore> Deduplicator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns [`StoreError`] if the lookup fails.
    pub async fn is_duplicate(&self, text_hash: &str) -> Result<bool, StoreError> {
        let exists = self.store.exists_by_hash(text_hash).await?;
        if exists {
            tracing::debug!(text_hash, "duplicate fingerprint");
        }
        Ok(exists)
    }
}
