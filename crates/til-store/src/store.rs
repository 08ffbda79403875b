//! The storage seam the view layer talks to.

use async_trait::async_trait;

use crate::{CategoryFilter, Fact, NewFact, StoreError, VoteField};

/// Remote collection of facts.
#[async_trait]
pub trait FactStore: Send + Sync {
    /// Facts passing `filter`, newest first.
    async fn list_facts(&self, filter: CategoryFilter) -> Result<Vec<Fact>, StoreError>;

    /// Insert a fact and return the stored row.
    async fn create_fact(&self, new: &NewFact) -> Result<Fact, StoreError>;

    /// Write `fact.votes(field) + 1` back to the row and return it.
    ///
    /// The increment is computed from the caller's copy, so two voters
    /// holding the same stale count both write the same value.
    async fn increment_vote(&self, fact: &Fact, field: VoteField) -> Result<Fact, StoreError>;
}
