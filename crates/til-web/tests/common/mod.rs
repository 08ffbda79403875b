//! In-memory fact store shared by the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use til_store::{Category, CategoryFilter, Fact, FactStore, NewFact, StoreError, VoteField};

/// Behaves like the hosted table: filters, orders newest first, assigns ids
/// and timestamps, and writes whatever vote value the client computed.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Fact>>,
    vote_delays: Mutex<VecDeque<Duration>>,
    fail: AtomicBool,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub vote_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Fact>) -> Self {
        let store = Self::new();
        *store.rows.lock().unwrap() = rows;
        store
    }

    /// Make every following call fail.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Delay the next vote responses, in call order.
    pub fn push_vote_delay(&self, delay: Duration) {
        self.vote_delays.lock().unwrap().push_back(delay);
    }

    pub fn row(&self, id: i64) -> Option<Fact> {
        self.rows.lock().unwrap().iter().find(|f| f.id == id).cloned()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 503,
                message: "store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl FactStore for MemoryStore {
    async fn list_facts(&self, filter: CategoryFilter) -> Result<Vec<Fact>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let mut facts: Vec<Fact> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|f| filter.matches(f.category))
            .cloned()
            .collect();
        facts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(facts)
    }

    async fn create_fact(&self, new: &NewFact) -> Result<Fact, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        let fact = Fact {
            id,
            text: new.text().to_string(),
            source: new.source().to_string(),
            category: new.category(),
            votes_interesting: 0,
            votes_mind_blowing: 0,
            votes_false: 0,
            created_at: at(id),
        };
        rows.push(fact.clone());
        Ok(fact)
    }

    async fn increment_vote(&self, fact: &Fact, field: VoteField) -> Result<Fact, StoreError> {
        self.vote_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.vote_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check()?;

        let next = fact.votes(field).saturating_add(1);
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|f| f.id == fact.id)
            .ok_or(StoreError::NotFound { id: fact.id })?;
        match field {
            VoteField::Interesting => row.votes_interesting = next,
            VoteField::MindBlowing => row.votes_mind_blowing = next,
            VoteField::False => row.votes_false = next,
        }
        Ok(row.clone())
    }
}

/// Deterministic creation time; larger ids are newer.
pub fn at(id: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + id * 60, 0).unwrap()
}

pub fn fact(id: i64, category: Category) -> Fact {
    Fact {
        id,
        text: format!("fact number {}", id),
        source: "https://example.com/".to_string(),
        category,
        votes_interesting: 0,
        votes_mind_blowing: 0,
        votes_false: 0,
        created_at: at(id),
    }
}
