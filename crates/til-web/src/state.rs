//! Local state behind the page: loaded facts, active filter, form, alerts.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use til_store::{
    CategoryFilter, Fact, FactStore, StoreError, ValidationError, VoteField, remaining_chars,
    validate_new_fact,
};

/// Banner shown in place of the list when loading fails.
pub const LOAD_ERROR_MESSAGE: &str = "Error loading facts! Reload page.";

/// Alert shown when a submission is rejected by the store.
pub const CREATE_ERROR_MESSAGE: &str = "There was a problem creating the fact.";

/// Alert shown when a vote is rejected by the store.
pub const VOTE_ERROR_MESSAGE: &str = "There was a problem recording the vote.";

/// Status of the current list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Error,
}

/// Contents of the submission form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactForm {
    pub open: bool,
    pub text: String,
    pub source: String,
    pub category: String,
}

impl FactForm {
    /// Countdown shown next to the text field; may go negative.
    pub fn remaining(&self) -> i64 {
        remaining_chars(&self.text)
    }

    fn clear(&mut self) {
        self.text.clear();
        self.source.clear();
        self.category.clear();
    }
}

/// The state container. Pure transitions; no I/O.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    status: LoadStatus,
    category: CategoryFilter,
    facts: Vec<Fact>,
    form: FactForm,
    alert: Option<String>,
    loaded: bool,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn category(&self) -> CategoryFilter {
        self.category
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn form(&self) -> &FactForm {
        &self.form
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Whether any list query has been started yet.
    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    /// Look up a loaded fact by id.
    pub fn fact(&self, id: i64) -> Option<&Fact> {
        self.facts.iter().find(|f| f.id == id)
    }

    /// A category was picked: start a new list query.
    pub fn begin_load(&mut self, filter: CategoryFilter) {
        self.category = filter;
        self.status = LoadStatus::Loading;
        self.loaded = true;
    }

    /// A list query finished. Failures keep the previous facts hidden behind
    /// the error banner until the next successful load.
    pub fn finish_load(&mut self, result: Result<Vec<Fact>, StoreError>) {
        match result {
            Ok(facts) => {
                self.facts = facts;
                self.status = LoadStatus::Idle;
            }
            Err(e) => {
                warn!(error = %e, filter = %self.category, "failed to load facts");
                self.status = LoadStatus::Error;
            }
        }
    }

    /// A vote finished. The server's row replaces the local one with the same id.
    pub fn apply_vote(&mut self, result: Result<Fact, StoreError>) {
        match result {
            Ok(updated) => {
                if let Some(slot) = self.facts.iter_mut().find(|f| f.id == updated.id) {
                    *slot = updated;
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to record vote");
                self.alert = Some(VOTE_ERROR_MESSAGE.to_string());
            }
        }
    }

    /// A submission finished. Success prepends the fact and resets the form;
    /// failure leaves the form open with what the user typed.
    pub fn apply_created(&mut self, result: Result<Fact, StoreError>) {
        match result {
            Ok(fact) => {
                self.facts.insert(0, fact);
                self.form.clear();
                self.form.open = false;
            }
            Err(e) => {
                warn!(error = %e, "failed to create fact");
                self.form.open = true;
                self.alert = Some(CREATE_ERROR_MESSAGE.to_string());
            }
        }
    }

    /// Record what the user typed into the form.
    pub fn fill_form(&mut self, text: String, source: String, category: String) {
        self.form.open = true;
        self.form.text = text;
        self.form.source = source;
        self.form.category = category;
    }

    /// Header button: "Share a fact" / "Close".
    pub fn toggle_form(&mut self) {
        self.form.open = !self.form.open;
    }

    /// Return the pending alert and clear it, so it renders once.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }
}

/// What happened to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(i64),
    Invalid(ValidationError),
    Failed,
}

/// Drives the [`Feed`] from user actions through a [`FactStore`].
///
/// The feed lock is never held across a store call, so responses apply in
/// the order they arrive.
pub struct FeedController {
    store: Arc<dyn FactStore>,
    feed: RwLock<Feed>,
}

impl FeedController {
    pub fn new(store: Arc<dyn FactStore>) -> Self {
        Self {
            store,
            feed: RwLock::new(Feed::new()),
        }
    }

    /// Copy of the current state for rendering.
    pub async fn snapshot(&self) -> Feed {
        self.feed.read().await.clone()
    }

    /// Take the pending alert, if any.
    pub async fn take_alert(&self) -> Option<String> {
        self.feed.write().await.take_alert()
    }

    pub async fn toggle_form(&self) {
        self.feed.write().await.toggle_form();
    }

    /// Switch the filter and reload the list.
    pub async fn select_category(&self, filter: CategoryFilter) -> LoadStatus {
        self.feed.write().await.begin_load(filter);
        debug!(filter = %filter, "loading facts");

        let result = self.store.list_facts(filter).await;

        let mut feed = self.feed.write().await;
        feed.finish_load(result);
        feed.status()
    }

    /// Load the default list on first visit, or retry the current filter
    /// after a failed load.
    pub async fn ensure_loaded(&self) {
        let reload = {
            let feed = self.feed.read().await;
            if !feed.has_loaded() {
                Some(CategoryFilter::All)
            } else if feed.status() == LoadStatus::Error {
                Some(feed.category())
            } else {
                None
            }
        };

        if let Some(filter) = reload {
            self.select_category(filter).await;
        }
    }

    /// Vote on a loaded fact. Unknown ids are ignored.
    pub async fn vote(&self, id: i64, field: VoteField) -> bool {
        let Some(fact) = self.feed.read().await.fact(id).cloned() else {
            debug!(id, "vote for fact that is not loaded");
            return false;
        };

        let result = self.store.increment_vote(&fact, field).await;
        let ok = result.is_ok();
        self.feed.write().await.apply_vote(result);
        ok
    }

    /// Validate and submit the form. Invalid input sends nothing.
    pub async fn submit(&self, text: String, source: String, category: String) -> SubmitOutcome {
        let validated = validate_new_fact(&text, &source, &category);
        self.feed.write().await.fill_form(text, source, category);

        let new = match validated {
            Ok(new) => new,
            Err(e) => {
                debug!(error = %e, "submission rejected before sending");
                return SubmitOutcome::Invalid(e);
            }
        };

        let result = self.store.create_fact(&new).await;
        let outcome = match &result {
            Ok(fact) => SubmitOutcome::Created(fact.id),
            Err(_) => SubmitOutcome::Failed,
        };
        self.feed.write().await.apply_created(result);
        outcome
    }
}
