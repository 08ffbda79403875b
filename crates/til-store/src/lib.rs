//! Table-store client for Today I Learned.
//!
//! This crate provides the fact data model and a client for the hosted
//! table store that persists it.
//!
//! ## Features
//!
//! - **HTTP Client**: filtered/ordered select, insert and vote update on the `facts` table
//! - **Categories**: the fixed category set and its color palette
//! - **Validation**: client-side checks run before a fact is submitted

mod category;
mod client;
mod error;
pub mod records;
mod store;
mod types;
mod validate;

pub use category::{
    ALL_CATEGORIES, Categories, Category, CategoryFilter, DEFAULT_CATEGORY_COLOR, UnknownCategory,
};
pub use client::TableClient;
pub use error::{StoreError, ValidationError};
pub use records::{FACTS_TABLE, MAX_FACT_LEN};
pub use store::FactStore;
pub use types::{Fact, NewFact, UnknownVoteField, VoteField};
pub use validate::{remaining_chars, validate_new_fact};
