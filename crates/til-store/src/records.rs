//! Table and column names of the hosted store.

/// Default table holding fact rows.
pub const FACTS_TABLE: &str = "facts";

/// REST path prefix under the store's base URL.
pub const REST_PATH: &str = "rest/v1";

pub const ID_COLUMN: &str = "id";
pub const CATEGORY_COLUMN: &str = "category";
pub const CREATED_AT_COLUMN: &str = "created_at";
pub const VOTES_INTERESTING_COLUMN: &str = "votes_interesting";
pub const VOTES_MIND_BLOWING_COLUMN: &str = "votes_mind_blowing";
pub const VOTES_FALSE_COLUMN: &str = "votes_false";

/// Maximum length of a fact's text, in characters.
pub const MAX_FACT_LEN: usize = 200;
