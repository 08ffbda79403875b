//! REST client for the hosted table store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::records::{CATEGORY_COLUMN, CREATED_AT_COLUMN, FACTS_TABLE, ID_COLUMN, REST_PATH};
use crate::{CategoryFilter, Fact, FactStore, NewFact, StoreError, VoteField};

/// Client for one table of a PostgREST-style store.
///
/// Every request is sent once; failures are returned to the caller as-is.
pub struct TableClient {
    http: Client,
    base_url: String,
    table: String,
    api_key: String,
}

impl TableClient {
    /// Create a client for the `facts` table at `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, StoreError> {
        Self::with_table(base_url, api_key, FACTS_TABLE)
    }

    /// Create a client for a specific table.
    pub fn with_table(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let base_url = base_url.into();
        let parsed =
            Url::parse(&base_url).map_err(|e| StoreError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(StoreError::InvalidBaseUrl(base_url));
        }

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            table: table.into(),
            api_key: api_key.into(),
        })
    }

    /// Get the store base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    fn table_url(&self) -> String {
        format!("{}/{}/{}", self.base_url, REST_PATH, self.table)
    }

    /// Attach the public key the store expects on every request.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Send a request that returns rows and take the single row it should hold.
    async fn single_row(&self, request: RequestBuilder, id: Option<i64>) -> Result<Fact, StoreError> {
        let response = self
            .authorize(request)
            .header("Prefer", "return=representation")
            .send()
            .await?;

        let mut rows: Vec<Fact> = Self::handle_response(response).await?;
        match (rows.len(), id) {
            (1, _) => Ok(rows.remove(0)),
            (0, Some(id)) => Err(StoreError::NotFound { id }),
            (n, _) => Err(StoreError::InvalidResponse(format!(
                "expected one row, got {}",
                n
            ))),
        }
    }

    /// Handle a response, mapping store error bodies.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.map_err(|e| {
                StoreError::InvalidResponse(format!(
                    "request failed ({}): failed to read response: {}",
                    status, e
                ))
            })?;

            let message = serde_json::from_str::<StoreErrorBody>(&text)
                .map(|body| match body.code {
                    Some(code) => format!("{} ({})", body.message, code),
                    None => body.message,
                })
                .unwrap_or(text);

            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json().await?;
        Ok(body)
    }
}

#[async_trait]
impl FactStore for TableClient {
    async fn list_facts(&self, filter: CategoryFilter) -> Result<Vec<Fact>, StoreError> {
        let mut query: Vec<(&str, String)> = vec![("select", "*".to_string())];
        if let CategoryFilter::Only(category) = filter {
            query.push((CATEGORY_COLUMN, format!("eq.{}", category)));
        }
        query.push(("order", format!("{}.desc", CREATED_AT_COLUMN)));

        debug!(table = %self.table, filter = %filter, "listing facts");

        let response = self
            .authorize(self.http.get(self.table_url()))
            .query(&query)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn create_fact(&self, new: &NewFact) -> Result<Fact, StoreError> {
        debug!(table = %self.table, category = %new.category(), "creating fact");

        let request = self.http.post(self.table_url()).json(&[new]);
        let fact = self.single_row(request, None).await?;

        debug!(id = fact.id, "created fact");
        Ok(fact)
    }

    async fn increment_vote(&self, fact: &Fact, field: VoteField) -> Result<Fact, StoreError> {
        let next = fact.votes(field).checked_add(1).ok_or_else(|| {
            StoreError::InvalidResponse(format!(
                "{} of fact {} is already at its maximum",
                field, fact.id
            ))
        })?;

        let mut body = serde_json::Map::new();
        body.insert(field.column().to_string(), next.into());

        debug!(id = fact.id, field = %field, value = next, "updating vote");

        let request = self
            .http
            .patch(self.table_url())
            .query(&[(ID_COLUMN, format!("eq.{}", fact.id))])
            .json(&body);

        self.single_row(request, Some(fact.id)).await
    }
}

/// Error body returned by the store.
#[derive(Debug, serde::Deserialize)]
struct StoreErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, validate_new_fact};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn row(id: i64, category: &str, interesting: u32) -> serde_json::Value {
        json!({
            "id": id,
            "text": format!("fact number {}", id),
            "source": "https://example.com/",
            "category": category,
            "votes_interesting": interesting,
            "votes_mind_blowing": 0,
            "votes_false": 0,
            "created_at": "2024-05-01T12:00:00Z"
        })
    }

    #[test]
    fn test_client_creation() {
        let client = TableClient::new("https://example.supabase.co/", "key").unwrap();
        assert_eq!(client.base_url(), "https://example.supabase.co");
        assert_eq!(client.table(), "facts");
        assert_eq!(
            client.table_url(),
            "https://example.supabase.co/rest/v1/facts"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = TableClient::new("not a url", "key");
        assert!(matches!(result, Err(StoreError::InvalidBaseUrl(_))));
    }

    #[tokio::test]
    async fn test_list_all_sends_no_filter() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/facts"))
            .and(query_param("select", "*"))
            .and(query_param("order", "created_at.desc"))
            .and(query_param_is_missing("category"))
            .and(header("apikey", "public-key"))
            .and(header("Authorization", "Bearer public-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([row(2, "science", 1), row(1, "news", 0)])),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = TableClient::new(mock_server.uri(), "public-key").unwrap();
        let facts = client.list_facts(CategoryFilter::All).await.unwrap();

        assert_eq!(facts.iter().map(|f| f.id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_list_with_category_filter() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/facts"))
            .and(query_param("category", "eq.science"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = TableClient::new(mock_server.uri(), "public-key").unwrap();
        let facts = client
            .list_facts(CategoryFilter::Only(Category::Science))
            .await
            .unwrap();

        assert!(facts.is_empty());
    }

    #[tokio::test]
    async fn test_list_maps_store_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/facts"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "code": "PGRST301",
                "message": "JWT expired",
                "details": null,
                "hint": null
            })))
            .mount(&mock_server)
            .await;

        let client = TableClient::new(mock_server.uri(), "public-key").unwrap();
        let err = client.list_facts(CategoryFilter::All).await.unwrap_err();

        match err {
            StoreError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "JWT expired (PGRST301)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_plain_text_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/facts"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&mock_server)
            .await;

        let client = TableClient::new(mock_server.uri(), "public-key").unwrap();
        let err = client.list_facts(CategoryFilter::All).await.unwrap_err();

        assert!(matches!(
            err,
            StoreError::Api { status: 503, ref message } if message == "upstream down"
        ));
    }

    #[tokio::test]
    async fn test_create_returns_stored_row() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/facts"))
            .and(header("Prefer", "return=representation"))
            .and(body_json(json!([{
                "text": "fact number 9",
                "source": "https://example.com/",
                "category": "history"
            }])))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([row(9, "history", 0)])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = TableClient::new(mock_server.uri(), "public-key").unwrap();
        let new = validate_new_fact("fact number 9", "https://example.com/", "history").unwrap();
        let fact = client.create_fact(&new).await.unwrap();

        assert_eq!(fact.id, 9);
        assert_eq!(fact.category, Category::History);
        assert_eq!(fact.votes_interesting, 0);
    }

    #[tokio::test]
    async fn test_create_empty_representation_is_invalid() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/facts"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let client = TableClient::new(mock_server.uri(), "public-key").unwrap();
        let new = validate_new_fact("x", "https://example.com/", "news").unwrap();
        let err = client.create_fact(&new).await.unwrap_err();

        assert!(matches!(err, StoreError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_increment_vote_writes_local_count_plus_one() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/facts"))
            .and(query_param("id", "eq.3"))
            .and(body_json(json!({ "votes_interesting": 5 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(3, "science", 5)])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = TableClient::new(mock_server.uri(), "public-key").unwrap();
        let local: Fact = serde_json::from_value(row(3, "science", 4)).unwrap();
        let updated = client
            .increment_vote(&local, VoteField::Interesting)
            .await
            .unwrap();

        assert_eq!(updated.votes_interesting, 5);
    }

    #[tokio::test]
    async fn test_increment_vote_missing_row() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/facts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let client = TableClient::new(mock_server.uri(), "public-key").unwrap();
        let local: Fact = serde_json::from_value(row(42, "news", 0)).unwrap();
        let err = client
            .increment_vote(&local, VoteField::False)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound { id: 42 }));
    }

    #[tokio::test]
    async fn test_increment_vote_at_max_sends_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(8, "news", 0)])))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = TableClient::new(mock_server.uri(), "public-key").unwrap();
        let mut local: Fact = serde_json::from_value(row(8, "news", 0)).unwrap();
        local.votes_mind_blowing = u32::MAX;
        let err = client
            .increment_vote(&local, VoteField::MindBlowing)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::InvalidResponse(_)));
    }
}
