//! Search execution against the hosted service

use super::models::{SearchOptions, SearchParameters};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::network::{HttpClient, Transport};
use crate::results::{Hit, HitId, Record, ResponseInfo, SearchResponse};
use crate::API_VERSION;
use tracing::{debug, info, warn};

/// One search against the service and the hits it produced.
///
/// A searcher starts out unsearched; derived views fail with
/// [`Error::NotSearched`] until [`Searcher::search`] succeeds. Searching again
/// repeats the request and replaces the previous results.
pub struct Searcher<T = HttpClient> {
    endpoint: String,
    transport: T,
    params: SearchParameters,
    response: Option<SearchResponse>,
}

impl<T: Transport> Searcher<T> {
    /// Create a searcher for `endpoint` (no trailing slash)
    pub fn new(endpoint: impl Into<String>, transport: T, params: SearchParameters) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
            params,
            response: None,
        }
    }

    pub fn parameters(&self) -> &SearchParameters {
        &self.params
    }

    /// Full request URL for this search
    pub fn search_url(&self) -> String {
        format!(
            "{}/{}/search?{}",
            self.endpoint,
            API_VERSION,
            self.params.query_builder().build()
        )
    }

    /// Run the search and store the hits.
    ///
    /// Any failure leaves the searcher without results.
    pub async fn search(&mut self) -> Result<&[Hit]> {
        self.response = None;

        let url = self.search_url();
        debug!("Searching {}", url);

        let response = self.transport.get(&url).await?;
        debug!("Search responded with status {}", response.status);

        if !response.is_ok() {
            warn!("Search failed with status code {}", response.status);
            return Err(Error::SearchRequest {
                status: response.status,
                body: response.text,
            });
        }

        let parsed: SearchResponse = response.json()?;
        info!(
            "Search returned {} hits ({} found, starting at {})",
            parsed.hits.hit.len(),
            parsed.hits.found,
            parsed.hits.start
        );

        let stored = self.response.insert(parsed);
        Ok(&stored.hits.hit)
    }

    pub fn is_searched(&self) -> bool {
        self.response.is_some()
    }

    /// Full response of the last successful search
    pub fn response(&self) -> Result<&SearchResponse> {
        self.response.as_ref().ok_or(Error::NotSearched)
    }

    /// Hits in the order the service ranked them
    pub fn results(&self) -> Result<&[Hit]> {
        Ok(&self.response()?.hits.hit)
    }

    pub fn ids(&self) -> Result<Vec<HitId>> {
        Ok(self.results()?.iter().map(|hit| hit.id.clone()).collect())
    }

    /// `{ type => id }` for every hit; each hit needs a scalar `type` field
    pub fn records(&self) -> Result<Vec<Record>> {
        self.results()?
            .iter()
            .enumerate()
            .map(|(index, hit)| -> Result<Record> {
                let record_type = hit.record_type().ok_or(Error::MalformedResult {
                    index,
                    field: "type",
                })?;
                Ok(Record::new(record_type, hit.id.clone()))
            })
            .collect()
    }

    /// Total number of matching documents
    pub fn found(&self) -> Result<u64> {
        Ok(self.response()?.hits.found)
    }

    /// Offset of the first returned hit
    pub fn start(&self) -> Result<u64> {
        Ok(self.response()?.hits.start)
    }

    pub fn response_info(&self) -> Result<&ResponseInfo> {
        Ok(&self.response()?.info)
    }
}

/// Creates searchers bound to one endpoint and transport
#[derive(Clone)]
pub struct SearchClient<T = HttpClient> {
    endpoint: String,
    transport: T,
}

impl SearchClient<HttpClient> {
    /// Client using a reqwest transport built from `settings.outgoing`
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let transport = HttpClient::with_settings(&settings.outgoing)
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Self::new(settings, transport)
    }
}

impl<T: Transport + Clone> SearchClient<T> {
    pub fn new(settings: &Settings, transport: T) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            endpoint: settings.endpoint().to_string(),
            transport,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Searcher for free text, optionally narrowed by filters
    pub fn query(&self, query: impl Into<String>, options: SearchOptions) -> Result<Searcher<T>> {
        let params = SearchParameters::from_query(query, options)?;
        Ok(self.searcher(params))
    }

    /// Searcher for a filter-only boolean query
    pub fn filters(&self, options: SearchOptions) -> Result<Searcher<T>> {
        let params = SearchParameters::from_filters(options)?;
        Ok(self.searcher(params))
    }

    pub fn searcher(&self, params: SearchParameters) -> Searcher<T> {
        Searcher::new(self.endpoint.clone(), self.transport.clone(), params)
    }

    /// Build and run a plain query in one step.
    ///
    /// A missing query is rejected before any request is made.
    pub async fn search(&self, query: Option<&str>) -> Result<Searcher<T>> {
        let query = query.ok_or(Error::InvalidQuery)?;
        let mut searcher = self.query(query, SearchOptions::default())?;
        searcher.search().await?;
        Ok(searcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::TransportResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    const ENDPOINT: &str = "http://my.search-endpoint.com";

    fn fixture_hits() -> serde_json::Value {
        json!([
            {"id": 1, "title": "Foobar", "type": "cat"},
            {"id": 2, "title": "Foobar2", "type": "dog"}
        ])
    }

    fn fixture_body() -> String {
        format!(
            r#"{{"rank":"-text_relevance","match-expr":"(label 'star wars')","hits":{{"found":2,"start":0,"hit":{}}},"info":{{"rid":"9d3b24b0e3399866dd8d376a7b1e0f6e","time-ms":3,"cpu-time-ms":0}}}}"#,
            fixture_hits()
        )
    }

    /// Replays canned responses and records every URL requested
    #[derive(Clone)]
    struct StubTransport {
        responses: Arc<Mutex<Vec<anyhow::Result<TransportResponse>>>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl StubTransport {
        fn replying(status: u16, body: impl Into<String>) -> Self {
            Self::with(vec![Ok(TransportResponse::new(status, body))])
        }

        fn with(mut responses: Vec<anyhow::Result<TransportResponse>>) -> Self {
            responses.reverse();
            Self {
                responses: Arc::new(Mutex::new(responses)),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn get(&self, url: &str) -> anyhow::Result<TransportResponse> {
            self.calls.lock().unwrap().push(url.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no response stubbed")))
        }
    }

    fn client(transport: &StubTransport) -> SearchClient<StubTransport> {
        SearchClient::new(&Settings::with_endpoint(ENDPOINT), transport.clone()).unwrap()
    }

    fn return_fields() -> SearchOptions {
        SearchOptions::new().return_fields(["title", "year", "%"])
    }

    #[tokio::test]
    async fn test_search_should_set_results() {
        let transport = StubTransport::replying(200, fixture_body());
        let mut searcher = client(&transport).query("Star Wars", return_fields()).unwrap();

        let hits = searcher.search().await.unwrap();
        assert_eq!(serde_json::to_value(hits).unwrap(), fixture_hits());
        assert_eq!(
            serde_json::to_value(searcher.results().unwrap()).unwrap(),
            fixture_hits()
        );
        assert_eq!(
            transport.calls(),
            vec![format!(
                "{}/2011-02-01/search?q=Star%20Wars&return-fields=title,year,%25",
                ENDPOINT
            )]
        );
    }

    #[tokio::test]
    async fn test_search_should_set_ids() {
        let transport = StubTransport::replying(200, fixture_body());
        let mut searcher = client(&transport).query("Star Wars", return_fields()).unwrap();
        searcher.search().await.unwrap();

        assert_eq!(
            searcher.ids().unwrap(),
            vec![HitId::Integer(1), HitId::Integer(2)]
        );
    }

    #[tokio::test]
    async fn test_search_should_set_records() {
        let transport = StubTransport::replying(200, fixture_body());
        let mut searcher = client(&transport).query("Star Wars", return_fields()).unwrap();
        searcher.search().await.unwrap();

        let records = searcher.records().unwrap();
        assert_eq!(
            records,
            vec![Record::new("cat", 1i64), Record::new("dog", 2i64)]
        );
        assert_eq!(
            serde_json::to_value(&records).unwrap(),
            json!([{"cat": 1}, {"dog": 2}])
        );
    }

    #[tokio::test]
    async fn test_search_exposes_page_metadata() {
        let transport = StubTransport::replying(200, fixture_body());
        let mut searcher = client(&transport).query("Star Wars", return_fields()).unwrap();
        searcher.search().await.unwrap();

        assert_eq!(searcher.found().unwrap(), 2);
        assert_eq!(searcher.start().unwrap(), 0);
        assert_eq!(searcher.response_info().unwrap().time_ms, Some(3));
        assert_eq!(
            searcher.response().unwrap().rank.as_deref(),
            Some("-text_relevance")
        );
    }

    #[tokio::test]
    async fn test_search_raises_error_when_response_not_200() {
        let transport = StubTransport::replying(500, "Bad Happened");
        let mut searcher = client(&transport)
            .query("Star Wars", SearchOptions::new())
            .unwrap();

        let err = searcher.search().await.unwrap_err();
        match &err {
            Error::SearchRequest { status, body } => {
                assert_eq!(*status, 500);
                assert_eq!(body, "Bad Happened");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.to_string(), "Search failed with status code 500");
        assert!(!searcher.is_searched());
        assert!(matches!(searcher.results(), Err(Error::NotSearched)));
    }

    #[tokio::test]
    async fn test_searcher_should_raise_error_if_query_null() {
        let transport = StubTransport::replying(200, fixture_body());
        let result = client(&transport).search(None).await;

        assert!(matches!(result, Err(Error::InvalidQuery)));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_convenience_search_runs_query() {
        let transport = StubTransport::replying(200, fixture_body());
        let searcher = client(&transport).search(Some("Star Wars")).await.unwrap();

        assert_eq!(searcher.ids().unwrap().len(), 2);
        assert_eq!(
            transport.calls(),
            vec![format!("{}/2011-02-01/search?q=Star%20Wars", ENDPOINT)]
        );
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let transport = StubTransport::with(vec![Err(anyhow::anyhow!("connection refused"))]);
        let mut searcher = client(&transport)
            .query("Star Wars", SearchOptions::new())
            .unwrap();

        let err = searcher.search().await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unparsable_body() {
        let transport = StubTransport::replying(200, "<html>oops</html>");
        let mut searcher = client(&transport)
            .query("Star Wars", SearchOptions::new())
            .unwrap();

        assert!(matches!(searcher.search().await, Err(Error::Parse(_))));
        assert!(!searcher.is_searched());
    }

    #[tokio::test]
    async fn test_failed_search_clears_previous_results() {
        let transport = StubTransport::with(vec![
            Ok(TransportResponse::new(200, fixture_body())),
            Ok(TransportResponse::new(503, "Unavailable")),
        ]);
        let mut searcher = client(&transport)
            .query("Star Wars", SearchOptions::new())
            .unwrap();

        searcher.search().await.unwrap();
        assert!(searcher.is_searched());

        assert!(searcher.search().await.is_err());
        assert!(matches!(searcher.ids(), Err(Error::NotSearched)));
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_records_require_type() {
        let body = r#"{"hits":{"found":2,"start":0,"hit":[{"id":1,"type":"cat"},{"id":2,"title":"untyped"}]}}"#;
        let transport = StubTransport::replying(200, body);
        let mut searcher = client(&transport)
            .query("Star Wars", SearchOptions::new())
            .unwrap();
        searcher.search().await.unwrap();

        assert!(matches!(
            searcher.records(),
            Err(Error::MalformedResult { index: 1, field: "type" })
        ));
        assert_eq!(searcher.ids().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_records_stringify_scalar_type() {
        let body = r#"{"hits":{"found":1,"start":0,"hit":[{"id":1,"type":5}]}}"#;
        let transport = StubTransport::replying(200, body);
        let mut searcher = client(&transport)
            .query("Star Wars", SearchOptions::new())
            .unwrap();
        searcher.search().await.unwrap();

        assert_eq!(searcher.records().unwrap(), vec![Record::new("5", 1i64)]);
    }

    #[test]
    fn test_accessors_before_search() {
        let transport = StubTransport::replying(200, fixture_body());
        let searcher = client(&transport)
            .query("Star Wars", SearchOptions::new())
            .unwrap();

        assert!(matches!(searcher.results(), Err(Error::NotSearched)));
        assert!(matches!(searcher.ids(), Err(Error::NotSearched)));
        assert!(matches!(searcher.records(), Err(Error::NotSearched)));
        assert!(matches!(searcher.found(), Err(Error::NotSearched)));
    }

    #[test]
    fn test_client_requires_valid_endpoint() {
        let transport = StubTransport::replying(200, fixture_body());
        let result = SearchClient::new(&Settings::default(), transport);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_client_from_settings_rejects_bad_timeout() {
        for timeout in [-1.0, f64::NAN, f64::INFINITY] {
            let mut settings = Settings::with_endpoint(ENDPOINT);
            settings.outgoing.request_timeout = timeout;
            assert!(matches!(
                SearchClient::from_settings(&settings),
                Err(Error::Config(_))
            ));
        }
    }

    #[test]
    fn test_client_strips_trailing_slash() {
        let transport = StubTransport::replying(200, fixture_body());
        let client =
            SearchClient::new(&Settings::with_endpoint(format!("{}/", ENDPOINT)), transport)
                .unwrap();
        assert_eq!(client.endpoint(), ENDPOINT);
    }

    #[test]
    fn test_create_correct_search_url_without_return_fields() {
        let transport = StubTransport::replying(200, fixture_body());
        let searcher = client(&transport)
            .query("Star Wars", SearchOptions::new())
            .unwrap();
        assert_eq!(
            searcher.search_url(),
            "http://my.search-endpoint.com/2011-02-01/search?q=Star%20Wars"
        );
    }

    #[test]
    fn test_create_correct_search_url_including_return_fields() {
        let transport = StubTransport::replying(200, fixture_body());
        let searcher = client(&transport).query("Star Wars", return_fields()).unwrap();
        assert_eq!(
            searcher.search_url(),
            "http://my.search-endpoint.com/2011-02-01/search?q=Star%20Wars&return-fields=title,year,%25"
        );
    }

    #[test]
    fn test_create_boolean_query_search_url_with_only_filters() {
        let transport = StubTransport::replying(200, fixture_body());
        let searcher = client(&transport)
            .filters(SearchOptions::new().filter("title", "Star Wars"))
            .unwrap();
        assert_eq!(
            searcher.search_url(),
            "http://my.search-endpoint.com/2011-02-01/search?bq=(and%20title:'Star%20Wars')"
        );
    }

    #[test]
    fn test_create_boolean_query_search_url_with_query_and_filters() {
        let transport = StubTransport::replying(200, fixture_body());
        let searcher = client(&transport)
            .query("Star Wars", SearchOptions::new().filter("genre", "Animation"))
            .unwrap();
        assert_eq!(
            searcher.search_url(),
            "http://my.search-endpoint.com/2011-02-01/search?bq=(and%20'Star%20Wars'%20genre:'Animation')"
        );
    }

    #[test]
    fn test_create_boolean_query_search_url_with_query_and_filters_and_return_fields() {
        let transport = StubTransport::replying(200, fixture_body());
        let options = return_fields().filter("genre", "Animation");
        let searcher = client(&transport).query("Star Wars", options).unwrap();
        assert_eq!(
            searcher.search_url(),
            "http://my.search-endpoint.com/2011-02-01/search?bq=(and%20'Star%20Wars'%20genre:'Animation')&return-fields=title,year,%25"
        );
    }

    #[test]
    fn test_create_search_url_with_added_arguments() {
        let transport = StubTransport::replying(200, fixture_body());
        let options = SearchOptions::new()
            .filter("genre", "Animation")
            .argument("facet", "genre")
            .argument("facet-genre-constraints", "Animation")
            .argument("facet-genre-top-n", "5");
        let searcher = client(&transport).query("Star Wars", options).unwrap();
        assert_eq!(
            searcher.search_url(),
            "http://my.search-endpoint.com/2011-02-01/search?bq=(and%20'Star%20Wars'%20genre:'Animation')&facet=genre&facet-genre-constraints=Animation&facet-genre-top-n=5"
        );
    }

    #[tokio::test]
    async fn test_search_over_http() {
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2011-02-01/search"))
            .and(query_param("bq", "(and 'Star Wars' genre:'Animation')"))
            .and(query_param("return-fields", "title"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = SearchClient::from_settings(&Settings::with_endpoint(server.uri())).unwrap();
        let options = SearchOptions::new()
            .filter("genre", "Animation")
            .return_fields(["title"]);
        let mut searcher = client.query("Star Wars", options).unwrap();
        searcher.search().await.unwrap();

        assert_eq!(
            searcher.ids().unwrap(),
            vec![HitId::Integer(1), HitId::Integer(2)]
        );
    }
}
