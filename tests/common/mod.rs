#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use editorial::app::AppState;
use editorial::config::SiteConfig;

pub const SITE: &str = "editorial-test";

/// Requests the fake CMS has received.
#[derive(Clone, Default)]
pub struct CmsLog {
    /// `(crafterSite, operationName)` per GraphQL call.
    pub graphql: Arc<Mutex<Vec<(Option<String>, String)>>>,
    pub search: Arc<Mutex<Vec<Value>>>,
    pub contact: Arc<Mutex<Vec<Value>>>,
}

impl CmsLog {
    pub fn graphql_operations(&self) -> Vec<String> {
        self.graphql.lock().unwrap().iter().map(|(_, op)| op.clone()).collect()
    }

    pub fn last_search(&self) -> Value {
        self.search.lock().unwrap().last().cloned().unwrap_or(Value::Null)
    }
}

/// How the fake CMS behaves.
#[derive(Clone)]
pub struct CmsBehavior {
    /// Body returned by the search endpoint.
    pub search_body: Value,
    pub contact_status: StatusCode,
    pub graphql_delay: Duration,
}

impl Default for CmsBehavior {
    fn default() -> Self {
        Self {
            search_body: json!({ "hits": { "total": { "value": 0 }, "hits": [] } }),
            contact_status: StatusCode::OK,
            graphql_delay: Duration::ZERO,
        }
    }
}

#[derive(Clone)]
struct CmsState {
    log: CmsLog,
    behavior: CmsBehavior,
}

/// A CMS stand-in serving GraphQL, search and a contact webhook on an ephemeral port.
pub struct FakeCms {
    pub addr: SocketAddr,
    pub log: CmsLog,
}

impl FakeCms {
    pub async fn start(behavior: CmsBehavior) -> Self {
        let log = CmsLog::default();
        let state = CmsState {
            log: log.clone(),
            behavior,
        };

        let router = Router::new()
            .route("/api/1/site/graphql", post(graphql_handler))
            .route("/api/1/site/elasticsearch/search", post(search_handler))
            .route("/hooks/contact", post(contact_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake CMS");
        let addr = listener.local_addr().expect("Failed to read fake CMS address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Fake CMS stopped");
        });

        Self { addr, log }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn config(&self, with_contact: bool) -> SiteConfig {
        SiteConfig {
            content_api_url: self.url("/api/1/site/graphql"),
            search_url: self.url("/api/1/site/elasticsearch/search"),
            site_name: SITE.to_string(),
            request_timeout_secs: 5,
            contact_webhook_url: with_contact.then(|| self.url("/hooks/contact")),
        }
    }
}

async fn graphql_handler(
    State(state): State<CmsState>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let operation = body["operationName"].as_str().unwrap_or_default().to_string();
    state
        .log
        .graphql
        .lock()
        .unwrap()
        .push((params.get("crafterSite").cloned(), operation.clone()));

    if !state.behavior.graphql_delay.is_zero() {
        tokio::time::sleep(state.behavior.graphql_delay).await;
    }

    Json(graphql_fixture(&operation))
}

async fn search_handler(State(state): State<CmsState>, Json(body): Json<Value>) -> Json<Value> {
    state.log.search.lock().unwrap().push(body);
    Json(state.behavior.search_body.clone())
}

async fn contact_handler(State(state): State<CmsState>, Json(body): Json<Value>) -> StatusCode {
    state.log.contact.lock().unwrap().push(body);
    state.behavior.contact_status
}

pub fn graphql_fixture(operation: &str) -> Value {
    match operation {
        "Posts" => json!({ "data": { "page_post": { "total": 1, "items": [ graphql_post("post-1", "Hello world") ] } } }),
        "Taxonomies" => json!({ "data": { "component_taxonomy": { "items": [
            {
                "guid": "tax-1",
                "path": "/site/taxonomy/categories.xml",
                "contentTypeId": "/component/taxonomy",
                "items": { "item": [ { "key": "travel", "value": "Travel" }, { "key": "food", "value": "Food" } ] }
            },
            {
                "guid": "tax-2",
                "path": "/site/taxonomy/tags.xml",
                "contentTypeId": "/component/taxonomy",
                "items": { "item": { "key": "spring", "value": "Spring" } }
            }
        ] } } }),
        "Footer" => json!({ "data": { "component_footer": { "items": [ {
            "about_t": "About this blog",
            "socialLinks_o": { "item": [ { "socialNetwork_s": "twitter", "url_s": "https://twitter.com/editorial" } ] },
            "quickLinks_o": { "item": [ { "label_s": "Contact", "url_s": "/contact" } ] }
        } ] } } }),
        "Nav" => json!({ "data": { "pages": { "items": [
            { "navLabel": "Contact", "contentTypeId": "/page/entry", "url": "/contact", "orderDefault_f": 2 },
            { "navLabel": "Home", "contentTypeId": "/page/entry", "url": "/", "orderDefault_f": 1 }
        ] } } }),
        "LevelDescriptor" => json!({ "data": { "component_level__descriptor": { "items": [ { "siteTitle_s": "Editorial" } ] } } }),
        other => json!({ "errors": [ { "message": format!("unknown operation '{other}'") } ], "data": null }),
    }
}

pub fn graphql_post(id: &str, headline: &str) -> Value {
    json!({
        "guid": id,
        "path": format!("/site/website/articles/{id}/index.xml"),
        "contentTypeId": "/page/post",
        "dateModified": "2020-03-13T17:34:14.000Z",
        "slug": format!("/articles/{id}"),
        "headline_s": headline,
        "blurb_t": "A short blurb",
        "categories_o": { "item": [ { "key": "travel", "value_smv": "Travel" } ] }
    })
}

/// An indexed post as the search service returns it.
pub fn indexed_post(id: &str, headline: &str) -> Value {
    json!({
        "_id": id,
        "_source": {
            "objectId": id,
            "localId": format!("/site/website/articles/{id}/index.xml"),
            "content-type": "/page/post",
            "headline_s": headline,
            "lastModifiedDate_dt": "2020-03-13T17:34:14.000Z",
            "authorBio_o": { "item": [ { "key": "bio", "component": { "name_s": "Jane", "profilePic_s": "/jane.png" } } ] },
            "categories_o": { "item": [ { "key": "travel", "value_smv": "Travel" } ] }
        }
    })
}

/// A fake CMS plus the API router wired to it through the real HTTP clients.
pub struct TestEnv {
    pub cms: FakeCms,
    pub state: AppState,
    pub router: Router,
}

impl TestEnv {
    pub async fn start(behavior: CmsBehavior) -> Self {
        Self::start_with(behavior, true).await
    }

    pub async fn start_with(behavior: CmsBehavior, with_contact: bool) -> Self {
        let cms = FakeCms::start(behavior).await;

        let leptos_options = leptos::prelude::LeptosOptions::builder()
            .output_name("editorial")
            .build();
        let state = AppState::from_config(&cms.config(with_contact), leptos_options)
            .expect("Failed to build AppState");

        // API routes only, no Leptos SSR
        let router = editorial::app::api_routes().with_state(state.clone());

        Self { cms, state, router }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
    }
}
