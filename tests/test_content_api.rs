mod common;

use std::time::Duration;

use common::{CmsBehavior, FakeCms, SITE};
use editorial::content::client::{fetch_payload, GraphqlContentClient};
use editorial::content::queries::{ContentPayload, ContentType};
use editorial::content::store::{Completion, ContentSlot, ContentStore, EntryState, PostsSlot};
use editorial::error::AppError;
use editorial::models::content::find_taxonomy_entries;

fn client(cms: &FakeCms, timeout: Duration) -> GraphqlContentClient {
    GraphqlContentClient::new(&cms.url("/api/1/site/graphql"), SITE, timeout)
        .expect("Failed to build content client")
}

#[tokio::test]
async fn every_content_type_decodes() {
    let cms = FakeCms::start(CmsBehavior::default()).await;
    let client = client(&cms, Duration::from_secs(5));

    for content_type in ContentType::ALL {
        let payload = fetch_payload(&client, content_type).await.unwrap();
        assert_eq!(payload.content_type(), content_type);
    }

    assert_eq!(
        cms.log.graphql_operations(),
        vec!["Posts", "Taxonomies", "Footer", "Nav", "LevelDescriptor"]
    );
    let sites: Vec<Option<String>> = cms.log.graphql.lock().unwrap().iter().map(|(s, _)| s.clone()).collect();
    assert!(sites.iter().all(|s| s.as_deref() == Some(SITE)));
}

#[tokio::test]
async fn navigation_is_sorted_and_taxonomies_resolve() {
    let cms = FakeCms::start(CmsBehavior::default()).await;
    let client = client(&cms, Duration::from_secs(5));

    match fetch_payload(&client, ContentType::Pages).await.unwrap() {
        ContentPayload::Pages(pages) => {
            let labels: Vec<&str> = pages.iter().map(|p| p.label.as_str()).collect();
            assert_eq!(labels, vec!["Home", "Contact"]);
        }
        other => panic!("Expected pages, got: {:?}", other),
    }

    match fetch_payload(&client, ContentType::Taxonomies).await.unwrap() {
        ContentPayload::Taxonomies(taxonomies) => {
            let categories = find_taxonomy_entries(&taxonomies, "categories.xml").unwrap();
            assert_eq!(categories.len(), 2);
            let tags = find_taxonomy_entries(&taxonomies, "tags.xml").unwrap();
            assert_eq!(tags[0].key, "spring");
            assert!(matches!(
                find_taxonomy_entries(&taxonomies, "authors.xml"),
                Err(AppError::NotFound(_))
            ));
        }
        other => panic!("Expected taxonomies, got: {:?}", other),
    }
}

#[tokio::test]
async fn concurrent_hooks_issue_one_request_and_then_hit_cache() {
    let cms = FakeCms::start(CmsBehavior {
        graphql_delay: Duration::from_millis(100),
        ..CmsBehavior::default()
    })
    .await;
    let client = &client(&cms, Duration::from_secs(5));
    let store = ContentStore::new();

    let fetch = move || async move {
        let payload = fetch_payload(client, ContentType::Posts).await?;
        PostsSlot::from_payload(payload)
    };

    let (_canceller, task) = store.begin_fetch::<PostsSlot, _, _>(fetch).unwrap();
    assert!(store.begin_fetch::<PostsSlot, _, _>(fetch).is_none());
    assert!(store.state::<PostsSlot>().is_pending());

    assert_eq!(task.await, Completion::Applied);
    let posts = store.state::<PostsSlot>().value().unwrap();
    assert_eq!(posts[0].headline, "Hello world");

    assert!(store.begin_fetch::<PostsSlot, _, _>(fetch).is_none());
    assert_eq!(cms.log.graphql_operations(), vec!["Posts"]);
}

#[tokio::test]
async fn slow_backend_fails_the_entry_with_timeout() {
    let cms = FakeCms::start(CmsBehavior {
        graphql_delay: Duration::from_secs(2),
        ..CmsBehavior::default()
    })
    .await;
    let client = &client(&cms, Duration::from_millis(200));
    let store = ContentStore::new();

    let (_canceller, task) = store
        .begin_fetch::<PostsSlot, _, _>(move || async move {
            let payload = fetch_payload(client, ContentType::Posts).await?;
            PostsSlot::from_payload(payload)
        })
        .unwrap();

    assert_eq!(task.await, Completion::Applied);
    match store.state::<PostsSlot>() {
        EntryState::Failed(AppError::Timeout(_)) => {}
        other => panic!("Expected a timeout, got: {:?}", other),
    }

    assert!(store.reset::<PostsSlot>());
    assert!(matches!(store.state::<PostsSlot>(), EntryState::Idle));
}
