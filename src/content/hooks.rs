use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::content::queries::{ContentPayload, ContentType};
use crate::content::store::{
    Canceller, Completion, ContentSlot, ContentStore, EntryState, FooterSlot, LevelDescriptorSlot,
    PagesSlot, PostsSlot, TaxonomiesSlot,
};
use crate::error::AppError;
use crate::models::content::{find_taxonomy_entries, Post, Taxonomy, TaxonomyEntry};
use crate::models::site::{Footer, LevelDescriptor, NavPage};
use crate::platform::{sleep, with_deadline};

/// How long a browser-side content fetch may take before the entry fails.
pub const CLIENT_DEADLINE: Duration = Duration::from_secs(15);

/// The session's content store plus a signal bumped whenever an entry settles.
#[derive(Clone)]
pub struct ContentContext {
    pub store: ContentStore,
    revision: RwSignal<u64>,
}

impl ContentContext {
    pub fn new() -> Self {
        Self {
            store: ContentStore::new(),
            revision: RwSignal::new(0),
        }
    }

    fn bump(&self) {
        self.revision.update(|r| *r += 1);
    }

    /// Reactive read of the entry for `K`.
    pub fn state<K: ContentSlot>(&self) -> EntryState<K::Value> {
        self.revision.track();
        self.store.state::<K>()
    }

    /// Give a failed entry another try; mounted hooks refetch it.
    pub fn retry<K: ContentSlot>(&self) {
        if self.store.reset::<K>() {
            self.bump();
        }
    }
}

impl Default for ContentContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the session store and provide it to the component tree.
pub fn provide_content_store() -> ContentContext {
    let ctx = ContentContext::new();
    provide_context(ctx.clone());
    ctx
}

pub fn use_content_context() -> ContentContext {
    expect_context::<ContentContext>()
}

/// Run a content query on the server and return its decoded payload.
#[server(LoadContent, "/api")]
pub async fn load_content(content_type: ContentType) -> Result<ContentPayload, ServerFnError> {
    use crate::content::client::fetch_payload;

    let state = expect_context::<crate::app::AppState>();
    fetch_payload(state.content_client.as_ref(), content_type)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

async fn fetch_slot<K: ContentSlot>() -> Result<K::Value, AppError> {
    let payload = load_content(K::TYPE)
        .await
        .map_err(|e| AppError::ContentApi(e.to_string()))?;
    K::from_payload(payload)
}

/// One mounted reader of the store and the fetch it started, if any.
#[derive(Clone, Default)]
struct Reader {
    inflight: Arc<Mutex<Option<Canceller>>>,
}

impl Reader {
    /// Start the fetch for `K` unless the entry is already claimed or settled.
    ///
    /// The returned task must be driven to completion; it bumps the revision
    /// once the entry settles.
    fn claim<K, F, Fut>(&self, ctx: &ContentContext, fetch: F) -> Option<impl Future<Output = ()>>
    where
        K: ContentSlot,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<K::Value, AppError>>,
    {
        let (canceller, task) = ctx.store.begin_fetch::<K, _, _>(fetch)?;
        *lock(&self.inflight) = Some(canceller);

        let ctx = ctx.clone();
        let inflight = Arc::clone(&self.inflight);
        Some(async move {
            let completion = task.await;
            lock(&inflight).take();
            if completion == Completion::Applied {
                ctx.bump();
            }
        })
    }

    /// Cancel an unsettled fetch so another mounted reader can claim the entry.
    fn release(&self, ctx: &ContentContext) {
        if let Some(canceller) = lock(&self.inflight).take() {
            canceller.cancel();
            ctx.bump();
        }
    }
}

fn lock<T>(slot: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read the entry for `K`, fetching it once per session.
///
/// The fetch starts when the calling view mounts in the browser and is
/// cancelled if the view is torn down before it settles.
pub fn use_content<K: ContentSlot>() -> Signal<EntryState<K::Value>> {
    let ctx = use_content_context();
    let reader = Reader::default();

    Effect::new({
        let ctx = ctx.clone();
        let reader = reader.clone();
        move |_| {
            ctx.revision.track();

            let what = K::TYPE.to_string();
            let started = reader.claim::<K, _, _>(&ctx, move || async move {
                with_deadline(fetch_slot::<K>(), sleep(CLIENT_DEADLINE), &what).await
            });
            if let Some(task) = started {
                spawn_local(task);
            }
        }
    });

    on_cleanup({
        let ctx = ctx.clone();
        move || reader.release(&ctx)
    });

    Signal::derive(move || ctx.state::<K>())
}

pub fn use_posts() -> Signal<EntryState<Vec<Post>>> {
    use_content::<PostsSlot>()
}

pub fn use_taxonomies() -> Signal<EntryState<Vec<Taxonomy>>> {
    use_content::<TaxonomiesSlot>()
}

pub fn use_footer() -> Signal<EntryState<Footer>> {
    use_content::<FooterSlot>()
}

pub fn use_navigation() -> Signal<EntryState<Vec<NavPage>>> {
    use_content::<PagesSlot>()
}

pub fn use_level_descriptor() -> Signal<EntryState<LevelDescriptor>> {
    use_content::<LevelDescriptorSlot>()
}

fn use_taxonomy(file_name: &'static str) -> Signal<EntryState<Vec<TaxonomyEntry>>> {
    let taxonomies = use_taxonomies();
    Signal::derive(move || {
        taxonomies
            .get()
            .and_then(|all| find_taxonomy_entries(all, file_name))
    })
}

/// Entries of `categories.xml`.
pub fn use_categories() -> Signal<EntryState<Vec<TaxonomyEntry>>> {
    use_taxonomy("categories.xml")
}

/// Entries of `tags.xml`.
pub fn use_tags() -> Signal<EntryState<Vec<TaxonomyEntry>>> {
    use_taxonomy("tags.xml")
}
