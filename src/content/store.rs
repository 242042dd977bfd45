use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::content::queries::{ContentPayload, ContentType};
use crate::error::AppError;
use crate::models::content::{Post, Taxonomy};
use crate::models::site::{Footer, LevelDescriptor, NavPage};

/// Observable state of one content type.
#[derive(Debug)]
pub enum EntryState<T> {
    /// Nothing requested yet (or the last claim was released).
    Idle,
    Loading,
    Ready(Arc<T>),
    Failed(AppError),
}

impl<T> Clone for EntryState<T> {
    fn clone(&self) -> Self {
        match self {
            EntryState::Idle => EntryState::Idle,
            EntryState::Loading => EntryState::Loading,
            EntryState::Ready(value) => EntryState::Ready(Arc::clone(value)),
            EntryState::Failed(err) => EntryState::Failed(err.clone()),
        }
    }
}

impl<T> EntryState<T> {
    pub fn value(&self) -> Option<Arc<T>> {
        match self {
            EntryState::Ready(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, EntryState::Idle | EntryState::Loading)
    }

    /// Project a ready value; a projection error becomes `Failed`.
    pub fn and_then<U>(&self, f: impl FnOnce(&T) -> Result<U, AppError>) -> EntryState<U> {
        match self {
            EntryState::Idle => EntryState::Idle,
            EntryState::Loading => EntryState::Loading,
            EntryState::Ready(value) => match f(value) {
                Ok(projected) => EntryState::Ready(Arc::new(projected)),
                Err(err) => EntryState::Failed(err),
            },
            EntryState::Failed(err) => EntryState::Failed(err.clone()),
        }
    }
}

enum Slot<T> {
    Idle,
    Loading { ticket: u64 },
    Ready(Arc<T>),
    Failed(AppError),
}

/// Cache entry for one content type.
pub struct CacheEntry<T> {
    slot: Slot<T>,
    requested_once: bool,
}

impl<T> Default for CacheEntry<T> {
    fn default() -> Self {
        Self {
            slot: Slot::Idle,
            requested_once: false,
        }
    }
}

impl<T> CacheEntry<T> {
    fn state(&self) -> EntryState<T> {
        match &self.slot {
            Slot::Idle => EntryState::Idle,
            Slot::Loading { .. } => EntryState::Loading,
            Slot::Ready(value) => EntryState::Ready(Arc::clone(value)),
            Slot::Failed(err) => EntryState::Failed(err.clone()),
        }
    }

    fn owned_by(&self, ticket: u64) -> bool {
        matches!(self.slot, Slot::Loading { ticket: t } if t == ticket)
    }
}

/// The typed entries held by a [`ContentStore`].
#[derive(Default)]
pub struct Entries {
    posts: CacheEntry<Vec<Post>>,
    taxonomies: CacheEntry<Vec<Taxonomy>>,
    footer: CacheEntry<Footer>,
    pages: CacheEntry<Vec<NavPage>>,
    level_descriptor: CacheEntry<LevelDescriptor>,
}

/// Binds a content type to its typed entry in the store.
pub trait ContentSlot: Send + Sync + 'static {
    type Value: Send + Sync + 'static;

    const TYPE: ContentType;

    #[doc(hidden)]
    fn entry(entries: &mut Entries) -> &mut CacheEntry<Self::Value>;

    /// Extract this slot's value from a decoded payload.
    fn from_payload(payload: ContentPayload) -> Result<Self::Value, AppError>;
}

macro_rules! content_slot {
    ($(#[$doc:meta])* $slot:ident, $value:ty, $field:ident, $variant:ident) => {
        $(#[$doc])*
        pub struct $slot;

        impl ContentSlot for $slot {
            type Value = $value;

            const TYPE: ContentType = ContentType::$variant;

            fn entry(entries: &mut Entries) -> &mut CacheEntry<Self::Value> {
                &mut entries.$field
            }

            fn from_payload(payload: ContentPayload) -> Result<Self::Value, AppError> {
                match payload {
                    ContentPayload::$variant(value) => Ok(value),
                    other => Err(AppError::Decode(format!(
                        "expected {} payload, got {}",
                        Self::TYPE,
                        other.content_type()
                    ))),
                }
            }
        }
    };
}

content_slot!(
    /// Latest posts.
    PostsSlot, Vec<Post>, posts, Posts
);
content_slot!(
    /// All taxonomies (categories, tags).
    TaxonomiesSlot, Vec<Taxonomy>, taxonomies, Taxonomies
);
content_slot!(FooterSlot, Footer, footer, Footer);
content_slot!(
    /// Navigation pages.
    PagesSlot, Vec<NavPage>, pages, Pages
);
content_slot!(LevelDescriptorSlot, LevelDescriptor, level_descriptor, LevelDescriptor);

/// Outcome of finishing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result was stored in the entry.
    Applied,
    /// The request was cancelled or no longer owned the entry.
    Discarded,
}

struct StoreInner {
    entries: Mutex<Entries>,
    next_ticket: AtomicU64,
}

/// Session-scoped cache of CMS content, one typed entry per content type.
///
/// Each entry is fetched at most once per session: [`ContentStore::start`]
/// only hands out a request when the entry is idle, and a ready entry is
/// never refetched automatically.
#[derive(Clone)]
pub struct ContentStore {
    inner: Arc<StoreInner>,
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                entries: Mutex::new(Entries::default()),
                next_ticket: AtomicU64::new(1),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state<K: ContentSlot>(&self) -> EntryState<K::Value> {
        K::entry(&mut self.lock()).state()
    }

    /// Whether a request for `K` was ever started in this session.
    pub fn requested_once<K: ContentSlot>(&self) -> bool {
        K::entry(&mut self.lock()).requested_once
    }

    /// Claim the entry for `K` (Idle → Loading).
    ///
    /// Returns `None` when a request is already in flight or the entry is
    /// ready or failed.
    pub fn start<K: ContentSlot>(&self) -> Option<RequestHandle<K>> {
        let mut entries = self.lock();
        let entry = K::entry(&mut entries);
        if !matches!(entry.slot, Slot::Idle) {
            return None;
        }

        let ticket = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);
        entry.slot = Slot::Loading { ticket };
        entry.requested_once = true;
        tracing::debug!(content_type = %K::TYPE, ticket, "content request started");

        Some(RequestHandle {
            store: self.clone(),
            ticket,
            cancelled: Arc::new(AtomicBool::new(false)),
            finished: false,
            _slot: PhantomData,
        })
    }

    /// Start a request for `K` unless one is running or done.
    ///
    /// `fetch` is only invoked when the returned future is polled. The
    /// canceller should be triggered when the requesting view goes away.
    pub fn begin_fetch<K, F, Fut>(
        &self,
        fetch: F,
    ) -> Option<(Canceller, impl Future<Output = Completion>)>
    where
        K: ContentSlot,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<K::Value, AppError>>,
    {
        let handle = self.start::<K>()?;
        let canceller = handle.canceller();
        let task = async move {
            let result = fetch().await;
            handle.finish(result)
        };
        Some((canceller, task))
    }

    /// Move a failed entry back to idle so the next hook can fetch again.
    pub fn reset<K: ContentSlot>(&self) -> bool {
        let mut entries = self.lock();
        let entry = K::entry(&mut entries);
        if matches!(entry.slot, Slot::Failed(_)) {
            entry.slot = Slot::Idle;
            tracing::debug!(content_type = %K::TYPE, "failed entry reset");
            true
        } else {
            false
        }
    }
}

fn release_claim<K: ContentSlot>(entries: &mut Entries, ticket: u64) -> bool {
    let entry = K::entry(entries);
    if entry.owned_by(ticket) {
        entry.slot = Slot::Idle;
        true
    } else {
        false
    }
}

/// Cancels an in-flight request when its view is torn down.
#[derive(Clone)]
pub struct Canceller {
    store: ContentStore,
    ticket: u64,
    cancelled: Arc<AtomicBool>,
    content_type: ContentType,
    release: fn(&mut Entries, u64) -> bool,
}

impl Canceller {
    /// Mark the request cancelled and give the entry back to idle.
    ///
    /// A result arriving later is discarded.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let released = (self.release)(&mut self.store.lock(), self.ticket);
        tracing::debug!(
            content_type = %self.content_type,
            ticket = self.ticket,
            released,
            "content request cancelled"
        );
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Capability for one in-flight content request.
///
/// Dropping an unfinished handle releases the entry.
pub struct RequestHandle<K: ContentSlot> {
    store: ContentStore,
    ticket: u64,
    cancelled: Arc<AtomicBool>,
    finished: bool,
    _slot: PhantomData<fn() -> K>,
}

impl<K: ContentSlot> RequestHandle<K> {
    pub fn canceller(&self) -> Canceller {
        Canceller {
            store: self.store.clone(),
            ticket: self.ticket,
            cancelled: Arc::clone(&self.cancelled),
            content_type: K::TYPE,
            release: release_claim::<K>,
        }
    }

    pub fn cancel(&self) {
        self.canceller().cancel();
    }

    /// Store the outcome unless the request was cancelled or superseded.
    pub fn finish(mut self, result: Result<K::Value, AppError>) -> Completion {
        self.finished = true;

        if self.cancelled.load(Ordering::Acquire) {
            tracing::debug!(content_type = %K::TYPE, ticket = self.ticket, "late result discarded");
            return Completion::Discarded;
        }

        let mut entries = self.store.lock();
        let entry = K::entry(&mut entries);
        if !entry.owned_by(self.ticket) {
            tracing::debug!(content_type = %K::TYPE, ticket = self.ticket, "stale result discarded");
            return Completion::Discarded;
        }

        entry.slot = match result {
            Ok(value) => Slot::Ready(Arc::new(value)),
            Err(err) => {
                tracing::warn!(content_type = %K::TYPE, "content request failed: {err}");
                Slot::Failed(err)
            }
        };
        Completion::Applied
    }
}

impl<K: ContentSlot> Drop for RequestHandle<K> {
    fn drop(&mut self) {
        if !self.finished {
            release_claim::<K>(&mut self.store.lock(), self.ticket);
        }
    }
}
