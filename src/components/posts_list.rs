use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::post_card::PostCardView;
use crate::models::listing::{
    page_from_click, ListContext, ListPhase, PagerUpdate, PaginationState, PostCard, PostsQuery,
    PostsResponse,
};

pub const POSTS_ENDPOINT: &str = "/api/posts.json";

#[cfg(feature = "hydrate")]
async fn fetch_posts_page(query: PostsQuery) -> Result<PostsResponse, String> {
    let response = gloo_net::http::Request::get(POSTS_ENDPOINT)
        .query(query.query_pairs())
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.ok() {
        return Err(format!("posts request failed with status {}", response.status()));
    }
    response.json::<PostsResponse>().await.map_err(|e| e.to_string())
}

#[cfg(not(feature = "hydrate"))]
async fn fetch_posts_page(_query: PostsQuery) -> Result<PostsResponse, String> {
    Err("posts are loaded in the browser".into())
}

/// Server-paginated list of posts.
///
/// `context` decides the filter; it is re-read (and the list restarts at the
/// first page) whenever it changes.
#[component]
pub fn PostsList(
    #[prop(into)] context: Signal<ListContext>,
    #[prop(default = crate::models::listing::DEFAULT_ITEMS_PER_PAGE)] items_per_page: u32,
) -> impl IntoView {
    let pagination = StoredValue::new(PaginationState::new(items_per_page));
    let current_context = StoredValue::new(ListContext::default());
    let request_seq = StoredValue::new(0u64);
    let phase = RwSignal::new(ListPhase::Idle);
    let cards = RwSignal::new(Vec::<PostCard>::new());
    let total_pages = RwSignal::new(0u32);

    let load_page = move |page: u32| {
        let mut query = None;
        pagination.update_value(|state| {
            query = Some(current_context.with_value(|ctx| state.request_page(page, ctx)));
        });
        let Some(query) = query else {
            return;
        };

        let mut seq = 0;
        request_seq.update_value(|s| {
            *s += 1;
            seq = *s;
        });

        cards.set(Vec::new());
        phase.set(ListPhase::Loading { page });
        tracing::debug!(page, start = query.start, rows = query.rows, "loading posts page");

        spawn_local(async move {
            let result = fetch_posts_page(query).await;
            if request_seq.try_get_value() != Some(seq) {
                return;
            }

            match result {
                Ok(response) => {
                    let mut rendered = None;
                    pagination.update_value(|state| rendered = Some(state.apply(response)));
                    if let Some((page_cards, update)) = rendered {
                        if let PagerUpdate::Initialize { total_pages: pages } = update {
                            total_pages.set(pages);
                        }
                        cards.set(page_cards);
                        phase.set(ListPhase::Rendered);
                    }
                }
                Err(e) => {
                    tracing::warn!("posts page failed: {e}");
                    phase.set(ListPhase::Failed(e));
                }
            }
        });
    };

    Effect::new(move |_| {
        let ctx = context.get();
        current_context.set_value(ctx);
        pagination.set_value(PaginationState::new(items_per_page));
        total_pages.set(0);
        load_page(0);
    });

    let pager = move || {
        let pages = total_pages.get();
        let visible = phase.with(|p| *p == ListPhase::Rendered)
            && pagination.with_value(|state| state.pager_visible());
        if !visible {
            return None;
        }

        let current = pagination.with_value(|state| state.current_page);
        Some(view! {
            <nav class="pagination">
                {(1..=pages).map(|n| {
                    let class = if page_from_click(n) == current { "page active" } else { "page" };
                    view! {
                        <button class=class on:click=move |_| load_page(page_from_click(n))>{n}</button>
                    }
                }).collect_view()}
            </nav>
        })
    };

    view! {
        <div class="posts-list">
            {move || match phase.get() {
                ListPhase::Idle | ListPhase::Loading { .. } => {
                    view! { <p class="loading">"Loading..."</p> }.into_any()
                }
                ListPhase::Failed(e) => {
                    view! { <p class="error">"Unable to load posts: " {e}</p> }.into_any()
                }
                ListPhase::Rendered => {
                    let page_cards = cards.get();
                    if page_cards.is_empty() {
                        view! { <p class="empty">"No posts found."</p> }.into_any()
                    } else {
                        page_cards
                            .into_iter()
                            .map(|card| view! { <PostCardView card=card/> })
                            .collect_view()
                            .into_any()
                    }
                }
            }}
            {pager}
        </div>
    }
}
