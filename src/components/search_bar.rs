use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::components::post_card::PostCardView;
use crate::models::listing::PostCard;
use crate::search::resource::{use_search_query, use_url_search_resource, ResourceState};

/// Path of the search page for `q`.
pub fn search_href(q: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(q.trim().as_bytes()).collect();
    format!("/search?q={encoded}")
}

#[component]
pub fn SearchBar() -> impl IntoView {
    let query = use_search_query();
    let navigate = use_navigate();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        navigate(&search_href(&query.get_untracked()), Default::default());
    };

    view! {
        <form class="search-container" role="search" on:submit=on_submit>
            <input
                type="search"
                name="q"
                placeholder="Search posts..."
                on:input=move |ev| query.set(event_target_value(&ev))
                prop:value=query
            />
        </form>
    }
}

/// Results of the search named by the URL `q` parameter.
#[component]
pub fn SearchResults() -> impl IntoView {
    let results = use_url_search_resource();

    view! {
        <div class="search-results">
            <Suspense fallback=|| view! { <p>"Searching..."</p> }>
                {move || match ResourceState::from_snapshot(results.get()) {
                    ResourceState::Pending => None,
                    ResourceState::Ready(found) if found.hits.is_empty() => {
                        Some(view! { <p>"No results found."</p> }.into_any())
                    }
                    ResourceState::Ready(found) => {
                        let total = found.total;
                        Some(view! {
                            <p class="search-total">{format!("{total} results")}</p>
                            {found.hits.iter()
                                .filter_map(|item| item.as_post())
                                .map(|post| view! { <PostCardView card=PostCard::from(post)/> })
                                .collect_view()}
                        }.into_any())
                    }
                    ResourceState::Failed(e) => {
                        Some(view! { <p class="error">"Search Error: " {e}</p> }.into_any())
                    }
                }}
            </Suspense>
        </div>
    }
}
