use leptos::prelude::*;

use crate::content::hooks::{use_categories, use_tags};
use crate::content::store::EntryState;
use crate::models::content::TaxonomyEntry;

/// Background shown when a taxonomy entry has no image.
pub const DEFAULT_CATEGORY_IMAGE: &str = "/static-assets/images/photography.png";

/// Link target of a category or tag card.
pub fn taxonomy_link(entry: &TaxonomyEntry, is_tag: bool) -> String {
    let section = if is_tag { "tag" } else { "category" };
    format!("/{section}/{}", entry.key)
}

#[component]
pub fn CategoryCard(entry: TaxonomyEntry, #[prop(optional)] is_tag: bool) -> impl IntoView {
    let href = taxonomy_link(&entry, is_tag);
    let background = entry
        .image
        .clone()
        .unwrap_or_else(|| DEFAULT_CATEGORY_IMAGE.to_string());

    view! {
        <a href=href class="blog-entry category-card">
            <img class="background" src=background alt=entry.value.clone()/>
            <h2 class="title">{entry.value}</h2>
        </a>
    }
}

/// Grid of all categories, or all tags.
#[component]
pub fn TaxonomyGrid(#[prop(optional)] tags: bool) -> impl IntoView {
    let entries = if tags { use_tags() } else { use_categories() };

    view! {
        <section class="category-grid">
            {move || match entries.get() {
                EntryState::Ready(list) => list
                    .iter()
                    .cloned()
                    .map(|entry| view! { <CategoryCard entry=entry is_tag=tags/> })
                    .collect_view()
                    .into_any(),
                EntryState::Failed(e) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
                _ => view! { <p class="loading">"Loading..."</p> }.into_any(),
            }}
        </section>
    }
}
