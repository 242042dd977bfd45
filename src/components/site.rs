use leptos::prelude::*;

use crate::components::search_bar::SearchBar;
use crate::content::hooks::{use_content_context, use_footer, use_level_descriptor, use_navigation};
use crate::content::store::{EntryState, FooterSlot};

#[component]
pub fn SiteHeader() -> impl IntoView {
    let pages = use_navigation();
    let level = use_level_descriptor();

    let title = move || {
        level
            .get()
            .value()
            .map(|l| l.site_title.clone())
            .unwrap_or_default()
    };

    view! {
        <header class="top-nav">
            <a class="logo" href="/">{title}</a>
            <nav>
                <ul>
                    {move || pages.get().value().map(|pages| {
                        pages.iter().map(|page| view! {
                            <li><a href=page.url.clone()>{page.label.clone()}</a></li>
                        }).collect_view()
                    })}
                </ul>
            </nav>
            <SearchBar/>
        </header>
    }
}

#[component]
pub fn SiteFooter() -> impl IntoView {
    let footer = use_footer();
    let ctx = use_content_context();

    view! {
        <footer class="site-footer">
            {move || match footer.get() {
                EntryState::Ready(content) => {
                    view! {
                        <p class="about">{content.about.clone()}</p>
                        <ul class="social">
                            {content.social_links.iter().map(|link| view! {
                                <li><a href=link.url.clone() class=format!("social-{}", link.network)>{link.network.clone()}</a></li>
                            }).collect_view()}
                        </ul>
                        <ul class="quick-links">
                            {content.quick_links.iter().map(|link| view! {
                                <li><a href=link.url.clone()>{link.label.clone()}</a></li>
                            }).collect_view()}
                        </ul>
                    }
                    .into_any()
                }
                EntryState::Failed(_) => {
                    let ctx = ctx.clone();
                    view! {
                        <button class="retry" on:click=move |_| { ctx.retry::<FooterSlot>() }>"Retry"</button>
                    }
                    .into_any()
                }
                _ => ().into_any(),
            }}
        </footer>
    }
}
