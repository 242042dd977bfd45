use leptos::prelude::*;

use crate::models::listing::PostCard;

#[component]
pub fn PostCardView(card: PostCard) -> impl IntoView {
    let PostCard {
        url,
        headline,
        main_image,
        author_name,
        author_image,
        last_modified_date,
        categories,
    } = card;

    view! {
        <article class="blog-entry">
            {main_image.map(|src| view! {
                <a href=url.clone() class="blog-entry-image">
                    <img src=src alt=headline.clone()/>
                </a>
            })}
            <div class="blog-entry-text">
                <div class="blog-entry-categories">
                    {categories.into_iter().map(|c| view! {
                        <a class="category" href=format!("/category/{}", c.key)>{c.value}</a>
                    }).collect_view()}
                </div>
                <h2><a href=url>{headline}</a></h2>
                <div class="blog-entry-meta">
                    {author_image.map(|src| view! { <img class="author-pic" src=src alt=author_name.clone()/> })}
                    <span class="author">{author_name}</span>
                    <span class="date">{last_modified_date}</span>
                </div>
            </div>
        </article>
    }
}
