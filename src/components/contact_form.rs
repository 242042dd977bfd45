use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::toast::use_toasts;
use crate::models::contact::{ContactForm, ContactMessage};

pub const CONTACT_ENDPOINT: &str = "/api/contactus.json";

#[cfg(feature = "hydrate")]
async fn send_message(message: ContactMessage) -> Result<(), String> {
    let response = gloo_net::http::Request::post(CONTACT_ENDPOINT)
        .json(&message)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.ok() {
        Ok(())
    } else {
        Err(format!("contact request failed with status {}", response.status()))
    }
}

#[cfg(not(feature = "hydrate"))]
async fn send_message(_message: ContactMessage) -> Result<(), String> {
    Err("messages are sent from the browser".into())
}

#[component]
pub fn ContactFormView() -> impl IntoView {
    let form = RwSignal::new(ContactForm::default());
    let toasts = use_toasts();

    let field = move |get: fn(&ContactMessage) -> String| move || form.with(|f| get(&f.fields));
    let set_field = move |set: fn(&mut ContactMessage, String)| {
        move |ev: leptos::ev::Event| {
            let value = event_target_value(&ev);
            form.update(|f| set(&mut f.fields, value));
        }
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let Some(message) = form.try_update(|f| f.begin_submit()).flatten() else {
            return;
        };

        spawn_local(async move {
            let outcome = send_message(message).await;
            if let Err(e) = &outcome {
                tracing::warn!("contact form not sent: {e}");
            }
            if let Some(toast) = form.try_update(|f| f.complete(outcome)) {
                toasts.show(toast);
            }
        });
    };

    view! {
        <form id="contactForm" class="contact-form" on:submit=on_submit>
            <input
                type="text"
                name="name"
                placeholder="Name"
                prop:value=field(|m| m.name.clone())
                on:input=set_field(|m, v| m.name = v)
            />
            <input
                type="tel"
                name="phone"
                placeholder="Phone"
                prop:value=field(|m| m.phone.clone())
                on:input=set_field(|m, v| m.phone = v)
            />
            <input
                type="email"
                name="email"
                placeholder="Email"
                prop:value=field(|m| m.email.clone())
                on:input=set_field(|m, v| m.email = v)
            />
            <textarea
                name="message"
                placeholder="Message"
                prop:value=field(|m| m.message.clone())
                on:input=set_field(|m, v| m.message = v)
            ></textarea>
            <input
                type="submit"
                value="Send Message"
                prop:disabled=move || form.with(|f| f.submitting)
            />
        </form>
    }
}
