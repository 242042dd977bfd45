use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::models::contact::{Toast, TOAST_DURATION};
use crate::platform::sleep;

/// Toasts currently on screen.
#[derive(Clone, Copy)]
pub struct Toasts {
    shown: RwSignal<Vec<(u64, Toast)>>,
    next_id: StoredValue<u64>,
}

impl Toasts {
    pub fn new() -> Self {
        Self {
            shown: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
        }
    }

    /// Show `toast` and remove it again after [`TOAST_DURATION`].
    pub fn show(&self, toast: Toast) {
        spawn_local(self.push(toast));
    }

    /// Add `toast` and return the timer that dismisses it.
    fn push(&self, toast: Toast) -> impl std::future::Future<Output = ()> + 'static {
        let mut id = 0;
        self.next_id.update_value(|next| {
            id = *next;
            *next += 1;
        });
        self.shown.update(|shown| shown.push((id, toast)));

        let shown = self.shown;
        async move {
            sleep(TOAST_DURATION).await;
            shown.update(|shown| shown.retain(|(toast_id, _)| *toast_id != id));
        }
    }

    /// Toasts on screen, oldest first.
    pub fn visible(&self) -> Vec<Toast> {
        self.shown.get().into_iter().map(|(_, toast)| toast).collect()
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new()
    }
}

pub fn provide_toasts() -> Toasts {
    let toasts = Toasts::new();
    provide_context(toasts);
    toasts
}

pub fn use_toasts() -> Toasts {
    expect_context::<Toasts>()
}

#[component]
pub fn ToastHost() -> impl IntoView {
    let toasts = use_toasts();

    view! {
        <div class="toast-container">
            {move || toasts.visible().into_iter().map(|toast| view! {
                <div class=toast.kind.css_class() role="alert">{toast.text}</div>
            }).collect_view()}
        </div>
    }
}
