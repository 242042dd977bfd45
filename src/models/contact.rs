use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How long a toast stays on screen.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

pub const SENT_MESSAGE: &str = "Message successfully sent!";
pub const SEND_FAILED_MESSAGE: &str = "There was an error sending the message";

/// Body of `POST /api/contactus.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl ContactMessage {
    pub fn is_blank(&self) -> bool {
        [&self.name, &self.phone, &self.email, &self.message]
            .iter()
            .all(|f| f.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Danger,
}

impl ToastKind {
    pub fn css_class(self) -> &'static str {
        match self {
            ToastKind::Success => "toast toast-success",
            ToastKind::Danger => "toast toast-danger",
        }
    }
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub text: String,
}

/// State of the contact form between submissions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactForm {
    pub fields: ContactMessage,
    pub submitting: bool,
}

impl ContactForm {
    /// Snapshot the fields for sending. Returns `None` while a send is running.
    pub fn begin_submit(&mut self) -> Option<ContactMessage> {
        if self.submitting {
            return None;
        }
        self.submitting = true;
        Some(self.fields.clone())
    }

    /// Apply the outcome of a send: fields are cleared only on success.
    pub fn complete<E>(&mut self, outcome: Result<(), E>) -> Toast {
        self.submitting = false;
        match outcome {
            Ok(()) => {
                self.fields = ContactMessage::default();
                Toast {
                    kind: ToastKind::Success,
                    text: SENT_MESSAGE.to_string(),
                }
            }
            Err(_) => Toast {
                kind: ToastKind::Danger,
                text: SEND_FAILED_MESSAGE.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ContactForm {
        ContactForm {
            fields: ContactMessage {
                name: "Ada".into(),
                phone: "555".into(),
                email: "ada@example.com".into(),
                message: "Hello".into(),
            },
            submitting: false,
        }
    }

    #[test]
    fn test_success_clears_fields() {
        let mut form = filled();
        let sent = form.begin_submit().unwrap();
        assert_eq!(sent.name, "Ada");

        let toast = form.complete(Ok::<(), String>(()));
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.text, SENT_MESSAGE);
        assert!(form.fields.is_blank());
        assert!(!form.submitting);
    }

    #[test]
    fn test_failure_keeps_fields() {
        let mut form = filled();
        form.begin_submit();

        let toast = form.complete(Err("503"));
        assert_eq!(toast.kind, ToastKind::Danger);
        assert_eq!(form.fields.email, "ada@example.com");
    }

    #[test]
    fn test_no_double_submit() {
        let mut form = filled();
        assert!(form.begin_submit().is_some());
        assert!(form.begin_submit().is_none());
    }
}
