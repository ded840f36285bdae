//! Outgoing email
//!
//! Pickup requests go to the shop's inbox; newsletter sign-ups get a short
//! confirmation. Both are plain HTML with the submitter's details escaped.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;
use tracing::warn;

use crate::error::{ServerError, ServerResult};

pub mod resend;

pub use resend::ResendMailer;

/// Subject of the pickup request email
pub const PICKUP_REQUEST_SUBJECT: &str = "Let us pickup your e-waste!";

/// Subject of the newsletter confirmation
pub const NEWSLETTER_SUBJECT: &str = "You're on the e-waste pickup list";

/// A message ready for the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    /// Sender, `name <address>` or a bare address
    pub from: String,
    /// Recipients
    pub to: Vec<String>,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
    /// Where replies go
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

/// Interface for sending email
#[async_trait]
pub trait EmailSender: Send + Sync + Debug {
    /// Send one message and return the provider's message id
    async fn send(&self, email: &OutgoingEmail) -> ServerResult<String>;
}

/// Sender used when no provider key is configured. Every send fails.
#[derive(Debug, Clone, Default)]
pub struct DisabledMailer;

#[async_trait]
impl EmailSender for DisabledMailer {
    async fn send(&self, email: &OutgoingEmail) -> ServerResult<String> {
        warn!(subject = %email.subject, "Dropping email, no provider configured");
        Err(ServerError::EmailDeliveryError(
            "Email delivery is not configured".to_string(),
        ))
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Pickup request sent to the shop, replying to the submitter
pub fn pickup_request_email(from: &str, to: &str, email: &str, phone: &str) -> OutgoingEmail {
    let html = format!(
        "<p>Hello,</p>\
         <p>A new e-waste pickup request has come in.</p>\
         <p>Email: <strong>{email}</strong><br/>Phone: <strong>{phone}</strong></p>\
         <p>Reply to this email to arrange a pickup at a time that suits them.</p>",
        email = escape_html(email),
        phone = escape_html(phone),
    );

    OutgoingEmail {
        from: from.to_string(),
        to: vec![to.to_string()],
        subject: PICKUP_REQUEST_SUBJECT.to_string(),
        html,
        reply_to: Some(email.to_string()),
    }
}

/// Confirmation sent to a new subscriber
pub fn newsletter_confirmation_email(from: &str, reply_to: &str, subscriber: &str) -> OutgoingEmail {
    let html = format!(
        "<p>Hello,</p>\
         <p>Thanks for signing up. We will send news and pickup dates to <strong>{subscriber}</strong>.</p>\
         <p>Stay on the lookout for an email from us (<strong>{shop}</strong>).</p>",
        subscriber = escape_html(subscriber),
        shop = escape_html(reply_to),
    );

    OutgoingEmail {
        from: from.to_string(),
        to: vec![subscriber.to_string()],
        subject: NEWSLETTER_SUBJECT.to_string(),
        html,
        reply_to: Some(reply_to.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pickup_request_escapes_submitter_details() {
        let email = pickup_request_email(
            "admin <admin@e-waste-pickup.ca>",
            "admin@e-waste-pickup.ca",
            "jane@example.ca",
            "<script>613</script>",
        );

        assert_eq!(email.subject, PICKUP_REQUEST_SUBJECT);
        assert_eq!(email.reply_to.as_deref(), Some("jane@example.ca"));
        assert!(email.html.contains("&lt;script&gt;613&lt;/script&gt;"));
        assert!(!email.html.contains("<script>"));
    }

    #[test]
    fn test_newsletter_goes_to_subscriber() {
        let email = newsletter_confirmation_email("shop@x.ca", "shop@x.ca", "reader@example.com");
        assert_eq!(email.to, vec!["reader@example.com".to_string()]);
        assert!(email.html.contains("reader@example.com"));
    }

    #[test]
    fn test_wire_shape_omits_missing_reply_to() {
        let email = OutgoingEmail {
            from: "a@x.ca".to_string(),
            to: vec!["b@x.ca".to_string()],
            subject: "Hi".to_string(),
            html: "<p>Hi</p>".to_string(),
            reply_to: None,
        };
        assert_eq!(
            serde_json::to_value(&email).unwrap(),
            json!({"from": "a@x.ca", "to": ["b@x.ca"], "subject": "Hi", "html": "<p>Hi</p>"})
        );
    }

    #[tokio::test]
    async fn test_disabled_mailer_fails() {
        let email = newsletter_confirmation_email("a@x.ca", "a@x.ca", "b@x.ca");
        let err = DisabledMailer.send(&email).await.unwrap_err();
        assert!(matches!(err, ServerError::EmailDeliveryError(_)));
    }
}
