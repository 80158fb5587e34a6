//! Email message types and per-contact composition.

use serde::{Deserialize, Serialize};

use crate::contacts::Contact;

use super::template::Template;
use super::MailError;

/// The body content of an email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmailBody {
    /// Plain text only.
    Text(String),
    /// HTML only.
    Html(String),
    /// Both plain text and HTML (multipart/alternative).
    Multipart { text: String, html: String },
}

impl EmailBody {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::Multipart { text, .. } => Some(text),
            Self::Html(_) => None,
        }
    }

    pub fn html(&self) -> Option<&str> {
        match self {
            Self::Html(html) | Self::Multipart { html, .. } => Some(html),
            Self::Text(_) => None,
        }
    }
}

/// A composed message addressed to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: EmailBody,
}

#[derive(Debug, Clone)]
enum ContentBody {
    Text(Template),
    Html(Template),
    Both { text: Template, html: Template },
}

/// Subject plus body templates shared by every message in a run.
///
/// At least one of the text and html templates is required.
#[derive(Debug, Clone)]
pub struct MessageContent {
    subject: String,
    body: ContentBody,
}

impl MessageContent {
    pub fn new(
        subject: impl Into<String>,
        html: Option<Template>,
        text: Option<Template>,
    ) -> Result<Self, MailError> {
        let body = match (text, html) {
            (Some(text), Some(html)) => ContentBody::Both { text, html },
            (Some(text), None) => ContentBody::Text(text),
            (None, Some(html)) => ContentBody::Html(html),
            (None, None) => return Err(MailError::EmptyBody),
        };

        Ok(Self {
            subject: subject.into(),
            body,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Renders [`MessageContent`] for one contact and appends the unsubscribe
/// notice to each body part.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    from: String,
    unsubscribe_url: String,
}

impl MessageBuilder {
    pub fn new(from: impl Into<String>, unsubscribe_url: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            unsubscribe_url: unsubscribe_url.into(),
        }
    }

    pub fn build(&self, contact: &Contact, content: &MessageContent) -> Email {
        let fields = contact.fields();
        let text = |template: &Template| template.render(&fields) + &self.text_notice();
        let html = |template: &Template| template.render(&fields) + &self.html_notice();

        let body = match &content.body {
            ContentBody::Text(t) => EmailBody::Text(text(t)),
            ContentBody::Html(h) => EmailBody::Html(html(h)),
            ContentBody::Both { text: t, html: h } => EmailBody::Multipart {
                text: text(t),
                html: html(h),
            },
        };

        Email {
            from: self.from.clone(),
            to: contact.email.clone(),
            subject: content.subject.clone(),
            body,
        }
    }

    fn text_notice(&self) -> String {
        format!(
            "\n\nIf you no longer wish to receive these emails, please visit {}.",
            self.unsubscribe_url
        )
    }

    fn html_notice(&self) -> String {
        format!(
            "<br><br><p>If you no longer wish to receive these emails, \
             <a href=\"{}\">unsubscribe here</a>.</p>",
            self.unsubscribe_url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> MessageBuilder {
        MessageBuilder::new("news@example.com", "https://example.com/unsubscribe")
    }

    #[test]
    fn text_only_message_gets_text_notice() {
        let content =
            MessageContent::new("Monthly", None, Some(Template::new("Hello {name},"))).unwrap();
        let email = builder().build(&Contact::new("Ada", "ada@example.com"), &content);

        assert_eq!(email.from, "news@example.com");
        assert_eq!(email.to, "ada@example.com");
        assert_eq!(email.subject, "Monthly");
        assert_eq!(
            email.body,
            EmailBody::Text(
                "Hello Ada,\n\nIf you no longer wish to receive these emails, \
                 please visit https://example.com/unsubscribe."
                    .into()
            )
        );
    }

    #[test]
    fn multipart_message_gets_both_notices() {
        let content = MessageContent::new(
            "Monthly",
            Some(Template::new("<p>Hello {name}</p>")),
            Some(Template::new("Hello {name}")),
        )
        .unwrap();
        let email = builder().build(&Contact::new("Bob", "bob@example.com"), &content);

        let text = email.body.text().unwrap();
        let html = email.body.html().unwrap();
        assert!(text.starts_with("Hello Bob\n\nIf you no longer wish"));
        assert!(html.starts_with("<p>Hello Bob</p><br><br><p>If you no longer wish"));
        assert!(html.ends_with("<a href=\"https://example.com/unsubscribe\">unsubscribe here</a>.</p>"));
    }

    #[test]
    fn html_only_message_has_no_text_part() {
        let content =
            MessageContent::new("Monthly", Some(Template::new("<p>{name}</p>")), None).unwrap();
        let email = builder().build(&Contact::new("Cy", "cy@example.com"), &content);

        assert!(email.body.text().is_none());
        assert!(email.body.html().is_some());
    }

    #[test]
    fn content_without_any_body_is_rejected() {
        assert!(matches!(
            MessageContent::new("Monthly", None, None),
            Err(MailError::EmptyBody)
        ));
    }
}
