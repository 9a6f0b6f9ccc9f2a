//! Outbound mail for the public forms.

use anyhow::Context;
use askama::Template;
use mailgun_v3::email::{self, Message, MessageBody};
use mailgun_v3::{Credentials, EmailAddress};

use crate::config::Settings;

pub mod forms;

pub const SENDER_NAME: &str = "Sahyog Foundation Website";

/// A renderable message headed for the foundation inbox.
pub trait Email: Template {
    fn subject(&self) -> String;
}

pub struct Mailer {
    credentials: Credentials,
    sender: EmailAddress,
    recipient: EmailAddress,
}

impl Mailer {
    /// Builds the mailer when the mail environment is fully configured,
    /// otherwise logs why outbound mail is disabled.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        let (token, domain, contact) = match (
            &settings.mailgun_token,
            &settings.mailgun_domain,
            &settings.contact_email,
        ) {
            (Some(token), Some(domain), Some(contact)) => (token, domain, contact),
            _ => {
                tracing::warn!(
                    "`MAILGUN_TOKEN`, `MAILGUN_DOMAIN` and `CONTACT_EMAIL` are not all set, \
                     form submissions will not be delivered"
                );
                return None;
            }
        };

        let sender_address = format!("website@{domain}");
        let sender = EmailAddress::name_address(SENDER_NAME.to_owned(), sender_address.parse().ok()?);
        let recipient =
            EmailAddress::name_address("Sahyog Foundation".to_owned(), contact.parse().ok()?);

        Some(Self {
            credentials: Credentials::new(token, domain),
            sender,
            recipient,
        })
    }

    pub async fn send(&self, mail: impl Email) -> anyhow::Result<()> {
        let message = Message {
            to: vec![self.recipient.clone()],
            subject: mail.subject(),
            body: MessageBody::Html(mail.render().context("Failed to render email")?),
            ..Default::default()
        };

        email::async_impl::send_email(&self.credentials, &self.sender, message)
            .await
            .map(|_| ())
            .map_err(|err| anyhow::anyhow!("Failed to send email: {err}"))
    }
}
