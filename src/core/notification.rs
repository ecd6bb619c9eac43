//! New-order email notifications.
//!
//! [`compose_order_email`] turns a stored order into an Italian plain-text and HTML
//! summary. Delivery goes through the [`Notifier`] trait; [`Mailer`] is the production
//! implementation, which either posts to the `SendGrid` v3 API or, without an API key,
//! only logs what would have been sent. Callers treat delivery as best-effort.

use crate::{
    config::settings::NotificationSettings,
    core::{
        money::{Money, Totals, VAT_RATE_PERCENT},
        order::OrderDetails,
    },
    entities::order,
    errors::{Error, Result},
};
use chrono::{Locale, NaiveDate, NaiveTime};
use serde_json::json;
use std::{fmt, future::Future};
use tracing::{debug, info, instrument};

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// A rendered notification email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEmail {
    /// Recipient address
    pub to: String,
    /// Sender address
    pub from: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub text: String,
    /// HTML body
    pub html: String,
}

/// Something that can deliver an [`OrderEmail`].
pub trait Notifier: Send + Sync {
    /// Delivers the email.
    fn send(&self, email: &OrderEmail) -> impl Future<Output = Result<()>> + Send;
}

/// Production notifier chosen from [`NotificationSettings`].
#[derive(Debug, Clone)]
pub enum Mailer {
    /// No API key configured: write the email to the log
    Log,
    /// Deliver through the `SendGrid` HTTP API
    SendGrid {
        /// HTTP client reused across sends
        client: reqwest::Client,
        /// Bearer token
        api_key: String,
    },
}

impl Mailer {
    /// Picks `SendGrid` when an API key is configured, logging otherwise.
    #[must_use]
    pub fn from_settings(settings: &NotificationSettings) -> Self {
        settings
            .sendgrid_api_key
            .as_ref()
            .map_or(Self::Log, |api_key| Self::SendGrid {
                client: reqwest::Client::new(),
                api_key: api_key.clone(),
            })
    }
}

impl Notifier for Mailer {
    #[instrument(skip_all, fields(to = %email.to, subject = %email.subject))]
    async fn send(&self, email: &OrderEmail) -> Result<()> {
        match self {
            Self::Log => {
                info!("SendGrid API key not configured. Email would be sent here.");
                debug!(body = %email.text, "Order email");
                Ok(())
            }
            Self::SendGrid { client, api_key } => {
                let payload = json!({
                    "personalizations": [{ "to": [{ "email": email.to }] }],
                    "from": { "email": email.from },
                    "subject": email.subject,
                    "content": [
                        { "type": "text/plain", "value": email.text },
                        { "type": "text/html", "value": email.html },
                    ],
                });

                let response = client
                    .post(SENDGRID_SEND_URL)
                    .bearer_auth(api_key)
                    .json(&payload)
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::Notification {
                        message: format!("SendGrid responded {status}: {body}"),
                    });
                }

                info!("Order email sent");
                Ok(())
            }
        }
    }
}

/// Long Italian date, e.g. `martedì 20 ottobre 2026`.
#[must_use]
pub fn format_delivery_date(date: NaiveDate) -> String {
    date.and_time(NaiveTime::default())
        .and_utc()
        .format_localized("%A %-d %B %Y", Locale::it_IT)
        .to_string()
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Renders the new-order email for a stored order.
#[must_use]
pub fn compose_order_email(details: &OrderDetails, settings: &NotificationSettings) -> OrderEmail {
    let summary = OrderSummary::new(details);

    OrderEmail {
        to: settings.to.clone(),
        from: settings.from.clone(),
        subject: format!("Nuovo ordine da {}", details.order.store_name),
        text: summary.to_string(),
        html: HtmlSummary(&summary).to_string(),
    }
}

/// The pieces both email bodies are rendered from.
struct OrderSummary<'a> {
    order: &'a order::Model,
    totals: Totals,
    delivery: String,
    lines: Vec<String>,
}

impl<'a> OrderSummary<'a> {
    fn new(details: &'a OrderDetails) -> Self {
        let lines = details
            .items
            .iter()
            .map(|(item, product)| {
                format!(
                    "{} - {} pcs x €{} = €{}",
                    product.name,
                    item.quantity,
                    Money::from_cents(item.unit_price_cents),
                    Money::from_cents(item.subtotal_cents),
                )
            })
            .collect();

        Self {
            order: &details.order,
            totals: details.totals(),
            delivery: format_delivery_date(details.order.delivery_date),
            lines,
        }
    }
}

/// Plain-text body.
impl fmt::Display for OrderSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = self.order;
        writeln!(f, "Dettagli Ordine #{}", order.id)?;
        writeln!(f)?;
        writeln!(f, "Negozio: {}", order.store_name)?;
        writeln!(f, "Data di consegna: {}", self.delivery)?;
        if let Some(customer) = &order.customer_name {
            writeln!(f, "Ordine effettuato da: {customer}")?;
        }
        writeln!(f)?;
        writeln!(f, "PRODOTTI ORDINATI:")?;
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        writeln!(f)?;
        writeln!(f, "Subtotale: €{}", self.totals.subtotal)?;
        writeln!(f, "IVA ({VAT_RATE_PERCENT}%): €{}", self.totals.vat)?;
        writeln!(f, "TOTALE: €{}", self.totals.total)?;
        writeln!(f)?;
        writeln!(f, "Stato dell'ordine: {}", order.status)
    }
}

/// HTML body, with every user-supplied string escaped.
struct HtmlSummary<'s, 'a>(&'s OrderSummary<'a>);

impl fmt::Display for HtmlSummary<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(summary) = self;
        let order = summary.order;
        let totals = &summary.totals;
        writeln!(f, "<h2>Dettagli Ordine #{}</h2>", order.id)?;
        writeln!(
            f,
            "<p><strong>Negozio:</strong> {}</p>",
            escape_html(&order.store_name)
        )?;
        writeln!(
            f,
            "<p><strong>Data di consegna:</strong> {}</p>",
            summary.delivery
        )?;
        if let Some(customer) = &order.customer_name {
            writeln!(
                f,
                "<p><strong>Ordine effettuato da:</strong> {}</p>",
                escape_html(customer)
            )?;
        }
        writeln!(f, "<h3>PRODOTTI ORDINATI:</h3>")?;
        writeln!(f, "<ul>")?;
        for line in &summary.lines {
            writeln!(f, "  <li>{}</li>", escape_html(line))?;
        }
        writeln!(f, "</ul>")?;
        writeln!(f, "<p><strong>Subtotale:</strong> €{}</p>", totals.subtotal)?;
        writeln!(
            f,
            "<p><strong>IVA ({VAT_RATE_PERCENT}%):</strong> €{}</p>",
            totals.vat
        )?;
        writeln!(f, "<p><strong>TOTALE:</strong> €{}</p>", totals.total)?;
        writeln!(
            f,
            "<p><strong>Stato dell'ordine:</strong> {}</p>",
            order.status
        )
    }
}
