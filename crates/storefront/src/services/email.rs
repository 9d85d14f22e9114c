//! Email service for order notifications.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. Two
//! messages exist per order: the customer confirmation and the owner
//! alert. Each send is an isolated, single-attempt call; callers log
//! failures and move on.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use thiserror::Error;

use czarcar_core::order::{OrderEmailData, OrderItem, ShippingAddress};

use crate::config::EmailConfig;
use crate::services::notifier::OrderMailer;

/// Tax rate baked into displayed totals (order totals are tax-inclusive).
const TAX_DIVISOR: &str = "1.08";

/// A line item prepared for template rendering.
struct EmailLineItem {
    name: String,
    options: Option<String>,
    quantity: u32,
    price: String,
    total: String,
}

/// Totals block shared by both templates.
struct EmailTotals {
    subtotal: String,
    tax: String,
    total: String,
}

/// HTML template for the customer order confirmation.
#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    customer_name: &'a str,
    order_number: &'a str,
    order_date: String,
    payment_intent_id: &'a str,
    items: &'a [EmailLineItem],
    totals: &'a EmailTotals,
    address: &'a ShippingAddress,
}

/// Plain text template for the customer order confirmation.
#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    customer_name: &'a str,
    order_number: &'a str,
    order_date: String,
    items: &'a [EmailLineItem],
    totals: &'a EmailTotals,
    address: &'a ShippingAddress,
}

/// HTML template for the owner order alert.
#[derive(Template)]
#[template(path = "email/owner_alert.html")]
struct OwnerAlertHtml<'a> {
    customer_name: &'a str,
    customer_email: &'a str,
    order_number: &'a str,
    order_date: String,
    payment_intent_id: &'a str,
    items: &'a [EmailLineItem],
    total: String,
    address: &'a ShippingAddress,
}

/// Plain text template for the owner order alert.
#[derive(Template)]
#[template(path = "email/owner_alert.txt")]
struct OwnerAlertText<'a> {
    customer_name: &'a str,
    customer_email: &'a str,
    order_number: &'a str,
    payment_intent_id: &'a str,
    items: &'a [EmailLineItem],
    total: String,
    address: &'a ShippingAddress,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional order emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    owner_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP transport cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            owner_address: config.owner_address.clone(),
        })
    }

    /// Send the customer order confirmation.
    ///
    /// # Errors
    ///
    /// Returns error if the template fails to render or the send fails.
    pub async fn send_order_confirmation(&self, order: &OrderEmailData) -> Result<(), EmailError> {
        let items = line_items(&order.order_items);
        let totals = totals(order.order_total);
        let order_date = today();

        let html = OrderConfirmationHtml {
            customer_name: &order.customer_name,
            order_number: &order.order_number,
            order_date: order_date.clone(),
            payment_intent_id: &order.payment_intent_id,
            items: &items,
            totals: &totals,
            address: &order.shipping_address,
        }
        .render()?;
        let text = OrderConfirmationText {
            customer_name: &order.customer_name,
            order_number: &order.order_number,
            order_date,
            items: &items,
            totals: &totals,
            address: &order.shipping_address,
        }
        .render()?;

        self.send_multipart_email(
            &order.customer_email,
            &format!("Order Confirmation - {}", order.order_number),
            &text,
            &html,
        )
        .await
    }

    /// Send the owner alert for a new order.
    ///
    /// # Errors
    ///
    /// Returns error if the template fails to render or the send fails.
    pub async fn send_owner_alert(&self, order: &OrderEmailData) -> Result<(), EmailError> {
        let items = line_items(&order.order_items);
        let total = money(order.order_total);

        let html = OwnerAlertHtml {
            customer_name: &order.customer_name,
            customer_email: &order.customer_email,
            order_number: &order.order_number,
            order_date: today(),
            payment_intent_id: &order.payment_intent_id,
            items: &items,
            total: total.clone(),
            address: &order.shipping_address,
        }
        .render()?;
        let text = OwnerAlertText {
            customer_name: &order.customer_name,
            customer_email: &order.customer_email,
            order_number: &order.order_number,
            payment_intent_id: &order.payment_intent_id,
            items: &items,
            total: total.clone(),
            address: &order.shipping_address,
        }
        .render()?;

        let subject = format!("New Order {} - {} - Ship Now", order.order_number, total);
        self.send_multipart_email(&self.owner_address, &subject, &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

impl OrderMailer for EmailService {
    async fn send_order_confirmation(&self, order: &OrderEmailData) -> Result<(), EmailError> {
        Self::send_order_confirmation(self, order).await
    }

    async fn send_owner_alert(&self, order: &OrderEmailData) -> Result<(), EmailError> {
        Self::send_owner_alert(self, order).await
    }
}

/// Format a decimal amount as a dollar string.
fn money(amount: Decimal) -> String {
    format!("${amount:.2}")
}

/// Today's date for display in email bodies.
fn today() -> String {
    chrono::Utc::now().format("%B %-d, %Y").to_string()
}

/// Prepare order items for template rendering.
fn line_items(items: &[OrderItem]) -> Vec<EmailLineItem> {
    items
        .iter()
        .map(|item| EmailLineItem {
            name: item.name.clone(),
            options: item.options.clone(),
            quantity: item.quantity,
            price: money(item.price),
            total: money(item.total),
        })
        .collect()
}

/// Break a tax-inclusive order total into subtotal and tax for display.
fn totals(order_total: Decimal) -> EmailTotals {
    let divisor: Decimal = TAX_DIVISOR.parse().unwrap_or(Decimal::ONE);
    let subtotal = (order_total / divisor).round_dp(2);
    let tax = order_total - subtotal;

    EmailTotals {
        subtotal: money(subtotal),
        tax: money(tax),
        total: money(order_total),
    }
}
