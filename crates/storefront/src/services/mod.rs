//! External service clients and the notification dispatcher.

pub mod email;
pub mod notifier;
pub mod stripe;

pub use email::EmailService;
pub use notifier::{NotifyOutcome, OrderNotifier};
pub use stripe::StripeClient;
