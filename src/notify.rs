//! Report delivery. Delivery failure never affects the sweep result.

pub mod slack;

pub use slack::SlackNotifier;

/// Best-effort report sink. Returns true iff the report was delivered.
pub trait Notifier {
    async fn notify(&self, text: &str) -> bool;
}
