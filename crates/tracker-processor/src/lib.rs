pub mod dispatchers;
mod message;
mod outbox;
mod scanner;

pub use dispatchers::{LogDispatcher, NotificationDispatcher, TelegramDispatcher, TelegramNotifier};
pub use message::MessageTemplate;
pub use outbox::{DeliveryReport, NotificationOutbox, RetryPolicy};
pub use scanner::RewardScanner;
