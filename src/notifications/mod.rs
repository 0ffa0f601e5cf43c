mod mail_client;
mod queue;

pub use mail_client::MailClient;
pub use queue::spawn;
pub use queue::NotificationQueue;
pub use queue::RegistrationSubmittedEvent;
