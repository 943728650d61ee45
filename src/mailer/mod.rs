pub mod client;
pub mod error;
pub mod types;

pub use client::{HttpMailer, Messenger};
pub use error::MailerError;
pub use types::{OutboundMail, SendReceipt};
