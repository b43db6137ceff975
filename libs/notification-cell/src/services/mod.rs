pub mod mailer;
pub mod reminder;

pub use mailer::{Mailer, SmtpMailer};
pub use reminder::*;
