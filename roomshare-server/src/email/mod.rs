//! Email sending abstractions

pub mod console;

pub use console::ConsoleEmailSender;

/// Trait for sending account verification emails
pub trait EmailSender: Send + Sync {
    /// Send a verification code to an email address
    fn send_verification(&self, email: &str, code: &str) -> Result<(), String>;
}

/// Allow using Box<dyn EmailSender> as an EmailSender
impl EmailSender for Box<dyn EmailSender> {
    fn send_verification(&self, email: &str, code: &str) -> Result<(), String> {
        (**self).send_verification(email, code)
    }
}
