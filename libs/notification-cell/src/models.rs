use std::path::{Path, PathBuf};

/// One outbound message for the mail relay. The attachment, when
/// present, is sent as application/pdf (the intake form).
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<PathBuf>,
}

impl EmailMessage {
    /// The booking confirmation sent at the wizard's confirm step.
    pub fn confirmation(to: &str, intake_form: &Path) -> Self {
        Self {
            to: to.to_string(),
            subject: "Your Appointment Confirmation".to_string(),
            body: "Thank you for booking. Please fill the attached intake form and bring it to your appointment."
                .to_string(),
            attachment: Some(intake_form.to_path_buf()),
        }
    }
}
