use tracing::info;

pub const FORM_REMINDER: &str = "Reminder: Please fill your intake form.";
pub const FORM_QUESTION: &str = "Did you fill the form?";
pub const ATTENDANCE_QUESTION: &str = "Will you attend the appointment?";
pub const ATTENDANCE_THANKS: &str = "Thank you! See you at your appointment.";

/// Reminders are delivered in-app; the log line is the delivery record.
pub fn send_reminder(to_email: &str, message: &str) {
    info!("Reminder sent to {}: {}", to_email, message);
}

pub fn cancellation_logged(reason: &str) -> String {
    format!("Cancellation reason logged: {}", reason)
}
