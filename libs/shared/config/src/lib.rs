use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub smtp_email: String,
    pub smtp_password: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub patient_db_path: String,
    pub doctor_schedule_path: String,
    pub intake_form_path: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            smtp_email: env::var("EMAIL")
                .unwrap_or_else(|_| {
                    warn!("EMAIL not set, using empty value");
                    String::new()
                }),
            smtp_password: env::var("PASS")
                .unwrap_or_else(|_| {
                    warn!("PASS not set, using empty value");
                    String::new()
                }),
            smtp_host: env::var("SMTP_HOST")
                .unwrap_or_else(|_| {
                    warn!("SMTP_HOST not set, using default");
                    "smtp.gmail.com".to_string()
                }),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| {
                    warn!("SMTP_PORT not set, using default");
                    587
                }),
            patient_db_path: env::var("PATIENT_DB_PATH")
                .unwrap_or_else(|_| {
                    warn!("PATIENT_DB_PATH not set, using default");
                    "patient_database.csv".to_string()
                }),
            doctor_schedule_path: env::var("DOCTOR_SCHEDULE_PATH")
                .unwrap_or_else(|_| {
                    warn!("DOCTOR_SCHEDULE_PATH not set, using default");
                    "doctor_schedule.csv".to_string()
                }),
            intake_form_path: env::var("INTAKE_FORM_PATH")
                .unwrap_or_else(|_| {
                    warn!("INTAKE_FORM_PATH not set, using default");
                    "patient_intake_form.pdf".to_string()
                }),
        };

        if !config.is_mail_configured() {
            warn!("Mail relay not fully configured - confirmation emails will be reported as warnings");
        }

        config
    }

    pub fn is_mail_configured(&self) -> bool {
        !self.smtp_email.is_empty() && !self.smtp_password.is_empty()
    }
}
