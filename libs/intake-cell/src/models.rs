use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use patient_cell::models::{PatientRecord, PatientStatus};

/// The agent's greeting once the patient says hello.
pub const GREETING: &str = "Hello! How can I assist you with your medical appointment today?";
pub const GREETING_RETRY: &str = "Please type 'hello' to begin.";
pub const GREETING_PROMPT: &str = "Say hello to start...";

/// The wizard's position, strictly forward. Each response carries the
/// step so the client always knows where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Greet,
    Intake,
    Schedule,
    Insurance,
    Confirm,
    Remind,
    Done,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardStep::Greet => write!(f, "greet"),
            WizardStep::Intake => write!(f, "intake"),
            WizardStep::Schedule => write!(f, "schedule"),
            WizardStep::Insurance => write!(f, "insurance"),
            WizardStep::Confirm => write!(f, "confirm"),
            WizardStep::Remind => write!(f, "remind"),
            WizardStep::Done => write!(f, "done"),
        }
    }
}

/// Sub-state of the reminder step: form check first, then attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStage {
    FormCheck,
    AttendanceCheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Agent,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatLine {
    pub who: ChatRole,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct WizardSession {
    pub id: Uuid,
    pub step: WizardStep,
    pub chat: Vec<ChatLine>,
    pub status: Option<PatientStatus>,
    pub patient: Option<PatientRecord>,
    pub booked_slots: Vec<String>,
    pub reminder_stage: ReminderStage,
}

impl WizardSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            step: WizardStep::Greet,
            chat: Vec::new(),
            status: None,
            patient: None,
            booked_slots: Vec::new(),
            reminder_stage: ReminderStage::FormCheck,
        }
    }

    pub fn say(&mut self, who: ChatRole, message: impl Into<String>) {
        self.chat.push(ChatLine {
            who,
            message: message.into(),
        });
    }
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

// ==============================================================================
// Step request payloads
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct GreetRequest {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntakeRequest {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub location: String,
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookRequest {
    pub doctor_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WizardAvailabilityQuery {
    pub doctor_id: Option<String>,
}

/// Insurance fields are stored as submitted; "NA" is a valid answer.
#[derive(Debug, Clone, Deserialize)]
pub struct InsuranceRequest {
    pub carrier: String,
    pub member_id: String,
    pub group: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReminderRequest {
    pub filled: Option<bool>,
    pub attending: Option<bool>,
    pub reason: Option<String>,
}
