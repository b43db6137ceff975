pub mod session;

pub use session::{SessionStore, WizardState};
