pub mod slots;
pub mod booking;

pub use booking::ScheduleService;
pub use slots::{book, find_consecutive_free};
