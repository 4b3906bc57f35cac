pub mod status;
pub mod work_calendar;

pub use status::ScheduleStatus;
pub use work_calendar::{ScheduleSpan, WorkCalendar};
