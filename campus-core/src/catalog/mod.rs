pub mod course;
pub mod holiday;
pub mod people;
pub mod schedule;

pub use course::{Course, CourseType, DeliveryMode};
pub use holiday::Holiday;
pub use people::{Student, Trainer};
pub use schedule::{CourseSchedule, ScheduleView};
