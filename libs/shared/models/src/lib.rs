pub mod auth;
pub mod availability;
pub mod error;
pub mod interval;
pub mod page;
pub mod schedule;
pub mod user;
pub mod window;

pub use availability::{Availability, AvailabilityStatus, NewAvailability};
pub use interval::TimeRange;
pub use page::Page;
pub use schedule::{NewSchedule, Schedule, ScheduleDetails};
pub use user::{NewUser, User, UserResponse, UserRole, UserStatus};
pub use window::{TimeFilter, TimeWindow};
