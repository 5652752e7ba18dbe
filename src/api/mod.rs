//! Resource API module
//!
//! Typed wrappers for the booking platform's REST resources. Every call goes
//! through `ApiClient`, so all of them share token injection and refresh.

mod models;
mod resources;

pub use models::{AdminBooking, Booking, DashboardStats, Event, NewEvent, RecentBooking, User};
pub use resources::EventDeskApi;
