//! Sky positions and epochs, as shown in notifications.

pub mod coords;
pub mod time;

pub use coords::{format_dec, format_ra, Galactic};
pub use time::{jd_to_datetime, jd_to_iso};
