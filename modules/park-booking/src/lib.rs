pub mod admin;
pub mod booking;
pub mod calendar;
pub mod config;
pub mod error;
pub mod form;
pub mod host;
pub mod presentation;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::Config;
pub use error::BookingError;
pub use host::PageHost;
