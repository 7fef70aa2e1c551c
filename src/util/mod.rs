//! Stateless helpers: calendar arithmetic, string shaping, cookie codec.

pub mod cookies;
pub mod date;
pub mod text;

pub use cookies::{CookieOptions, CookiePolicy, SameSite};
pub use date::LocalCalendar;
