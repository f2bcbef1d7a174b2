//! Ports - the seams the dispatcher talks through.
//!
//! - `EventHandler`: what subscribers implement.
//! - `Clock`: where event timestamps come from.

pub mod clock;
pub mod handler;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::handler::{EventHandler, FnHandler, HandlerRef, same_handler};
