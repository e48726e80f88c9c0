//! Worker core: lifecycle and scheduling.
//!
//! The only public API from this module is [`Supervisor`], which owns
//! startup, periodic scheduling and graceful shutdown.
//!
//! Internal modules:
//! - [`supervisor`]: startup seeding, signal wait, bounded-grace join;
//! - [`ticker`]: interval loop with a cooperative stop token;
//! - [`shutdown`]: cross-platform interrupt handling.

mod shutdown;
mod supervisor;
mod ticker;

pub use supervisor::Supervisor;
