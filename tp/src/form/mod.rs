//! Trip form orchestration
//!
//! [`TripFormController`] applies user intents to the draft and talks to the
//! collaborators. [`FormHandle`] runs a controller as an actor so intents
//! from several callers are applied one at a time.

mod controller;
mod error;
mod handle;
mod messages;

pub use controller::{FormSnapshot, TripFormController};
pub use error::{FormError, FormResult};
pub use handle::FormHandle;
pub use messages::{FormCommand, FormEvent};
