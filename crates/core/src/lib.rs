#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared models and logic for the distribution service.

pub mod api;
pub mod clock;
pub mod handler;
pub mod ids;
pub mod model;
pub mod validation;

mod util;

pub use clock::{Clock, FixedClock, SystemClock};
pub use handler::DistributionHandler;
pub use ids::{IdGenerator, IdKind, IdStrategy, SequentialIdGenerator, UlidIdGenerator, UuidIdGenerator};
pub use util::format_iso8601;
pub use validation::{RequestError, UnknownScopePolicy, ValidationMode, ValidationPolicy};
