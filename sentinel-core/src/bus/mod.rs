//! In-process fan-out of the inbound event stream.
//!
//! One ingress publishes into an [`EventMultiplexer`]; camera cards, health
//! boards and CLI printers subscribe by [`Topic`].

mod multiplexer;
mod topic;

pub use multiplexer::{EventMultiplexer, Subscription};
pub use topic::{Topic, WILDCARD};
