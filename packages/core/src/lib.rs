//! PIM event relay core: canonical event model, payload processing, and
//! the error taxonomy shared by every stage of the relay pipeline.

pub mod error;
pub mod event;
pub mod processor;

pub use error::{codes, RelayError};
pub use event::{Envelope, Event, ENVELOPE_SOURCE};
pub use processor::{decode_body, EventProcessor, JsonEventProcessor};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
