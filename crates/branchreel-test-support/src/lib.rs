//! Shared test doubles and fixtures for the Branchreel story runtime.

mod clock;
mod fixtures;
mod logging;
mod ports;

pub use clock::ManualClock;
pub use fixtures::{SAMPLE_STORY_JSON, sample_document};
pub use logging::init_tracing;
pub use ports::{InteractionCall, PlaybackCall, RecordingInteraction, RecordingPlayback};
