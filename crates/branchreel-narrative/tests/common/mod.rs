//! Shared harness for engine scenario tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use branchreel_content::domain::document::StoryDocument;
use branchreel_core::ticket::Ticket;
use branchreel_narrative::application::engine::StoryEngine;
use branchreel_narrative::config::EngineConfig;
use branchreel_narrative::domain::events::StoryEventKind;
use branchreel_narrative::ports::PlaybackSignal;
use branchreel_test_support::{
    ManualClock, RecordingInteraction, RecordingPlayback, init_tracing, sample_document,
};

pub type TestEngine = StoryEngine<RecordingPlayback, RecordingInteraction>;

pub fn engine_with(document: StoryDocument, config: EngineConfig) -> (TestEngine, ManualClock) {
    init_tracing();
    let clock = ManualClock::new();
    let engine = StoryEngine::new(
        document,
        config,
        Arc::new(clock.clone()),
        RecordingPlayback::new(),
        RecordingInteraction::new(),
    );
    (engine, clock)
}

pub fn sample_engine() -> (TestEngine, ManualClock) {
    engine_with(sample_document(), EngineConfig::default())
}

/// Starts the sample story and waits for the intro choices.
pub fn started_at_intro_choices() -> (TestEngine, ManualClock) {
    let (mut engine, clock) = sample_engine();
    engine.start().unwrap();
    finish_media(&mut engine, &clock);
    (engine, clock)
}

/// Reports the current media as finished and waits out the interaction
/// delay.
pub fn finish_media(engine: &mut TestEngine, clock: &ManualClock) {
    let ticket = engine.current_ticket();
    engine.on_playback(ticket, PlaybackSignal::Finished).unwrap();
    clock.advance(engine.config().interaction_delay);
    engine.tick().unwrap();
}

/// Picks the choice labelled `label` from the most recent choice set.
pub fn choose(engine: &mut TestEngine, label: &str) {
    let (ticket, next) = {
        let (_, choices, ticket) = engine.interaction().last_choices().unwrap();
        let choice = choices.iter().find(|c| c.label == label).unwrap();
        (ticket, choice.next_node_id.clone())
    };
    engine.select_choice(ticket, &next).unwrap();
}

/// Returns the ticket of the QTE on screen.
pub fn qte_ticket(engine: &TestEngine) -> Ticket {
    engine.interaction().last_qte().unwrap().1
}

pub fn advance_secs(clock: &ManualClock, secs: f64) {
    clock.advance(Duration::from_secs_f64(secs));
}

pub fn event_kinds(engine: &mut TestEngine) -> Vec<StoryEventKind> {
    engine.take_events().into_iter().map(|e| e.kind).collect()
}

pub fn current_node_id(engine: &TestEngine) -> Option<String> {
    engine.current_node().map(|node| node.id.clone())
}
