//! Scenario tests driving `StoryEngine` through the recording ports.

mod common;

use std::path::PathBuf;
use std::time::Duration;

use branchreel_content::application::loader::load_document;
use branchreel_content::application::sources::InlineSource;
use branchreel_core::error::StoryError;
use branchreel_narrative::application::query_handlers::InteractionView;
use branchreel_narrative::config::EngineConfig;
use branchreel_narrative::domain::events::StoryEventKind;
use branchreel_narrative::domain::run_state::RunPhase;
use branchreel_narrative::ports::PlaybackSignal;
use branchreel_qte::QteInput;
use branchreel_test_support::{
    InteractionCall, ManualClock, PlaybackCall, SAMPLE_STORY_JSON, sample_document,
};

use common::{
    TestEngine, advance_secs, choose, current_node_id, engine_with, event_kinds, finish_media,
    qte_ticket, sample_engine, started_at_intro_choices,
};

const CDN: &str = "https://cdn.example.test/crossing";

// --- start ---

#[test]
fn test_start_plays_start_node() {
    // Arrange
    let (mut engine, _clock) = sample_engine();

    // Act
    engine.start().unwrap();

    // Assert
    assert_eq!(engine.phase(), RunPhase::PlayingMedia);
    assert!(engine.is_active());
    assert_eq!(current_node_id(&engine).as_deref(), Some("intro"));
    let (url, ticket) = engine.playback().last_play().unwrap();
    assert_eq!(url, format!("{CDN}/intro.mp4"));
    assert_eq!(ticket, engine.current_ticket());
    assert_eq!(
        event_kinds(&mut engine),
        vec![
            StoryEventKind::RunStarted {
                start_node_id: "intro".to_owned()
            },
            StoryEventKind::NodeEntered {
                node_id: "intro".to_owned(),
                media_url: Some(format!("{CDN}/intro.mp4")),
            },
        ]
    );
}

#[test]
fn test_start_with_missing_start_node_is_configuration_error() {
    // Arrange
    let mut document = sample_document();
    document.meta.start_node_id = "nowhere".to_owned();
    let (mut engine, _clock) = engine_with(document, EngineConfig::default());

    // Act
    let result = engine.start();

    // Assert
    match result {
        Err(StoryError::Configuration(msg)) => assert!(msg.contains("nowhere")),
        other => panic!("expected Configuration, got {other:?}"),
    }
    assert_eq!(engine.phase(), RunPhase::Idle);
    assert!(!engine.is_active());
    assert!(engine.playback().calls.is_empty());
    assert!(engine.take_events().is_empty());
}

#[test]
fn test_start_while_active_is_rejected() {
    let (mut engine, _clock) = sample_engine();
    engine.start().unwrap();
    let ticket = engine.current_ticket();

    let result = engine.start();

    assert!(matches!(result, Err(StoryError::Validation(_))));
    assert_eq!(engine.current_ticket(), ticket);
    assert_eq!(engine.playback().played_urls().len(), 1);
}

#[test]
fn test_media_resolves_against_local_dir_without_media_base() {
    let mut document = sample_document();
    document.meta.media_base = None;
    let config = EngineConfig {
        local_media_dir: PathBuf::from("/srv/media"),
        ..EngineConfig::default()
    };
    let (mut engine, _clock) = engine_with(document, config);

    engine.start().unwrap();

    assert_eq!(
        engine.playback().played_urls(),
        vec!["/srv/media/intro.mp4"]
    );
}

// --- choices ---

#[test]
fn test_choices_appear_after_interaction_delay() {
    // Arrange
    let (mut engine, clock) = sample_engine();
    engine.start().unwrap();
    let ticket = engine.current_ticket();

    // Act
    engine.on_playback(ticket, PlaybackSignal::Finished).unwrap();
    advance_secs(&clock, 0.5);
    engine.tick().unwrap();
    let shown_early = engine.interaction().choices_presented();
    advance_secs(&clock, 0.5);
    engine.tick().unwrap();

    // Assert
    assert_eq!(shown_early, 0);
    assert_eq!(engine.phase(), RunPhase::AwaitingInteraction);
    let (prompt, choices, choice_ticket) = engine.interaction().last_choices().unwrap();
    assert_eq!(prompt, "Which way?");
    let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Left", "Right", "Wait"]);
    assert_eq!(choice_ticket, ticket);
}

#[test]
fn test_duplicate_finished_signal_is_ignored() {
    let (mut engine, clock) = sample_engine();
    engine.start().unwrap();
    let ticket = engine.current_ticket();

    engine.on_playback(ticket, PlaybackSignal::Finished).unwrap();
    engine.on_playback(ticket, PlaybackSignal::Finished).unwrap();
    advance_secs(&clock, 1.0);
    engine.tick().unwrap();
    engine.tick().unwrap();

    assert_eq!(engine.interaction().choices_presented(), 1);
}

#[test]
fn test_choice_plays_target_node() {
    let (mut engine, _clock) = started_at_intro_choices();

    choose(&mut engine, "Left");

    assert_eq!(engine.phase(), RunPhase::PlayingMedia);
    assert_eq!(current_node_id(&engine).as_deref(), Some("bridge"));
    assert_eq!(
        engine.playback().last_play().unwrap().0,
        format!("{CDN}/bridge.mp4")
    );
    assert_eq!(
        engine.interaction().calls.last(),
        Some(&InteractionCall::HideAll)
    );
}

#[test]
fn test_empty_choice_finishes_and_offers_restart() {
    // Arrange
    let (mut engine, clock) = started_at_intro_choices();

    // Act
    choose(&mut engine, "Wait");
    let phase_after_choice = engine.phase();
    advance_secs(&clock, 1.9);
    engine.tick().unwrap();
    let offered_early = engine.interaction().choices_presented();
    advance_secs(&clock, 0.1);
    engine.tick().unwrap();

    // Assert
    assert_eq!(phase_after_choice, RunPhase::Finished);
    assert!(!engine.is_active());
    assert_eq!(offered_early, 1);
    let (prompt, choices, _) = engine.interaction().last_choices().unwrap();
    assert_eq!(prompt, "The End");
    assert_eq!(choices.len(), 1);
    assert_eq!(choices[0].label, "Restart");
    assert_eq!(choices[0].next_node_id, "intro");
}

#[test]
fn test_restart_choice_starts_a_new_run() {
    // Arrange
    let (mut engine, clock) = started_at_intro_choices();
    choose(&mut engine, "Wait");
    advance_secs(&clock, 2.0);
    engine.tick().unwrap();
    let old_ticket = engine.current_ticket();
    let old_run = engine.run_id();

    // Act
    let (_, _, ticket) = engine.interaction().last_choices().unwrap();
    engine.select_choice(ticket, "ignored").unwrap();

    // Assert
    assert_eq!(engine.phase(), RunPhase::PlayingMedia);
    assert!(engine.is_active());
    assert_eq!(current_node_id(&engine).as_deref(), Some("intro"));
    assert!(engine.current_ticket().generation > old_ticket.generation);
    assert_ne!(engine.run_id(), old_run);
    assert!(engine.playback().calls.contains(&PlaybackCall::Stop));
}

#[test]
fn test_choices_take_precedence_over_qte() {
    // Arrange
    let mut document = sample_document();
    let bridge_qte = document
        .nodes
        .iter()
        .find(|node| node.id == "bridge")
        .and_then(|node| node.qte.clone());
    let intro = document
        .nodes
        .iter_mut()
        .find(|node| node.id == "intro")
        .unwrap();
    intro.qte = bridge_qte;
    let (mut engine, clock) = engine_with(document, EngineConfig::default());
    engine.start().unwrap();

    // Act
    finish_media(&mut engine, &clock);
    advance_secs(&clock, 5.0);
    engine.tick().unwrap();

    // Assert
    assert_eq!(engine.interaction().choices_presented(), 1);
    assert_eq!(engine.interaction().qtes_presented(), 0);
    assert_eq!(engine.phase(), RunPhase::AwaitingInteraction);
    assert_eq!(current_node_id(&engine).as_deref(), Some("intro"));
    assert_eq!(
        engine.view().interaction,
        InteractionView::Choices {
            labels: vec!["Left".to_owned(), "Right".to_owned(), "Wait".to_owned()]
        }
    );
}

#[test]
fn test_select_choice_without_choices_on_screen_is_rejected() {
    let (mut engine, _clock) = sample_engine();
    engine.start().unwrap();

    let result = engine.select_choice(engine.current_ticket(), "bridge");

    assert!(matches!(result, Err(StoryError::Validation(_))));
    assert_eq!(current_node_id(&engine).as_deref(), Some("intro"));
}

// --- QTEs ---

fn at_bridge_qte() -> (TestEngine, ManualClock) {
    let (mut engine, clock) = started_at_intro_choices();
    choose(&mut engine, "Left");
    finish_media(&mut engine, &clock);
    (engine, clock)
}

#[test]
fn test_button_qte_press_in_green_zone_takes_success_branch() {
    // Arrange
    let (mut engine, clock) = at_bridge_qte();
    let ticket = qte_ticket(&engine);
    engine.take_events();

    // Act
    advance_secs(&clock, 1.7);
    engine.qte_input(ticket, &QteInput::Trigger).unwrap();

    // Assert
    assert_eq!(current_node_id(&engine).as_deref(), Some("far_side"));
    assert!(event_kinds(&mut engine).contains(&StoryEventKind::QteResolved {
        node_id: "bridge".to_owned(),
        success: true,
        next_node_id: Some("far_side".to_owned()),
    }));
}

#[test]
fn test_button_qte_early_press_is_ignored() {
    let (mut engine, clock) = at_bridge_qte();
    let ticket = qte_ticket(&engine);

    advance_secs(&clock, 0.5);
    engine.qte_input(ticket, &QteInput::Trigger).unwrap();

    assert_eq!(engine.phase(), RunPhase::AwaitingInteraction);
    assert_eq!(current_node_id(&engine).as_deref(), Some("bridge"));

    advance_secs(&clock, 1.3);
    engine.qte_input(ticket, &QteInput::Trigger).unwrap();

    assert_eq!(current_node_id(&engine).as_deref(), Some("far_side"));
}

#[test]
fn test_button_qte_timeout_takes_fail_branch() {
    let (mut engine, clock) = at_bridge_qte();

    advance_secs(&clock, 2.0);
    engine.tick().unwrap();

    assert_eq!(current_node_id(&engine).as_deref(), Some("river"));
    assert_eq!(
        engine.playback().last_play().unwrap().0,
        format!("{CDN}/river.mp4")
    );
}

#[test]
fn test_qte_progress_is_pushed_on_tick() {
    let (mut engine, clock) = at_bridge_qte();

    advance_secs(&clock, 0.5);
    engine.tick().unwrap();

    assert_eq!(
        engine.interaction().calls.last(),
        Some(&InteractionCall::QteProgress { progress: 0.25 })
    );
}

#[test]
fn test_host_resolved_qte_takes_reported_branch() {
    let (mut engine, _clock) = at_bridge_qte();
    let ticket = qte_ticket(&engine);

    engine.resolve_qte(ticket, false).unwrap();

    assert_eq!(current_node_id(&engine).as_deref(), Some("river"));
}

#[test]
fn test_sequence_qte_keys_in_order_succeeds() {
    // Arrange
    let (mut engine, clock) = started_at_intro_choices();
    choose(&mut engine, "Right");
    finish_media(&mut engine, &clock);
    let ticket = qte_ticket(&engine);

    // Act
    for key in ["a", "S", "d"] {
        advance_secs(&clock, 0.5);
        engine.qte_input(ticket, &QteInput::key(key)).unwrap();
    }

    // Assert
    assert_eq!(current_node_id(&engine).as_deref(), Some("treasure"));
}

#[test]
fn test_sequence_qte_missed_slice_fails() {
    let (mut engine, clock) = started_at_intro_choices();
    choose(&mut engine, "Right");
    finish_media(&mut engine, &clock);

    advance_secs(&clock, 1.0);
    engine.tick().unwrap();

    assert_eq!(current_node_id(&engine).as_deref(), Some("collapse"));
}

#[test]
fn test_timing_qte_is_judged_at_deadline() {
    // Arrange
    let (mut engine, clock) = sample_engine();
    engine.start().unwrap();
    engine.play_node("far_side").unwrap();
    finish_media(&mut engine, &clock);
    let ticket = qte_ticket(&engine);

    // Act
    advance_secs(&clock, 1.0);
    engine.qte_input(ticket, &QteInput::Trigger).unwrap();
    let node_after_press = current_node_id(&engine);
    advance_secs(&clock, 1.0);
    engine.tick().unwrap();

    // Assert
    assert_eq!(node_after_press.as_deref(), Some("far_side"));
    assert_eq!(current_node_id(&engine).as_deref(), Some("ending_good"));
}

#[test]
fn test_qte_with_zero_duration_fails_without_ui() {
    // Arrange
    let (mut engine, clock) = sample_engine();
    engine.start().unwrap();

    // Act
    engine.play_node("broken").unwrap();
    advance_secs(&clock, 1.0);
    engine.tick().unwrap();

    // Assert
    assert_eq!(engine.interaction().qtes_presented(), 0);
    assert_eq!(current_node_id(&engine).as_deref(), Some("river"));
}

#[test]
fn test_terminal_node_finishes_after_media() {
    let (mut engine, clock) = sample_engine();
    engine.start().unwrap();
    engine.play_node("treasure").unwrap();
    engine.take_events();

    finish_media(&mut engine, &clock);

    assert_eq!(engine.phase(), RunPhase::Finished);
    assert_eq!(current_node_id(&engine).as_deref(), Some("treasure"));
    assert!(event_kinds(&mut engine).contains(&StoryEventKind::RunFinished {
        node_id: Some("treasure".to_owned())
    }));
}

// --- missing references and failures ---

#[test]
fn test_missing_reference_leaves_run_inert() {
    // Arrange
    let (mut engine, clock) = started_at_intro_choices();
    choose(&mut engine, "Right");
    finish_media(&mut engine, &clock);
    advance_secs(&clock, 1.0);
    engine.tick().unwrap();
    finish_media(&mut engine, &clock);
    let (_, _, ticket) = engine.interaction().last_choices().unwrap();
    engine.take_events();

    // Act
    let result = engine.select_choice(ticket, "hidden_room");

    // Assert
    assert_eq!(result, Err(StoryError::MissingNode("hidden_room".to_owned())));
    assert_eq!(engine.phase(), RunPhase::PlayingMedia);
    assert!(engine.current_node().is_none());
    assert!(event_kinds(&mut engine).contains(&StoryEventKind::ReferenceMissing {
        node_id: "hidden_room".to_owned()
    }));

    advance_secs(&clock, 10.0);
    engine.tick().unwrap();
    assert!(engine.take_events().is_empty());

    engine.restart().unwrap();
    assert_eq!(current_node_id(&engine).as_deref(), Some("intro"));
}

#[test]
fn test_playback_error_is_transport_and_does_not_advance() {
    // Arrange
    let (mut engine, clock) = sample_engine();
    engine.start().unwrap();
    let ticket = engine.current_ticket();

    // Act
    let result = engine.on_playback(ticket, PlaybackSignal::Error("decoder crashed".to_owned()));
    advance_secs(&clock, 5.0);
    engine.tick().unwrap();

    // Assert
    assert_eq!(result, Err(StoryError::Transport("decoder crashed".to_owned())));
    assert_eq!(engine.phase(), RunPhase::PlayingMedia);
    assert_eq!(current_node_id(&engine).as_deref(), Some("intro"));
    assert_eq!(engine.interaction().choices_presented(), 0);
}

#[test]
fn test_play_failure_from_port_is_reported() {
    let (mut engine, _clock) = sample_engine();
    engine.playback_mut().fail_next("404 Not Found");

    let result = engine.start();

    assert_eq!(result, Err(StoryError::Transport("404 Not Found".to_owned())));
    assert_eq!(current_node_id(&engine).as_deref(), Some("intro"));
    assert!(matches!(
        event_kinds(&mut engine).last(),
        Some(StoryEventKind::PlaybackFailed { .. })
    ));
}

// --- generations ---

#[test]
fn test_restart_cancels_pending_qte_and_rejects_stale_input() {
    // Arrange
    let (mut engine, clock) = at_bridge_qte();
    let stale = qte_ticket(&engine);

    // Act
    engine.restart().unwrap();
    advance_secs(&clock, 1.7);
    let result = engine.qte_input(stale, &QteInput::Trigger);
    advance_secs(&clock, 5.0);
    engine.tick().unwrap();

    // Assert
    assert_eq!(result, Err(StoryError::StaleTicket(stale)));
    assert_eq!(engine.phase(), RunPhase::PlayingMedia);
    assert_eq!(current_node_id(&engine).as_deref(), Some("intro"));
    assert_eq!(
        engine.playback().played_urls().last().copied(),
        Some(format!("{CDN}/intro.mp4").as_str())
    );
}

#[test]
fn test_stale_playback_signal_after_stop_is_rejected() {
    let (mut engine, clock) = sample_engine();
    engine.start().unwrap();
    let ticket = engine.current_ticket();

    engine.stop();
    let result = engine.on_playback(ticket, PlaybackSignal::Finished);
    advance_secs(&clock, 5.0);
    engine.tick().unwrap();

    assert_eq!(result, Err(StoryError::StaleTicket(ticket)));
    assert!(!engine.is_active());
    assert_eq!(engine.interaction().choices_presented(), 0);
    assert_eq!(engine.playback().calls.last(), Some(&PlaybackCall::Stop));
}

#[test]
fn test_finished_signal_after_stop_shows_no_interaction() {
    // Arrange
    let (mut engine, clock) = sample_engine();
    engine.start().unwrap();
    engine.stop();

    // Act
    let result = engine.on_playback(engine.current_ticket(), PlaybackSignal::Finished);
    advance_secs(&clock, 1.0);
    engine.tick().unwrap();

    // Assert
    assert!(matches!(result, Err(StoryError::Validation(_))));
    assert!(!engine.is_active());
    assert_eq!(engine.phase(), RunPhase::PlayingMedia);
    assert_eq!(engine.interaction().choices_presented(), 0);
    assert_eq!(engine.interaction().qtes_presented(), 0);
    assert_eq!(engine.next_deadline(), None);
}

#[test]
fn test_pending_interaction_timer_is_dropped_when_node_changes() {
    let (mut engine, clock) = sample_engine();
    engine.start().unwrap();
    let ticket = engine.current_ticket();
    engine.on_playback(ticket, PlaybackSignal::Finished).unwrap();

    engine.play_node("treasure").unwrap();
    advance_secs(&clock, 1.0);
    engine.tick().unwrap();

    assert_eq!(engine.interaction().choices_presented(), 0);
    assert_eq!(engine.phase(), RunPhase::PlayingMedia);
}

#[test]
fn test_play_node_requires_active_run() {
    let (mut engine, _clock) = sample_engine();

    let result = engine.play_node("intro");

    assert!(matches!(result, Err(StoryError::Validation(_))));
    assert!(engine.playback().calls.is_empty());
}

// --- pass-through and views ---

#[test]
fn test_pause_and_resume_pass_through() {
    let (mut engine, _clock) = sample_engine();
    engine.start().unwrap();

    engine.pause();
    engine.resume();

    let calls = &engine.playback().calls;
    assert_eq!(
        &calls[calls.len() - 2..],
        &[PlaybackCall::Pause, PlaybackCall::Resume]
    );
}

#[test]
fn test_view_reports_choices_on_screen() {
    let (engine, _clock) = started_at_intro_choices();

    let view = engine.view();

    assert_eq!(view.title, "The Crossing");
    assert_eq!(view.phase, RunPhase::AwaitingInteraction);
    assert_eq!(view.current_node_id.as_deref(), Some("intro"));
    assert_eq!(
        view.interaction,
        InteractionView::Choices {
            labels: vec!["Left".to_owned(), "Right".to_owned(), "Wait".to_owned()]
        }
    );
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["interaction"]["type"], "choices");
}

// --- determinism ---

fn scripted_run() -> (Option<String>, Vec<(Duration, StoryEventKind)>) {
    let (mut engine, clock) = started_at_intro_choices();
    choose(&mut engine, "Left");
    finish_media(&mut engine, &clock);
    let ticket = qte_ticket(&engine);
    advance_secs(&clock, 1.8);
    engine.qte_input(ticket, &QteInput::Trigger).unwrap();
    finish_media(&mut engine, &clock);
    advance_secs(&clock, 0.2);
    engine.tick().unwrap();
    let ticket = qte_ticket(&engine);
    advance_secs(&clock, 0.6);
    engine.qte_input(ticket, &QteInput::Trigger).unwrap();
    advance_secs(&clock, 3.0);
    engine.tick().unwrap();

    let trace = engine
        .take_events()
        .into_iter()
        .map(|e| (e.at, e.kind))
        .collect();
    (current_node_id(&engine), trace)
}

#[test]
fn test_same_inputs_produce_same_trace() {
    let (first_node, first_trace) = scripted_run();
    let (second_node, second_trace) = scripted_run();

    assert_eq!(first_node.as_deref(), Some("ending_good"));
    assert_eq!(first_node, second_node);
    assert_eq!(first_trace, second_trace);
}

// --- loading ---

#[tokio::test]
async fn test_engine_runs_a_loaded_document() {
    // Arrange
    let loaded = load_document(&InlineSource::json(SAMPLE_STORY_JSON))
        .await
        .unwrap();
    let (mut engine, _clock) = engine_with(loaded.document, EngineConfig::default());

    // Act
    engine.start().unwrap();

    // Assert
    assert_eq!(loaded.version_hash.len(), 64);
    assert_eq!(current_node_id(&engine).as_deref(), Some("intro"));
}
