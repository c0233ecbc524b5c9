//! Ports the engine drives: media playback and interaction presentation.
//!
//! Both are implemented by the hosting presentation layer. Anything the
//! engine hands out that can be answered later (a media request, a set of
//! choices, a QTE) carries a [`Ticket`]; the host passes the ticket back with
//! its answer so answers to superseded requests are rejected.

use branchreel_content::domain::document::{Choice, QteSpec};
use branchreel_core::error::StoryError;
use branchreel_core::ticket::Ticket;
use branchreel_qte::QtePrompt;

/// A report from the media player about a request made with
/// [`PlaybackPort::play`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackSignal {
    /// Playback began.
    Started,
    /// Playback reached the end.
    Finished,
    /// Playback failed after the request was accepted.
    Error(String),
}

/// Media playback, driven by the engine.
pub trait PlaybackPort {
    /// Starts playing `media_url`. The host reports progress back through
    /// `StoryEngine::on_playback` with the same `ticket`.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Transport` if the media cannot be opened.
    fn play(&mut self, media_url: &str, ticket: Ticket) -> Result<(), StoryError>;

    /// Pauses the current media.
    fn pause(&mut self);

    /// Resumes paused media.
    fn resume(&mut self);

    /// Stops the current media. Must be safe to call when nothing plays.
    fn stop(&mut self);

    /// Playback position as a fraction of the media length, in `[0, 1]`.
    fn progress(&self) -> f32;
}

/// Interaction presentation, driven by the engine.
pub trait InteractionPort {
    /// Hides every choice and QTE surface.
    fn hide_all(&mut self);

    /// Shows `choices` under `prompt`. The host answers through
    /// `StoryEngine::select_choice` with `ticket`.
    fn present_choices(&mut self, prompt: &str, choices: &[Choice], ticket: Ticket);

    /// Shows a QTE. Inputs go to `StoryEngine::qte_input` with `ticket`; a
    /// host that evaluates the check itself answers through
    /// `StoryEngine::resolve_qte` instead.
    fn present_qte(&mut self, spec: &QteSpec, prompt: &QtePrompt, ticket: Ticket);

    /// Refreshes the QTE progress bar and instruction on every engine tick.
    fn update_qte(&mut self, _progress: f64, _prompt: &QtePrompt) {}
}
