//! Recording port doubles — `PlaybackPort` and `InteractionPort`
//! implementations that remember every call.

use branchreel_content::domain::document::{Choice, QteSpec};
use branchreel_core::error::StoryError;
use branchreel_core::ticket::Ticket;
use branchreel_narrative::ports::{InteractionPort, PlaybackPort};
use branchreel_qte::QtePrompt;

/// A call made on [`RecordingPlayback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackCall {
    /// `play` was called.
    Play {
        /// Requested media location.
        media_url: String,
        /// Ticket the request was issued with.
        ticket: Ticket,
    },
    /// `pause` was called.
    Pause,
    /// `resume` was called.
    Resume,
    /// `stop` was called.
    Stop,
}

/// A playback port that records calls. `play` fails once per queued
/// failure message.
#[derive(Debug, Default)]
pub struct RecordingPlayback {
    /// Every call, in order.
    pub calls: Vec<PlaybackCall>,
    /// Value returned from `progress`.
    pub progress: f32,
    failures: Vec<String>,
}

impl RecordingPlayback {
    /// Creates a playback double with no queued failures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `play` call fail with `message`.
    pub fn fail_next(&mut self, message: impl Into<String>) {
        self.failures.push(message.into());
    }

    /// Returns the ticket and location of the most recent `play` call.
    #[must_use]
    pub fn last_play(&self) -> Option<(&str, Ticket)> {
        self.calls.iter().rev().find_map(|call| match call {
            PlaybackCall::Play { media_url, ticket } => Some((media_url.as_str(), *ticket)),
            _ => None,
        })
    }

    /// Returns every requested media location, in order.
    #[must_use]
    pub fn played_urls(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                PlaybackCall::Play { media_url, .. } => Some(media_url.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl PlaybackPort for RecordingPlayback {
    fn play(&mut self, media_url: &str, ticket: Ticket) -> Result<(), StoryError> {
        self.calls.push(PlaybackCall::Play {
            media_url: media_url.to_owned(),
            ticket,
        });
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(StoryError::Transport(self.failures.remove(0)))
        }
    }

    fn pause(&mut self) {
        self.calls.push(PlaybackCall::Pause);
    }

    fn resume(&mut self) {
        self.calls.push(PlaybackCall::Resume);
    }

    fn stop(&mut self) {
        self.calls.push(PlaybackCall::Stop);
    }

    fn progress(&self) -> f32 {
        self.progress
    }
}

/// A call made on [`RecordingInteraction`].
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionCall {
    /// `hide_all` was called.
    HideAll,
    /// `present_choices` was called.
    Choices {
        /// Prompt shown above the choices.
        prompt: String,
        /// Choices shown.
        choices: Vec<Choice>,
        /// Ticket the choices were issued with.
        ticket: Ticket,
    },
    /// `present_qte` was called.
    Qte {
        /// The check shown.
        spec: QteSpec,
        /// Instruction shown.
        instruction: String,
        /// Ticket the check was issued with.
        ticket: Ticket,
    },
    /// `update_qte` was called.
    QteProgress {
        /// Progress value shown.
        progress: f64,
    },
}

/// An interaction port that records calls.
#[derive(Debug, Default)]
pub struct RecordingInteraction {
    /// Every call, in order.
    pub calls: Vec<InteractionCall>,
}

impl RecordingInteraction {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the most recently presented choices and their ticket.
    #[must_use]
    pub fn last_choices(&self) -> Option<(&str, &[Choice], Ticket)> {
        self.calls.iter().rev().find_map(|call| match call {
            InteractionCall::Choices {
                prompt,
                choices,
                ticket,
            } => Some((prompt.as_str(), choices.as_slice(), *ticket)),
            _ => None,
        })
    }

    /// Returns the most recently presented QTE and its ticket.
    #[must_use]
    pub fn last_qte(&self) -> Option<(&QteSpec, Ticket)> {
        self.calls.iter().rev().find_map(|call| match call {
            InteractionCall::Qte { spec, ticket, .. } => Some((spec, *ticket)),
            _ => None,
        })
    }

    /// Returns how many times choices were presented.
    #[must_use]
    pub fn choices_presented(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, InteractionCall::Choices { .. }))
            .count()
    }

    /// Returns how many times a QTE was presented.
    #[must_use]
    pub fn qtes_presented(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, InteractionCall::Qte { .. }))
            .count()
    }
}

impl InteractionPort for RecordingInteraction {
    fn hide_all(&mut self) {
        self.calls.push(InteractionCall::HideAll);
    }

    fn present_choices(&mut self, prompt: &str, choices: &[Choice], ticket: Ticket) {
        self.calls.push(InteractionCall::Choices {
            prompt: prompt.to_owned(),
            choices: choices.to_vec(),
            ticket,
        });
    }

    fn present_qte(&mut self, spec: &QteSpec, prompt: &QtePrompt, ticket: Ticket) {
        self.calls.push(InteractionCall::Qte {
            spec: spec.clone(),
            instruction: prompt.instruction.clone(),
            ticket,
        });
    }

    fn update_qte(&mut self, progress: f64, _prompt: &QtePrompt) {
        self.calls.push(InteractionCall::QteProgress { progress });
    }
}
