//! The story traversal state machine.
//!
//! The engine never blocks and never spawns: it advances when the host calls
//! one of its methods. Time-based steps (the pause before an interaction,
//! the QTE deadline, the pause before the restart offer) are timers on the
//! injected [`Clock`], fired from [`StoryEngine::tick`].

use std::sync::Arc;
use std::time::Duration;

use branchreel_content::domain::document::{Choice, StoryDocument, StoryNode};
use branchreel_content::domain::node_index::NodeIndex;
use branchreel_core::clock::Clock;
use branchreel_core::error::StoryError;
use branchreel_core::ticket::Ticket;
use branchreel_core::timer::TimerQueue;
use branchreel_qte::{QteEvaluator, QteInput};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::domain::events::{StoryEvent, StoryEventKind};
use crate::domain::run_state::{RunPhase, RunState};
use crate::ports::{InteractionPort, PlaybackPort, PlaybackSignal};

/// Work scheduled on the timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wakeup {
    ShowInteraction,
    OfferRestart,
}

/// The interaction currently on screen.
#[derive(Debug)]
pub(crate) enum Pending {
    Choices,
    Qte {
        evaluator: QteEvaluator,
        started_at: Duration,
    },
    RestartOffer,
}

/// Drives one story document through runs.
///
/// Owns the run state, the node index and both ports. Host callbacks
/// (`on_playback`, `select_choice`, `qte_input`, `resolve_qte`) must pass
/// back the [`Ticket`] they were issued with; anything older than the
/// current ticket is rejected with `StoryError::StaleTicket` and changes
/// nothing.
pub struct StoryEngine<P, U> {
    document: StoryDocument,
    index: NodeIndex,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    playback: P,
    interaction: U,
    state: RunState,
    ticket: Ticket,
    run_id: Uuid,
    timers: TimerQueue<Wakeup>,
    pending: Option<Pending>,
    events: Vec<StoryEvent>,
}

impl<P: PlaybackPort, U: InteractionPort> StoryEngine<P, U> {
    /// Creates an idle engine for `document`.
    #[must_use]
    pub fn new(
        document: StoryDocument,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        playback: P,
        interaction: U,
    ) -> Self {
        let index = NodeIndex::build(&document);
        tracing::debug!(
            title = %document.meta.title,
            nodes = index.len(),
            "story engine ready"
        );
        Self {
            document,
            index,
            config,
            clock,
            playback,
            interaction,
            state: RunState::default(),
            ticket: Ticket::default(),
            run_id: Uuid::nil(),
            timers: TimerQueue::new(),
            pending: None,
            events: Vec::new(),
        }
    }

    /// Starts a run at the document's start node.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Validation` if a run is already active and
    /// `StoryError::Configuration` if the start node does not exist; in both
    /// cases nothing else changes. Errors from entering the start node
    /// (`Transport` from the playback port) are returned after the run has
    /// started.
    pub fn start(&mut self) -> Result<(), StoryError> {
        self.state.begin_loading()?;

        let start_node_id = self.document.meta.start_node_id.clone();
        if !self.index.contains(&start_node_id) {
            self.state.abort_loading();
            tracing::error!(start_node_id = %start_node_id, "start node not found");
            return Err(StoryError::Configuration(format!(
                "start node '{start_node_id}' not found"
            )));
        }

        self.open_generation();
        self.run_id = Uuid::new_v4();
        self.state.activate()?;
        tracing::info!(
            run_id = %self.run_id,
            generation = %self.ticket.generation,
            title = %self.document.meta.title,
            "run started"
        );
        self.record(StoryEventKind::RunStarted {
            start_node_id: start_node_id.clone(),
        });
        self.enter_node(&start_node_id)
    }

    /// Cancels everything in flight, stops media and starts a fresh run.
    ///
    /// # Errors
    ///
    /// Same as [`start`](Self::start).
    pub fn restart(&mut self) -> Result<(), StoryError> {
        tracing::info!(run_id = %self.run_id, "restarting run");
        self.open_generation();
        self.interaction.hide_all();
        self.playback.stop();
        self.state = RunState::default();
        self.start()
    }

    /// Jumps the active run to `node_id`.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Validation` if no run is active,
    /// `StoryError::MissingNode` if the node does not exist (the run is left
    /// inert), or `StoryError::Transport` if its media cannot be opened.
    pub fn play_node(&mut self, node_id: &str) -> Result<(), StoryError> {
        if !self.state.is_active() {
            return Err(StoryError::Validation("no run is active".to_owned()));
        }
        self.enter_node(node_id)
    }

    /// Pauses media playback.
    pub fn pause(&mut self) {
        self.playback.pause();
    }

    /// Resumes media playback.
    pub fn resume(&mut self) {
        self.playback.resume();
    }

    /// Stops the run where it is: cancels pending work, hides interaction
    /// surfaces and stops media. The phase is left unchanged.
    pub fn stop(&mut self) {
        tracing::info!(run_id = %self.run_id, "run stopped");
        self.open_generation();
        self.state.deactivate();
        self.interaction.hide_all();
        self.playback.stop();
        self.record(StoryEventKind::RunStopped);
    }

    /// Handles a report from the media player.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::StaleTicket` for a superseded request,
    /// `StoryError::Validation` if no run is active or no media is playing,
    /// and
    /// `StoryError::Transport` carrying the message of a playback error. A
    /// playback error does not advance the story.
    pub fn on_playback(&mut self, ticket: Ticket, signal: PlaybackSignal) -> Result<(), StoryError> {
        self.check_ticket(ticket)?;
        if !self.state.is_active() {
            return Err(StoryError::Validation("no run is active".to_owned()));
        }
        let node_id = match self.current_node_id() {
            Some(id) if self.state.phase() == RunPhase::PlayingMedia => id.to_owned(),
            _ => return Err(StoryError::Validation("no media is playing".to_owned())),
        };

        match signal {
            PlaybackSignal::Started => {
                tracing::debug!(node_id = %node_id, "media started");
                Ok(())
            }
            PlaybackSignal::Finished if !self.timers.is_empty() => {
                tracing::debug!(node_id = %node_id, "duplicate media-finished signal ignored");
                Ok(())
            }
            PlaybackSignal::Finished => {
                self.media_finished();
                Ok(())
            }
            PlaybackSignal::Error(message) => {
                tracing::error!(node_id = %node_id, error = %message, "media playback failed");
                self.record(StoryEventKind::PlaybackFailed {
                    node_id,
                    message: message.clone(),
                });
                Err(StoryError::Transport(message))
            }
        }
    }

    /// Handles the player picking a choice. Picking the restart offer
    /// restarts the story whatever `next_node_id` says.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::StaleTicket` for superseded choices,
    /// `StoryError::Validation` if no choices are on screen, and any error
    /// from entering the chosen node.
    pub fn select_choice(&mut self, ticket: Ticket, next_node_id: &str) -> Result<(), StoryError> {
        self.check_ticket(ticket)?;
        match self.pending.take() {
            Some(Pending::Choices) => {
                let node_id = self.current_node_id().unwrap_or_default().to_owned();
                tracing::info!(node_id = %node_id, next_node_id, "choice selected");
                self.record(StoryEventKind::ChoiceSelected {
                    node_id,
                    next_node_id: next_node_id.to_owned(),
                });
                if next_node_id.is_empty() {
                    tracing::warn!("choice has no target, finishing run");
                    self.finish();
                    Ok(())
                } else {
                    self.enter_node(next_node_id)
                }
            }
            Some(Pending::RestartOffer) => self.restart(),
            other => {
                self.pending = other;
                Err(StoryError::Validation("no choices are on screen".to_owned()))
            }
        }
    }

    /// Feeds a player input to the QTE on screen.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::StaleTicket` for a superseded QTE,
    /// `StoryError::Validation` if no QTE is on screen, and any error from
    /// entering the branch the outcome selects.
    pub fn qte_input(&mut self, ticket: Ticket, input: &QteInput) -> Result<(), StoryError> {
        self.check_ticket(ticket)?;
        let now = self.clock.now();
        let Some(Pending::Qte {
            evaluator,
            started_at,
        }) = &mut self.pending
        else {
            return Err(StoryError::Validation("no QTE is on screen".to_owned()));
        };
        let elapsed = now.saturating_sub(*started_at).as_secs_f64();
        match evaluator.input(input, elapsed) {
            Some(outcome) => self.complete_qte(outcome.success),
            None => Ok(()),
        }
    }

    /// Resolves the QTE on screen with an outcome decided by the host.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::StaleTicket` for a superseded QTE,
    /// `StoryError::Validation` if no QTE is on screen, and any error from
    /// entering the selected branch.
    pub fn resolve_qte(&mut self, ticket: Ticket, success: bool) -> Result<(), StoryError> {
        self.check_ticket(ticket)?;
        if !matches!(self.pending, Some(Pending::Qte { .. })) {
            return Err(StoryError::Validation("no QTE is on screen".to_owned()));
        }
        self.complete_qte(success)
    }

    /// Advances time-based work: fires due timers, then advances the QTE on
    /// screen and refreshes its progress.
    ///
    /// # Errors
    ///
    /// Returns any error from entering a node selected by a QTE outcome.
    pub fn tick(&mut self) -> Result<(), StoryError> {
        let now = self.clock.now();
        for timer in self.timers.take_due(now) {
            if timer.ticket != self.ticket {
                tracing::debug!(ticket = %timer.ticket, "dropping stale timer");
                continue;
            }
            match timer.action {
                Wakeup::ShowInteraction => self.show_interaction(now)?,
                Wakeup::OfferRestart => self.offer_restart(),
            }
        }
        self.poll_qte(now)
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.state.phase()
    }

    /// Returns `true` while a run accepts progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Returns the node being played.
    #[must_use]
    pub fn current_node(&self) -> Option<&StoryNode> {
        self.state
            .current_node_id()
            .and_then(|id| self.index.get(id))
    }

    /// Returns the ticket current callbacks must carry.
    #[must_use]
    pub fn current_ticket(&self) -> Ticket {
        self.ticket
    }

    /// Returns the correlation id of the current run (nil before the first).
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns the media player's progress through the current segment.
    #[must_use]
    pub fn playback_progress(&self) -> f32 {
        self.playback.progress()
    }

    /// Returns when the next timer is due on the engine clock, so a host can
    /// sleep until then instead of ticking every frame.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Returns the loaded document.
    #[must_use]
    pub fn document(&self) -> &StoryDocument {
        &self.document
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the playback port.
    #[must_use]
    pub fn playback(&self) -> &P {
        &self.playback
    }

    /// Returns the playback port mutably.
    pub fn playback_mut(&mut self) -> &mut P {
        &mut self.playback
    }

    /// Returns the interaction port.
    #[must_use]
    pub fn interaction(&self) -> &U {
        &self.interaction
    }

    /// Returns the interaction port mutably.
    pub fn interaction_mut(&mut self) -> &mut U {
        &mut self.interaction
    }

    /// Removes and returns every event recorded since the last call.
    pub fn take_events(&mut self) -> Vec<StoryEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn state(&self) -> &RunState {
        &self.state
    }

    pub(crate) fn pending(&self) -> Option<&Pending> {
        self.pending.as_ref()
    }

    fn current_node_id(&self) -> Option<&str> {
        self.state.current_node_id()
    }

    /// Invalidates every outstanding ticket and drops pending work.
    fn open_generation(&mut self) {
        self.ticket = Ticket::first(self.ticket.generation.next());
        self.timers.cancel_all();
        self.pending = None;
    }

    fn check_ticket(&self, ticket: Ticket) -> Result<(), StoryError> {
        if ticket == self.ticket {
            Ok(())
        } else {
            tracing::warn!(
                received = %ticket,
                current = %self.ticket,
                "ignoring stale callback"
            );
            Err(StoryError::StaleTicket(ticket))
        }
    }

    fn record(&mut self, kind: StoryEventKind) {
        self.events.push(StoryEvent {
            run_id: self.run_id,
            ticket: self.ticket,
            at: self.clock.now(),
            kind,
        });
    }

    fn enter_node(&mut self, node_id: &str) -> Result<(), StoryError> {
        self.ticket = self.ticket.next_step();
        self.timers.cancel_all();
        self.pending = None;

        let media = match self.index.lookup(node_id) {
            Ok(node) => node.media().map(str::to_owned),
            Err(e) => {
                tracing::warn!(node_id, "node not found, run is inert until restarted");
                self.state.enter_inert();
                self.record(StoryEventKind::ReferenceMissing {
                    node_id: node_id.to_owned(),
                });
                return Err(e);
            }
        };
        let media_url = media.map(|file| {
            self.document
                .meta
                .media_url(&file, &self.config.local_media_dir)
        });

        self.state.enter_node(node_id)?;
        tracing::debug!(node_id, media_url = ?media_url, "playing node");
        self.record(StoryEventKind::NodeEntered {
            node_id: node_id.to_owned(),
            media_url: media_url.clone(),
        });
        self.interaction.hide_all();

        let Some(url) = media_url else {
            self.media_finished();
            return Ok(());
        };
        if let Err(e) = self.playback.play(&url, self.ticket) {
            tracing::error!(node_id, media_url = %url, error = %e, "failed to open media");
            self.record(StoryEventKind::PlaybackFailed {
                node_id: node_id.to_owned(),
                message: e.to_string(),
            });
            return Err(e);
        }
        Ok(())
    }

    fn media_finished(&mut self) {
        let node_id = self.current_node_id().unwrap_or_default().to_owned();
        tracing::debug!(node_id = %node_id, "media finished");
        self.record(StoryEventKind::MediaFinished { node_id });
        let now = self.clock.now();
        self.timers.schedule_after(
            now,
            self.config.interaction_delay,
            self.ticket,
            Wakeup::ShowInteraction,
        );
    }

    fn show_interaction(&mut self, now: Duration) -> Result<(), StoryError> {
        if !self.state.is_active() {
            return Ok(());
        }
        let Some(node) = self.current_node().cloned() else {
            return Ok(());
        };
        self.state.await_interaction()?;

        if !node.choices.is_empty() {
            if node.qte.is_some() {
                tracing::debug!(node_id = %node.id, "node has choices and a QTE, showing choices");
            }
            self.record(StoryEventKind::ChoicesPresented {
                node_id: node.id.clone(),
                labels: node.choices.iter().map(|c| c.label.clone()).collect(),
            });
            self.interaction
                .present_choices(&node.prompt, &node.choices, self.ticket);
            self.pending = Some(Pending::Choices);
            return Ok(());
        }

        let Some(spec) = &node.qte else {
            tracing::info!(node_id = %node.id, "node has no interaction");
            self.finish();
            return Ok(());
        };

        let evaluator = QteEvaluator::new(spec);
        if evaluator.is_rejected() {
            return self.complete_qte(false);
        }
        self.record(StoryEventKind::QtePresented {
            node_id: node.id.clone(),
            kind: spec.kind.clone(),
        });
        self.interaction
            .present_qte(spec, &evaluator.prompt(), self.ticket);
        self.pending = Some(Pending::Qte {
            evaluator,
            started_at: now,
        });
        Ok(())
    }

    fn poll_qte(&mut self, now: Duration) -> Result<(), StoryError> {
        let Some(Pending::Qte {
            evaluator,
            started_at,
        }) = &mut self.pending
        else {
            return Ok(());
        };
        let elapsed = now.saturating_sub(*started_at).as_secs_f64();
        if let Some(outcome) = evaluator.tick(elapsed) {
            return self.complete_qte(outcome.success);
        }
        let progress = evaluator.progress(elapsed);
        let prompt = evaluator.prompt();
        self.interaction.update_qte(progress, &prompt);
        Ok(())
    }

    fn complete_qte(&mut self, success: bool) -> Result<(), StoryError> {
        self.pending = None;
        let Some(node) = self.current_node() else {
            return Ok(());
        };
        let node_id = node.id.clone();
        let next = node
            .qte
            .as_ref()
            .and_then(|qte| qte.next_for(success))
            .map(str::to_owned);

        tracing::info!(node_id = %node_id, success, next = ?next, "QTE resolved");
        self.record(StoryEventKind::QteResolved {
            node_id,
            success,
            next_node_id: next.clone(),
        });

        match next {
            Some(next) => self.enter_node(&next),
            None => {
                tracing::warn!("QTE branch has no target, finishing run");
                self.finish();
                Ok(())
            }
        }
    }

    fn finish(&mut self) {
        self.pending = None;
        self.state.finish();
        self.interaction.hide_all();
        tracing::info!(run_id = %self.run_id, "run finished");
        self.record(StoryEventKind::RunFinished {
            node_id: self.current_node_id().map(str::to_owned),
        });
        let now = self.clock.now();
        self.timers.schedule_after(
            now,
            self.config.restart_delay,
            self.ticket,
            Wakeup::OfferRestart,
        );
    }

    fn offer_restart(&mut self) {
        if self.state.phase() != RunPhase::Finished {
            return;
        }
        let choices = [Choice::new(
            self.config.restart_label.clone(),
            self.document.meta.start_node_id.clone(),
        )];
        self.record(StoryEventKind::RestartOffered);
        self.interaction
            .present_choices(&self.config.finished_prompt, &choices, self.ticket);
        self.pending = Some(Pending::RestartOffer);
    }
}
