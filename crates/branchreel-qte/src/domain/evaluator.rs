//! The time-driven QTE evaluator.

use branchreel_content::domain::document::{QteKind, QteSpec};
use serde::{Deserialize, Serialize};

use super::input::{QteInput, QtePrompt};

/// Fraction of the window after which a button press counts.
const GREEN_ZONE_START: f64 = 0.8;
/// Inclusive bounds of the timing window, as fractions of the duration.
const TIMING_WINDOW: (f64, f64) = (0.3, 0.7);

const BUTTON_INSTRUCTION: &str = "Press the action key when the bar is in the green zone!";
const TIMING_INSTRUCTION: &str = "Press the action key at the right moment!";

/// The verdict of a finished check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QteOutcome {
    /// Whether the player passed.
    pub success: bool,
    /// Elapsed seconds at which the verdict was reached.
    pub elapsed: f64,
}

#[derive(Debug, Clone)]
enum Mode {
    Button,
    Sequence {
        keys: Vec<String>,
        index: usize,
        slice: f64,
        slice_start: f64,
    },
    Timing {
        pressed_at: Option<f64>,
    },
    /// The check could not run and failed on construction.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Verdict {
    Pending,
    Decided(QteOutcome),
    Reported,
}

/// Decides one quick-reaction check.
///
/// Elapsed time is measured in seconds from the moment the check was
/// presented. The caller polls [`tick`](Self::tick) as time passes and calls
/// [`input`](Self::input) for every player input; both return the outcome
/// exactly once, on the call that first observes it.
///
/// * Button: a trigger at or after 80% of the duration and before the
///   deadline passes. Earlier presses are ignored.
/// * Sequence: each key gets `duration / n` seconds, starting when the
///   previous key matched. Missing a slice fails immediately.
/// * Timing: the first trigger is recorded and judged at the deadline; it
///   passes if it fell within 30%..=70% of the duration.
///
/// A non-positive duration, an empty sequence or an unrecognized kind fails
/// at once.
#[derive(Debug, Clone)]
pub struct QteEvaluator {
    kind: QteKind,
    duration: f64,
    mode: Mode,
    verdict: Verdict,
}

impl QteEvaluator {
    /// Creates an evaluator for `spec`, starting at elapsed time zero.
    #[must_use]
    pub fn new(spec: &QteSpec) -> Self {
        let duration = spec.duration_seconds;
        let mode = if duration.is_nan() || duration <= 0.0 {
            tracing::warn!(kind = %spec.kind, duration, "QTE duration is not positive, failing");
            Mode::Rejected
        } else {
            match &spec.kind {
                QteKind::Button => Mode::Button,
                QteKind::Timing => Mode::Timing { pressed_at: None },
                QteKind::Sequence if spec.key_sequence.is_empty() => {
                    tracing::warn!("sequence QTE has no keys, failing");
                    Mode::Rejected
                }
                QteKind::Sequence => {
                    #[allow(clippy::cast_precision_loss)]
                    let slice = duration / spec.key_sequence.len() as f64;
                    Mode::Sequence {
                        keys: spec.key_sequence.clone(),
                        index: 0,
                        slice,
                        slice_start: 0.0,
                    }
                }
                QteKind::Unrecognized(name) => {
                    tracing::warn!(kind = %name, "unrecognized QTE kind, failing");
                    Mode::Rejected
                }
            }
        };

        let verdict = if matches!(mode, Mode::Rejected) {
            Verdict::Decided(QteOutcome {
                success: false,
                elapsed: 0.0,
            })
        } else {
            Verdict::Pending
        };

        Self {
            kind: spec.kind.clone(),
            duration,
            mode,
            verdict,
        }
    }

    /// The kind of check being evaluated.
    #[must_use]
    pub fn kind(&self) -> &QteKind {
        &self.kind
    }

    /// Returns `true` once a verdict exists, whether or not it was reported.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.verdict != Verdict::Pending
    }

    /// Returns `true` if the check failed before it could be presented.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self.mode, Mode::Rejected)
    }

    /// Advances the clock to `elapsed` and reports the outcome if it was
    /// reached and not yet reported.
    pub fn tick(&mut self, elapsed: f64) -> Option<QteOutcome> {
        if self.verdict == Verdict::Pending {
            self.expire(elapsed);
        }
        self.report()
    }

    /// Applies `input` received at `elapsed` and reports the outcome if it
    /// was reached and not yet reported.
    ///
    /// Deadlines are checked before the input is applied, so an input that
    /// arrives after its window has closed does not count.
    pub fn input(&mut self, input: &QteInput, elapsed: f64) -> Option<QteOutcome> {
        if self.verdict == Verdict::Pending {
            self.expire(elapsed);
        }
        if self.verdict == Verdict::Pending {
            self.apply(input, elapsed);
        }
        self.report()
    }

    /// Progress through the current window, in `[0, 1]`: the whole check for
    /// button and timing, the current key's slice for sequence.
    #[must_use]
    pub fn progress(&self, elapsed: f64) -> f64 {
        let fraction = match &self.mode {
            Mode::Button | Mode::Timing { .. } => elapsed / self.duration,
            Mode::Sequence {
                slice, slice_start, ..
            } => (elapsed - slice_start) / slice,
            Mode::Rejected => 0.0,
        };
        fraction.clamp(0.0, 1.0)
    }

    /// The instruction to show the player right now.
    #[must_use]
    pub fn prompt(&self) -> QtePrompt {
        match &self.mode {
            Mode::Button => QtePrompt::text(BUTTON_INSTRUCTION),
            Mode::Timing { .. } => QtePrompt::text(TIMING_INSTRUCTION),
            Mode::Sequence { keys, index, .. } => keys
                .get(*index)
                .map_or_else(QtePrompt::default, |key| QtePrompt::press(key)),
            Mode::Rejected => QtePrompt::default(),
        }
    }

    fn expire(&mut self, elapsed: f64) {
        let failed_or_judged = match &self.mode {
            Mode::Button => (elapsed >= self.duration).then_some(false),
            Mode::Timing { pressed_at } => (elapsed >= self.duration).then(|| {
                let (low, high) = TIMING_WINDOW;
                pressed_at.is_some_and(|at| at >= self.duration * low && at <= self.duration * high)
            }),
            Mode::Sequence {
                slice, slice_start, ..
            } => (elapsed >= slice_start + slice).then_some(false),
            Mode::Rejected => None,
        };
        if let Some(success) = failed_or_judged {
            self.decide(success, elapsed);
        }
    }

    fn apply(&mut self, input: &QteInput, elapsed: f64) {
        let passed = match &mut self.mode {
            Mode::Button => input.is_trigger() && elapsed >= self.duration * GREEN_ZONE_START,
            Mode::Timing { pressed_at } => {
                if input.is_trigger() && pressed_at.is_none() {
                    *pressed_at = Some(elapsed);
                }
                false
            }
            Mode::Sequence {
                keys,
                index,
                slice_start,
                ..
            } => {
                if input.matches_key(&keys[*index]) {
                    *index += 1;
                    *slice_start = elapsed;
                }
                *index == keys.len()
            }
            Mode::Rejected => false,
        };
        if passed {
            self.decide(true, elapsed);
        }
    }

    fn decide(&mut self, success: bool, elapsed: f64) {
        tracing::debug!(kind = %self.kind, success, elapsed, "QTE decided");
        self.verdict = Verdict::Decided(QteOutcome { success, elapsed });
    }

    fn report(&mut self) -> Option<QteOutcome> {
        match self.verdict {
            Verdict::Decided(outcome) => {
                self.verdict = Verdict::Reported;
                Some(outcome)
            }
            Verdict::Pending | Verdict::Reported => None,
        }
    }
}
