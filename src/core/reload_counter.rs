use crate::domain::ports::{KeyValueStore, ReloadSignal};

/// Key of the durable counter.
pub const RELOAD_KEY: &str = "RELOAD";

/// Class applied to the footer when [`should_style`] holds.
pub const ALTERNATE_STYLE_CLASS: &str = "greyBg";

const STYLE_PERIOD: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadPhase {
    Started,
    Counted,
    Decided,
}

/// How the count for this load was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Not a reload; stored value used as-is.
    Unchanged,
    Incremented,
    /// Stored value could not be parsed and was treated as 0.
    Malformed,
    /// Store unreadable: count is 0 and nothing was written.
    ReadFailed,
    /// Count advanced in memory only.
    WriteFailed,
}

pub fn should_style(count: u64) -> bool {
    count > 0 && count % STYLE_PERIOD == 0
}

fn parse_count(raw: &str) -> Option<u64> {
    serde_json::from_str::<u64>(raw.trim()).ok()
}

/// Reload count for the current load, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ReloadCounter {
    count: u64,
    outcome: ReloadOutcome,
    phase: ReloadPhase,
}

impl ReloadCounter {
    /// Reads the stored count, queries `signal` once and persists the increment on reload.
    ///
    /// Store failures never propagate: an unreadable store yields count 0, a
    /// failed write keeps the incremented count for this load only.
    pub fn start<S, R>(store: &S, signal: &R) -> Self
    where
        S: KeyValueStore + ?Sized,
        R: ReloadSignal + ?Sized,
    {
        let mut malformed = false;
        let stored = match store.get_item(RELOAD_KEY) {
            Ok(None) => 0,
            Ok(Some(raw)) => parse_count(&raw).unwrap_or_else(|| {
                tracing::warn!("Stored reload count '{}' is not a number, using 0", raw);
                malformed = true;
                0
            }),
            Err(e) => {
                tracing::warn!("Reload counter unavailable, treating count as 0: {}", e);
                return Self {
                    count: 0,
                    outcome: ReloadOutcome::ReadFailed,
                    phase: ReloadPhase::Counted,
                };
            }
        };

        let is_reload = signal.is_reload();
        tracing::debug!("Stored reload count {}, reload: {}", stored, is_reload);

        if !is_reload {
            return Self {
                count: stored,
                outcome: if malformed {
                    ReloadOutcome::Malformed
                } else {
                    ReloadOutcome::Unchanged
                },
                phase: ReloadPhase::Counted,
            };
        }

        let count = stored.saturating_add(1);
        let outcome = match store.set_item(RELOAD_KEY, &count.to_string()) {
            Ok(()) if malformed => ReloadOutcome::Malformed,
            Ok(()) => ReloadOutcome::Incremented,
            Err(e) => {
                tracing::warn!("Reload count {} was not persisted: {}", count, e);
                ReloadOutcome::WriteFailed
            }
        };

        Self {
            count,
            outcome,
            phase: ReloadPhase::Counted,
        }
    }

    pub fn current_reload_count(&self) -> u64 {
        self.count
    }

    pub fn should_apply_alternate_style(&self) -> bool {
        match self.outcome {
            ReloadOutcome::ReadFailed => false,
            _ => should_style(self.count),
        }
    }

    /// Records the style decision; nothing is persisted.
    pub fn decide(&mut self) -> bool {
        self.phase = ReloadPhase::Decided;
        self.should_apply_alternate_style()
    }

    pub fn outcome(&self) -> ReloadOutcome {
        self.outcome
    }

    pub fn phase(&self) -> ReloadPhase {
        self.phase
    }

    pub fn alternate_style_class(&self) -> Option<&'static str> {
        self.should_apply_alternate_style()
            .then_some(ALTERNATE_STYLE_CLASS)
    }
}
