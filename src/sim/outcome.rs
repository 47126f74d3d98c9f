/// Results of the two game-state operations.
/// The presentation layer reacts to these (message, sound, reset timer).

/// A round-ending condition.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Signal {
    Captured,
    Reached,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    /// Round already over; waiting for reset. Nothing changed.
    Ignored,
    /// Target out of bounds or blocking. Only facing changed.
    Blocked,
    Moved,
    Captured,
    Reached,
}

impl MoveOutcome {
    pub fn signal(self) -> Option<Signal> {
        match self {
            MoveOutcome::Captured => Some(Signal::Captured),
            MoveOutcome::Reached => Some(Signal::Reached),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickOutcome {
    Quiet,
    Captured,
}

impl TickOutcome {
    pub fn signal(self) -> Option<Signal> {
        match self {
            TickOutcome::Captured => Some(Signal::Captured),
            TickOutcome::Quiet => None,
        }
    }
}
