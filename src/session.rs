use crate::error::SqlBridgeError;

/// Isolation level requested for a preparation session.
///
/// Statement rendering never executes the rendered SQL, so the weakest level
/// is the default, matching the read-intent nature of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    #[default]
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

/// Options a [`SessionSource`] opens sessions with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub isolation: IsolationLevel,
    pub read_only: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            isolation: IsolationLevel::default(),
            read_only: true,
        }
    }
}

/// An open, read-intent session a statement renders itself against.
///
/// The session accumulates rendering state: generators draw ordinals from
/// [`next_ordinal`](Self::next_ordinal) for unique aliases and similar
/// generated names. [`reset`](Self::reset) purges that state; the reused
/// provider strategy calls it after every body invocation so long-lived
/// sessions do not drift.
///
/// The session is an explicit parameter threaded through `render` calls,
/// never ambient state, so one session can never be shared across workers by
/// accident.
pub trait PreparationSession {
    /// Next unique ordinal for generated names within this session.
    fn next_ordinal(&mut self) -> u64;

    /// Purge accumulated rendering state. Logically a rollback on the
    /// session; rendering afterwards behaves as if the session were fresh.
    ///
    /// # Errors
    /// Returns an error if the underlying session can no longer be reset.
    fn reset(&mut self) -> Result<(), SqlBridgeError>;
}

/// Factory for preparation sessions, keyed by isolation level and read
/// intent. External session-backed implementations may incur a round trip
/// per open; [`LocalSessionSource`] is free.
pub trait SessionSource {
    type Session: PreparationSession;

    /// Open a new session.
    ///
    /// # Errors
    /// Returns an error if the session cannot be opened.
    fn open_session(&self, options: &SessionOptions) -> Result<Self::Session, SqlBridgeError>;
}

/// Standard in-process session: an ordinal counter plus the options it was
/// opened with.
#[derive(Debug)]
pub struct LocalSession {
    next_ordinal: u64,
    options: SessionOptions,
}

impl LocalSession {
    #[must_use]
    pub fn new(options: SessionOptions) -> Self {
        Self {
            next_ordinal: 0,
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }
}

impl PreparationSession for LocalSession {
    fn next_ordinal(&mut self) -> u64 {
        self.next_ordinal += 1;
        self.next_ordinal
    }

    fn reset(&mut self) -> Result<(), SqlBridgeError> {
        self.next_ordinal = 0;
        Ok(())
    }
}

/// Source of [`LocalSession`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSessionSource;

impl SessionSource for LocalSessionSource {
    type Session = LocalSession;

    fn open_session(&self, options: &SessionOptions) -> Result<Self::Session, SqlBridgeError> {
        Ok(LocalSession::new(*options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_start_at_one_and_increment() {
        let mut session = LocalSession::new(SessionOptions::default());
        assert_eq!(session.next_ordinal(), 1);
        assert_eq!(session.next_ordinal(), 2);
        assert_eq!(session.next_ordinal(), 3);
    }

    #[test]
    fn reset_restores_fresh_numbering() {
        let mut session = LocalSession::new(SessionOptions::default());
        session.next_ordinal();
        session.next_ordinal();
        session.reset().unwrap();
        assert_eq!(session.next_ordinal(), 1);
    }

    #[test]
    fn default_options_are_read_intent() {
        let options = SessionOptions::default();
        assert!(options.read_only);
        assert_eq!(options.isolation, IsolationLevel::ReadUncommitted);
    }
}
