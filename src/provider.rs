use crate::error::SqlBridgeError;
use crate::session::{PreparationSession, SessionOptions, SessionSource};

/// Strategy for supplying the preparation session a statement renders
/// against.
///
/// Two standard strategies trade session-creation overhead against
/// state-accumulation risk:
/// - [`SessionPerCall`] opens a fresh session for every call; simple, no
///   shared state, one open per statement.
/// - [`ReusedSession`] opens one session up front and resets it after every
///   call; near-zero amortized cost at high call volumes.
pub trait PreparationProvider {
    /// Run `body` with a preparation session.
    ///
    /// # Errors
    /// Returns the body's error, or a session open/reset error.
    fn with_preparation_session<T>(
        &mut self,
        body: impl FnOnce(&mut dyn PreparationSession) -> Result<T, SqlBridgeError>,
    ) -> Result<T, SqlBridgeError>;
}

/// Opens a new session from the source for every call and discards it
/// afterwards. The discarded session needs no cleanup.
#[derive(Debug)]
pub struct SessionPerCall<S: SessionSource> {
    source: S,
    options: SessionOptions,
}

impl<S: SessionSource> SessionPerCall<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            options: SessionOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(source: S, options: SessionOptions) -> Self {
        Self { source, options }
    }
}

impl<S: SessionSource> PreparationProvider for SessionPerCall<S> {
    fn with_preparation_session<T>(
        &mut self,
        body: impl FnOnce(&mut dyn PreparationSession) -> Result<T, SqlBridgeError>,
    ) -> Result<T, SqlBridgeError> {
        let mut session = self.source.open_session(&self.options)?;
        body(&mut session)
    }
}

/// Reuses one session for every call, resetting it after each body
/// invocation.
///
/// The reset runs whether the body succeeded or failed; a body error wins
/// over a reset error, and a reset error after a successful body propagates
/// because the session can no longer be trusted for the next call.
///
/// Exclusive access is structural: every call takes `&mut self`, so sharing
/// one instance across concurrent workers does not compile. Hold one instance
/// per worker.
#[derive(Debug)]
pub struct ReusedSession<S: PreparationSession> {
    session: S,
}

impl<S: PreparationSession> ReusedSession<S> {
    #[must_use]
    pub fn new(session: S) -> Self {
        Self { session }
    }

    /// Open the single reusable session from a source.
    ///
    /// # Errors
    /// Returns an error if the session cannot be opened.
    pub fn from_source<Src>(source: &Src, options: &SessionOptions) -> Result<Self, SqlBridgeError>
    where
        Src: SessionSource<Session = S>,
    {
        Ok(Self {
            session: source.open_session(options)?,
        })
    }
}

impl<S: PreparationSession> PreparationProvider for ReusedSession<S> {
    fn with_preparation_session<T>(
        &mut self,
        body: impl FnOnce(&mut dyn PreparationSession) -> Result<T, SqlBridgeError>,
    ) -> Result<T, SqlBridgeError> {
        let result = body(&mut self.session);
        let reset = self.session.reset();
        match result {
            Err(e) => Err(e),
            Ok(value) => {
                reset?;
                Ok(value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{LocalSession, LocalSessionSource};

    #[test]
    fn fresh_sessions_always_start_numbering_at_one() {
        let mut provider = SessionPerCall::new(LocalSessionSource);
        for _ in 0..3 {
            let first = provider
                .with_preparation_session(|s| Ok(s.next_ordinal()))
                .unwrap();
            assert_eq!(first, 1);
        }
    }

    #[test]
    fn reused_session_resets_between_calls() {
        let mut provider = ReusedSession::new(LocalSession::new(SessionOptions::default()));
        for _ in 0..3 {
            let first = provider
                .with_preparation_session(|s| Ok(s.next_ordinal()))
                .unwrap();
            assert_eq!(first, 1);
        }
    }

    #[test]
    fn reused_session_resets_even_when_body_fails() {
        let mut provider = ReusedSession::new(LocalSession::new(SessionOptions::default()));
        let err = provider.with_preparation_session(|s| {
            s.next_ordinal();
            s.next_ordinal();
            Err::<(), _>(SqlBridgeError::DriverError("boom".into()))
        });
        assert!(matches!(err, Err(SqlBridgeError::DriverError(_))));

        // state from the failed call must not leak into the next one
        let first = provider
            .with_preparation_session(|s| Ok(s.next_ordinal()))
            .unwrap();
        assert_eq!(first, 1);
    }
}
