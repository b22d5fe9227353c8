use bevy::prelude::*;

/// Identity of one AR session period. Ids are monotonic and never reused,
/// so a resolution carrying an old id can always be told apart from the
/// currently live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Rebuild an identity from its wire representation.
    pub fn from_value(value: u64) -> Self {
        Self(value)
    }
}

/// Notification from the XR host that an AR session has started.
#[derive(Event, Debug, Default)]
pub struct XrSessionStarted;

/// Notification from the XR host that the AR session has ended.
#[derive(Event, Debug, Default)]
pub struct XrSessionEnded;

/// Resource tracking the currently live AR session, if any.
///
/// Exactly one session is live at a time. The mode coordinator calls
/// `begin`/`end` on the matching host notifications; everything else only
/// reads the current id to validate asynchronous resolutions.
#[derive(Resource, Default)]
pub struct XrSessionState {
    current: Option<SessionId>,
    next_id: u64,
}

impl XrSessionState {
    /// Open a new session period and return its fresh identity.
    pub fn begin(&mut self) -> SessionId {
        self.next_id += 1;
        let id = SessionId(self.next_id);
        self.current = Some(id);
        id
    }

    /// Close the current session period. Idempotent.
    pub fn end(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<SessionId> {
        self.current
    }

    /// Whether the given identity still names the live session.
    pub fn is_live(&self, id: SessionId) -> bool {
        self.current == Some(id)
    }
}
