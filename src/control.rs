//! Shared default session management
//!
//! Exports that are not handed an explicit driver borrow a process-wide
//! session instead: created lazily on first use, reused afterwards, and
//! released on `cleanup`. The session survives failed exports; only
//! `cleanup` (or process exit) tears down the browser.

use crate::cdp::CdpSession;
use crate::{Driver, Error, Result, SessionConfig};
use std::sync::{Mutex, OnceLock};

pub struct SessionControl {
    slot: Mutex<Option<CdpSession>>,
}

static CONTROL: OnceLock<SessionControl> = OnceLock::new();

/// The process-wide session control
pub fn session_control() -> &'static SessionControl {
    CONTROL.get_or_init(|| SessionControl {
        slot: Mutex::new(None),
    })
}

impl SessionControl {
    /// Run `f` against the shared session, creating it on first use
    pub fn with_session<T>(&self, f: impl FnOnce(&mut dyn Driver) -> Result<T>) -> Result<T> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| Error::Other("shared session lock poisoned".to_string()))?;

        if let Some(session) = slot.as_mut() {
            return f(session);
        }

        let mut session = CdpSession::new(SessionConfig::default())?;
        let result = f(&mut session);
        // keep the session for reuse even when this export failed
        *slot = Some(session);
        result
    }

    /// Close and drop the shared session; the next use recreates it
    pub fn cleanup(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            if let Some(mut session) = slot.take() {
                let _ = session.close();
            }
        }
    }
}
