//! Authentication state handed explicitly to whatever talks to the backend.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name under which the session is persisted.
pub const STORE_NAME: &str = "sagenex-auth";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub token: Option<String>,
    pub is_logged_in: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    state: SessionState,
    version: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn Fn(&SessionState)>;

#[derive(Default)]
pub struct Session {
    state: SessionState,
    rehydrated: bool,
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn token(&self) -> Option<&str> {
        self.state.token.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.is_logged_in
    }

    /// True once [`Session::restore`] has run, whether or not it found
    /// anything on disk.
    pub fn is_rehydrated(&self) -> bool {
        self.rehydrated
    }

    pub fn login(&mut self, token: impl Into<String>) {
        self.state = SessionState {
            token: Some(token.into()),
            is_logged_in: true,
        };
        log::info!("session logged in");
        self.notify();
    }

    pub fn logout(&mut self) {
        self.state = SessionState::default();
        log::info!("session logged out");
        self.notify();
    }

    pub fn subscribe(&mut self, observer: impl Fn(&SessionState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let persisted = PersistedSession {
            state: self.state.clone(),
            version: 0,
        };
        std::fs::write(path, serde_json::to_string(&persisted)?)?;
        Ok(())
    }

    /// Loads a previously saved session. A missing file leaves the session
    /// logged out; an unreadable one is an error. Observers are notified in
    /// both successful cases.
    pub fn restore(&mut self, path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let persisted: PersistedSession = serde_json::from_str(&contents)?;
            self.state = persisted.state;
            // a token without the flag (or the reverse) is not a usable session
            if self.state.token.is_none() {
                self.state.is_logged_in = false;
            }
        } else {
            log::debug!("no persisted session at {}", path.display());
        }
        self.rehydrated = true;
        self.notify();
        Ok(())
    }

    fn notify(&self) {
        for (_, observer) in &self.observers {
            observer(&self.state);
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("is_logged_in", &self.state.is_logged_in)
            .field("has_token", &self.state.token.is_some())
            .field("rehydrated", &self.rehydrated)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn login_and_logout_notify_subscribers() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut session = Session::new();
        let sink = Rc::clone(&seen);
        let id = session.subscribe(move |state| sink.borrow_mut().push(state.is_logged_in));

        session.login("abc");
        assert_eq!(session.token(), Some("abc"));
        assert!(session.is_logged_in());
        session.logout();
        assert_eq!(session.token(), None);
        assert_eq!(*seen.borrow(), vec![true, false]);

        assert!(session.unsubscribe(id));
        assert!(!session.unsubscribe(id));
        session.login("again");
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn save_and_restore_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(format!("{STORE_NAME}.json"));
        let mut session = Session::new();
        session.login("persist-me");
        session.save(&path).expect("save");

        let mut restored = Session::new();
        assert!(!restored.is_rehydrated());
        restored.restore(&path).expect("restore");
        assert!(restored.is_rehydrated());
        assert_eq!(restored.token(), Some("persist-me"));
        assert!(restored.is_logged_in());
    }

    #[test]
    fn restore_without_file_is_logged_out_but_rehydrated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = Session::new();
        session.restore(&dir.path().join("missing.json")).expect("restore");
        assert!(session.is_rehydrated());
        assert!(!session.is_logged_in());
    }

    #[test]
    fn restore_rejects_garbage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").expect("write");
        let mut session = Session::new();
        assert!(session.restore(&path).is_err());
        assert!(!session.is_rehydrated());
    }

    #[test]
    fn flag_without_token_is_not_logged_in() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("odd.json");
        std::fs::write(&path, r#"{"state":{"token":null,"isLoggedIn":true},"version":0}"#)
            .expect("write");
        let mut session = Session::new();
        session.restore(&path).expect("restore");
        assert!(!session.is_logged_in());
    }
}
