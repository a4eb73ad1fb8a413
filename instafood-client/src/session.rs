use std::cell::RefCell;

use crate::api::{AuthToken, LoginResponse, UserId};

pub const KEY_TOKEN: &str = "token";
pub const KEY_USER_ID: &str = "userId";
pub const KEY_FULL_NAME: &str = "fullName";
pub const KEY_PROFILE_IMAGE: &str = "profileImage";

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SessionInfo {
    pub token: AuthToken,
    pub user_id: UserId,
    pub full_name: String,
    pub profile_image: Option<String>,
}

impl From<LoginResponse> for SessionInfo {
    fn from(r: LoginResponse) -> SessionInfo {
        SessionInfo {
            token: r.token,
            user_id: r.user_id,
            full_name: r.full_name,
            profile_image: r.profile_image.filter(|i| !i.is_empty()),
        }
    }
}

/// Where the session survives page reloads
pub trait SessionStore {
    fn load(&self) -> Option<SessionInfo>;
    fn save(&self, info: &SessionInfo);
    fn clear(&self);
}

/// Store that forgets everything with the process
#[derive(Debug, Default)]
pub struct MemoryStore(RefCell<Option<SessionInfo>>);

impl SessionStore for MemoryStore {
    fn load(&self) -> Option<SessionInfo> {
        self.0.borrow().clone()
    }

    fn save(&self, info: &SessionInfo) {
        *self.0.borrow_mut() = Some(info.clone());
    }

    fn clear(&self) {
        *self.0.borrow_mut() = None;
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn Fn(Option<&SessionInfo>)>;

/// The logged-in user, if any, for everything that needs to know
///
/// Set at login, cleared at logout. Subscribers are called synchronously, in
/// subscription order, after every change.
pub struct Session {
    info: Option<SessionInfo>,
    store: Box<dyn SessionStore>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Session {
    /// Restore the session saved in `store`, if any
    pub fn restore(store: Box<dyn SessionStore>) -> Session {
        let info = store.load().filter(|i| !i.token.is_empty());
        tracing::debug!(logged_in = info.is_some(), "restored session");
        Session {
            info,
            store,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn info(&self) -> Option<&SessionInfo> {
        self.info.as_ref()
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.info.as_ref().map(|i| &i.token)
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.info.as_ref().map(|i| &i.user_id)
    }

    pub fn is_logged_in(&self) -> bool {
        self.info.is_some()
    }

    pub fn login(&mut self, info: SessionInfo) {
        tracing::info!(user = ?info.user_id, "logged in");
        self.store.save(&info);
        self.info = Some(info);
        self.notify();
    }

    pub fn logout(&mut self) {
        if self.info.take().is_some() {
            tracing::info!("logged out");
        }
        self.store.clear();
        self.notify();
    }

    /// Record a change of display name or avatar; no-op when logged out
    pub fn update_profile(&mut self, full_name: String, profile_image: Option<String>) {
        let info = match &mut self.info {
            Some(info) => info,
            None => return,
        };
        info.full_name = full_name;
        info.profile_image = profile_image;
        self.store.save(info);
        self.notify();
    }

    pub fn subscribe<F>(&mut self, f: F) -> SubscriptionId
    where
        F: 'static + Fn(Option<&SessionInfo>),
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(s, _)| *s != id);
    }

    fn notify(&self) {
        for (_, f) in &self.subscribers {
            f(self.info.as_ref());
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("info", &self.info)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
