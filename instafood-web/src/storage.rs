use gloo_storage::{LocalStorage, Storage};
use instafood_client::{
    api::{AuthToken, UserId},
    SessionInfo, SessionStore, KEY_FULL_NAME, KEY_PROFILE_IMAGE, KEY_TOKEN, KEY_USER_ID,
};

/// Session kept in the browser's local storage
///
/// Values are stored as bare strings under one key each, so that sessions
/// opened by other tabs or older versions of the site stay readable.
pub struct LocalStore;

fn get(key: &str) -> Option<String> {
    match LocalStorage::raw().get_item(key) {
        Ok(v) => v,
        Err(err) => {
            tracing::error!(?err, key, "failed reading from local storage");
            None
        }
    }
}

fn set(key: &str, value: &str) {
    if let Err(err) = LocalStorage::raw().set_item(key, value) {
        tracing::error!(?err, key, "failed saving to local storage");
    }
}

impl SessionStore for LocalStore {
    fn load(&self) -> Option<SessionInfo> {
        Some(SessionInfo {
            token: AuthToken(get(KEY_TOKEN)?),
            user_id: UserId(get(KEY_USER_ID)?),
            full_name: get(KEY_FULL_NAME).unwrap_or_default(),
            profile_image: get(KEY_PROFILE_IMAGE).filter(|i| !i.is_empty()),
        })
    }

    fn save(&self, info: &SessionInfo) {
        set(KEY_TOKEN, &info.token.0);
        set(KEY_USER_ID, &info.user_id.0);
        set(KEY_FULL_NAME, &info.full_name);
        match &info.profile_image {
            Some(image) => set(KEY_PROFILE_IMAGE, image),
            None => LocalStorage::delete(KEY_PROFILE_IMAGE),
        }
    }

    fn clear(&self) {
        for key in [KEY_TOKEN, KEY_USER_ID, KEY_FULL_NAME, KEY_PROFILE_IMAGE] {
            LocalStorage::delete(key);
        }
    }
}
