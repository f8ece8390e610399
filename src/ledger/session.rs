//! Locally cached copy of the signed-in user

use chrono::{DateTime, Utc};

use crate::types::*;

/// The signed-in user and when it was last fetched from the server
///
/// The cache is only ever replaced wholesale; totals are never patched
/// locally.
#[derive(Debug, Clone, Default)]
pub struct UserCache {
    user: Option<User>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl UserCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached user, if anyone is signed in
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The cached user, or `NotSignedIn`
    pub fn require_user(&self) -> HisabResult<&User> {
        self.user.as_ref().ok_or(HisabError::NotSignedIn)
    }

    /// ID of the signed-in user
    ///
    /// A cached user without a server ID counts as not signed in.
    pub fn user_id(&self) -> HisabResult<UserId> {
        self.require_user()?.user_id.ok_or(HisabError::NotSignedIn)
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id().is_ok()
    }

    /// When the cached user was last stored
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// Overwrite the cached user with a fresh server copy
    pub fn replace(&mut self, user: User) -> &User {
        self.refreshed_at = Some(Utc::now());
        self.user.insert(user)
    }

    pub fn clear(&mut self) {
        self.user = None;
        self.refreshed_at = None;
    }
}
