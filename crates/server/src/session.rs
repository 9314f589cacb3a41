//! The signed-in user context passed into every operation.

use auth::AuthUser;
use records::{OwnerId, Profile};

/// Who is acting, and their profile as of sign-in or the last profile edit.
///
/// Holding a `Session` is what makes a caller authenticated; operations that
/// take one cannot be reached without signing in first.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: AuthUser,
    pub profile: Option<Profile>,
}

impl Session {
    pub fn new(user: AuthUser, profile: Option<Profile>) -> Self {
        Self { user, profile }
    }

    /// Owner id every record-store call is scoped by.
    pub fn owner_id(&self) -> OwnerId {
        self.user.id
    }
}
