use imfo_booking::CurrentUser;

/// Signed-in user for a request, if any.
///
/// Inserted by the user-context middleware; every route can read it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserContext {
    user: Option<CurrentUser>,
}

impl UserContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: CurrentUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    pub fn into_user(self) -> Option<CurrentUser> {
        self.user
    }
}
