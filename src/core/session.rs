/// The logged-in user a scheduler works on behalf of.
///
/// Passed explicitly at construction so every read and write of persisted
/// reminders is namespaced by `user_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Session {
            user_id: user_id.into(),
        }
    }
}
