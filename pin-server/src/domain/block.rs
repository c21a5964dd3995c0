use chrono::{DateTime, Utc};

/// Блокировка, выставленная модератором; не больше одной на пользователя.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BlockEntry {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) email: String,
    pub(crate) blocked_by: i64,
    pub(crate) created_at: DateTime<Utc>,
}
