use async_trait::async_trait;

use crate::domain::block::BlockEntry;
use crate::domain::error::DomainError;

#[async_trait]
pub(crate) trait BlockRepository: Send + Sync {
    async fn is_blocked(&self, user_id: i64) -> Result<bool, DomainError>;
    /// `AlreadyExists`, если пользователь уже заблокирован.
    async fn block(&self, user_id: i64, blocked_by: i64) -> Result<BlockEntry, DomainError>;
    /// `false`, если удалять было нечего.
    async fn unblock(&self, user_id: i64) -> Result<bool, DomainError>;
    async fn list_blocked(&self) -> Result<Vec<BlockEntry>, DomainError>;
}
