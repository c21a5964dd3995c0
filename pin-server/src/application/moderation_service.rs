use std::sync::Arc;

use tracing::info;

use crate::data::block_repository::BlockRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::access::{Actor, ensure_can_block, ensure_moderator};
use crate::domain::block::BlockEntry;
use crate::domain::error::DomainError;
use crate::domain::user::{User, normalize_email};

pub(crate) struct ModerationService {
    users: Arc<dyn UserRepository>,
    blocks: Arc<dyn BlockRepository>,
}

impl ModerationService {
    pub(crate) fn new(users: Arc<dyn UserRepository>, blocks: Arc<dyn BlockRepository>) -> Self {
        Self { users, blocks }
    }

    pub(crate) async fn ensure_not_blocked(&self, user_id: i64) -> Result<(), DomainError> {
        if self.blocks.is_blocked(user_id).await? {
            return Err(DomainError::UserBlocked);
        }
        Ok(())
    }

    pub(crate) async fn block(&self, actor: Actor, email: &str) -> Result<BlockEntry, DomainError> {
        ensure_moderator(actor)?;
        let target = self.find_target(email).await?;
        ensure_can_block(actor, &target)?;

        let entry = self.blocks.block(target.id, actor.user_id).await?;
        info!(
            moderator_id = actor.user_id,
            user_id = target.id,
            "user blocked"
        );
        Ok(entry)
    }

    pub(crate) async fn unblock(&self, actor: Actor, email: &str) -> Result<User, DomainError> {
        ensure_moderator(actor)?;
        let target = self.find_target(email).await?;

        if !self.blocks.unblock(target.id).await? {
            return Err(DomainError::NotFound("User is not blocked".to_string()));
        }
        info!(
            moderator_id = actor.user_id,
            user_id = target.id,
            "user unblocked"
        );
        Ok(target)
    }

    pub(crate) async fn list_blocked(&self, actor: Actor) -> Result<Vec<BlockEntry>, DomainError> {
        ensure_moderator(actor)?;
        self.blocks.list_blocked().await
    }

    async fn find_target(&self, email: &str) -> Result<User, DomainError> {
        let email = normalize_email(email)?;
        self.users
            .find_by_email(&email)
            .await?
            .map(|creds| creds.user)
            .ok_or_else(|| DomainError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::ModerationService;
    use crate::data::repositories::memory::MemoryStore;
    use crate::data::user_repository::{NewUser, UserRepository};
    use crate::domain::access::Actor;
    use crate::domain::error::DomainError;
    use crate::domain::user::{Role, User};

    async fn seed_user(store: &MemoryStore, email: &str, role: Role) -> User {
        store
            .create_user(NewUser {
                name: "user".to_string(),
                email: email.to_string(),
                password_hash: "hash".to_string(),
                role,
            })
            .await
            .expect("seed user")
    }

    fn setup() -> (ModerationService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (ModerationService::new(store.clone(), store.clone()), store)
    }

    #[tokio::test]
    async fn moderator_blocks_and_unblocks_member() {
        let (service, store) = setup();
        let moderator = seed_user(&store, "m@x.com", Role::Moderator).await;
        let member = seed_user(&store, "b@x.com", Role::Member).await;
        let actor = Actor::new(moderator.id, moderator.role);

        let entry = service
            .block(actor, " B@X.com ")
            .await
            .expect("block must succeed");
        assert_eq!(entry.user_id, member.id);
        assert_eq!(entry.blocked_by, moderator.id);

        let err = service
            .ensure_not_blocked(member.id)
            .await
            .expect_err("member must be blocked");
        assert!(matches!(err, DomainError::UserBlocked));

        service
            .unblock(actor, "b@x.com")
            .await
            .expect("unblock must succeed");
        service
            .ensure_not_blocked(member.id)
            .await
            .expect("member must be free again");
    }

    #[tokio::test]
    async fn block_is_unique_per_user() {
        let (service, store) = setup();
        let moderator = seed_user(&store, "m@x.com", Role::Moderator).await;
        seed_user(&store, "b@x.com", Role::Member).await;
        let actor = Actor::new(moderator.id, moderator.role);

        service.block(actor, "b@x.com").await.expect("first block");
        let err = service
            .block(actor, "b@x.com")
            .await
            .expect_err("second block must fail");
        assert!(matches!(err, DomainError::AlreadyExists(_)));
        assert_eq!(
            service
                .list_blocked(actor)
                .await
                .expect("list must succeed")
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn member_cannot_block() {
        let (service, store) = setup();
        let member = seed_user(&store, "a@x.com", Role::Member).await;
        seed_user(&store, "b@x.com", Role::Member).await;

        let err = service
            .block(Actor::new(member.id, member.role), "b@x.com")
            .await
            .expect_err("member must not block");
        assert!(matches!(err, DomainError::NotAuthorized));
    }

    #[tokio::test]
    async fn moderator_cannot_be_blocked() {
        let (service, store) = setup();
        let moderator = seed_user(&store, "m@x.com", Role::Moderator).await;
        seed_user(&store, "m2@x.com", Role::Moderator).await;

        let err = service
            .block(Actor::new(moderator.id, moderator.role), "m2@x.com")
            .await
            .expect_err("moderator must not be blocked");
        assert!(matches!(err, DomainError::CannotBlockModerator));
    }

    #[tokio::test]
    async fn unknown_or_unblocked_targets_are_not_found() {
        let (service, store) = setup();
        let moderator = seed_user(&store, "m@x.com", Role::Moderator).await;
        seed_user(&store, "b@x.com", Role::Member).await;
        let actor = Actor::new(moderator.id, moderator.role);

        let missing = service
            .block(actor, "nobody@x.com")
            .await
            .expect_err("unknown user");
        assert!(matches!(missing, DomainError::NotFound(_)));

        let not_blocked = service
            .unblock(actor, "b@x.com")
            .await
            .expect_err("user is not blocked");
        assert!(matches!(not_blocked, DomainError::NotFound(_)));
    }
}
