//! Правила владения и ролей для изменения постов, комментариев и блокировок.

use super::error::DomainError;
use super::post::{Comment, Post};
use super::user::{Role, User};

/// Вызывающий пользователь, как он записан в токене сессии.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Actor {
    pub(crate) user_id: i64,
    pub(crate) role: Role,
}

impl Actor {
    pub(crate) fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Редактировать пост может только владелец, модератор тоже нет.
pub(crate) fn ensure_can_update_post(actor: Actor, post: &Post) -> Result<(), DomainError> {
    if post.owner_id == actor.user_id {
        return Ok(());
    }
    Err(DomainError::NotAuthorized)
}

pub(crate) fn ensure_can_delete_post(actor: Actor, post: &Post) -> Result<(), DomainError> {
    if post.owner_id == actor.user_id || actor.role.is_moderator() {
        return Ok(());
    }
    Err(DomainError::NotAuthorized)
}

pub(crate) fn ensure_can_delete_comment(actor: Actor, comment: &Comment) -> Result<(), DomainError> {
    if comment.owner_id == actor.user_id || actor.role.is_moderator() {
        return Ok(());
    }
    Err(DomainError::NotAuthorized)
}

pub(crate) fn ensure_moderator(actor: Actor) -> Result<(), DomainError> {
    if actor.role.is_moderator() {
        return Ok(());
    }
    Err(DomainError::NotAuthorized)
}

pub(crate) fn ensure_can_block(actor: Actor, target: &User) -> Result<(), DomainError> {
    ensure_moderator(actor)?;
    if target.role.is_moderator() {
        return Err(DomainError::CannotBlockModerator);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::post::Media;

    const OWNER: i64 = 10;
    const STRANGER: i64 = 20;
    const MODERATOR: i64 = 30;

    #[test]
    fn only_owner_updates_post() {
        let post = sample_post();

        assert!(ensure_can_update_post(Actor::new(OWNER, Role::Member), &post).is_ok());
        assert!(matches!(
            ensure_can_update_post(Actor::new(MODERATOR, Role::Moderator), &post),
            Err(DomainError::NotAuthorized)
        ));
        assert!(matches!(
            ensure_can_update_post(Actor::new(STRANGER, Role::Member), &post),
            Err(DomainError::NotAuthorized)
        ));
    }

    #[test]
    fn owner_or_moderator_deletes_post() {
        let post = sample_post();

        assert!(ensure_can_delete_post(Actor::new(OWNER, Role::Member), &post).is_ok());
        assert!(ensure_can_delete_post(Actor::new(MODERATOR, Role::Moderator), &post).is_ok());
        assert!(matches!(
            ensure_can_delete_post(Actor::new(STRANGER, Role::Member), &post),
            Err(DomainError::NotAuthorized)
        ));
    }

    #[test]
    fn owner_or_moderator_deletes_comment() {
        let comment = Comment {
            id: 1,
            text: "nice".to_string(),
            owner_id: STRANGER,
            created_at: Utc::now(),
        };

        assert!(ensure_can_delete_comment(Actor::new(STRANGER, Role::Member), &comment).is_ok());
        assert!(
            ensure_can_delete_comment(Actor::new(MODERATOR, Role::Moderator), &comment).is_ok()
        );
        // владелец поста не автор комментария
        assert!(matches!(
            ensure_can_delete_comment(Actor::new(OWNER, Role::Member), &comment),
            Err(DomainError::NotAuthorized)
        ));
    }

    #[test]
    fn block_requires_moderator_and_member_target() {
        let member = sample_user(STRANGER, Role::Member);
        let moderator = sample_user(MODERATOR, Role::Moderator);

        assert!(ensure_can_block(Actor::new(MODERATOR, Role::Moderator), &member).is_ok());
        assert!(matches!(
            ensure_can_block(Actor::new(OWNER, Role::Member), &member),
            Err(DomainError::NotAuthorized)
        ));
        assert!(matches!(
            ensure_can_block(Actor::new(MODERATOR, Role::Moderator), &moderator),
            Err(DomainError::CannotBlockModerator)
        ));
    }

    fn sample_post() -> Post {
        let now = Utc::now();
        Post::new(
            1,
            OWNER,
            "Sunset",
            Media {
                id: "m1".to_string(),
                url: "/uploads/m1.png".to_string(),
            },
            vec![],
            0,
            vec![],
            0,
            now,
            now,
        )
        .expect("sample post must be valid")
    }

    fn sample_user(id: i64, role: Role) -> User {
        User::new(id, "user", format!("u{id}@example.com"), role, Utc::now())
            .expect("sample user must be valid")
    }
}
