use axum_extra::extract::cookie::{Cookie, SameSite};

pub(crate) const SESSION_COOKIE: &str = "token";

/// Параметры cookie `token`, выдаваемой при регистрации и входе.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionConfig {
    pub(crate) secure: bool,
    pub(crate) ttl_seconds: i64,
}

pub(crate) fn session_cookie(config: SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.ttl_seconds))
        .build()
}

/// Пустая просроченная cookie `token`: браузер удаляет сессию.
pub(crate) fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_carries_security_attributes() {
        let cookie = session_cookie(
            SessionConfig {
                secure: true,
                ttl_seconds: 21600,
            },
            "abc".to_string(),
        );

        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(21600)));
    }

    #[test]
    fn removal_cookie_is_expired_and_empty() {
        let cookie = removal_cookie();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.path(), Some("/"));
    }
}
