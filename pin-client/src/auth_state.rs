//! Состояние сессии на стороне клиента.
//!
//! Переходы описаны событиями [`AuthEvent`]; [`AuthState::apply`] возвращает
//! новое состояние, не трогая сеть.

use crate::models::CurrentUser;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Событие, меняющее состояние сессии.
pub enum AuthEvent {
    /// Регистрация прошла успешно.
    RegisterSuccess,
    /// Вход прошёл успешно.
    LoginSuccess,
    /// Загружен текущий пользователь.
    UserLoaded(CurrentUser),
    /// Не удалось загрузить пользователя.
    AuthError,
    /// Регистрация отклонена сервером.
    RegisterFail(String),
    /// Вход отклонён сервером.
    LoginFail(String),
    /// Выход из системы.
    Logout,
    /// Сбросить сообщение об ошибке.
    ClearErrors,
    /// Токен прошёл проверку.
    ValidSuccess,
    /// Токен не прошёл проверку.
    ValidFail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Снимок состояния сессии.
pub struct AuthState {
    /// Есть ли активная сессия.
    pub is_authenticated: bool,
    /// Текущий пользователь, если загружен.
    pub user: Option<CurrentUser>,
    /// Последняя ошибка входа или регистрации.
    pub error: Option<String>,
    /// Результат последней проверки токена.
    pub token_valid: bool,
}

impl AuthState {
    /// Применяет событие и возвращает новое состояние.
    pub fn apply(self, event: AuthEvent) -> Self {
        match event {
            AuthEvent::RegisterSuccess | AuthEvent::LoginSuccess => Self {
                is_authenticated: true,
                error: None,
                ..self
            },
            AuthEvent::UserLoaded(user) => Self {
                is_authenticated: true,
                user: Some(user),
                ..self
            },
            AuthEvent::AuthError | AuthEvent::Logout => Self::default(),
            AuthEvent::RegisterFail(msg) | AuthEvent::LoginFail(msg) => Self {
                error: Some(msg),
                ..Self::default()
            },
            AuthEvent::ClearErrors => Self {
                error: None,
                ..self
            },
            AuthEvent::ValidSuccess => Self {
                token_valid: true,
                ..self
            },
            AuthEvent::ValidFail => Self {
                token_valid: false,
                ..self
            },
        }
    }
}
