use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pin_client::{
    AuthEvent, AuthState, BlockEntry, Comment, DEFAULT_SERVER, ImageFile, Like, ListPostsResponse,
    PinClient, PinClientError, Post, TokenStatus,
};

const TOKEN_FILE: &str = ".pin_token";
const SERVER_ENV: &str = "PIN_SERVER";

#[derive(Debug, Parser)]
#[command(name = "pin-cli", version, about = "CLI клиент для pin-server")]
struct Cli {
    /// Адрес сервера. По умолчанию берётся из PIN_SERVER или http://127.0.0.1:5000.
    #[arg(long, global = true)]
    server: Option<String>,

    /// Печатать ответы сервера как JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Зарегистрироваться модератором.
        #[arg(long)]
        moderator: bool,
    },
    /// Вход пользователя.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Выход: сервер очищает cookie, локальный токен удаляется.
    Logout,
    /// Текущий пользователь.
    Me,
    /// Проверка сохранённого токена.
    Check,
    /// Блокировка пользователя (только модератор).
    Block {
        #[arg(long)]
        email: String,
    },
    /// Снятие блокировки (только модератор).
    Unblock {
        #[arg(long)]
        email: String,
    },
    /// Список заблокированных пользователей (только модератор).
    Blocked,
    /// Создание поста с изображением.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Получение поста по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Обновление поста. Без `--file` изображение остаётся прежним.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Удаление поста.
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Лента постов.
    List {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        /// Только свои посты.
        #[arg(long)]
        mine: bool,
    },
    /// Поставить или снять лайк.
    Like {
        #[arg(long)]
        id: i64,
    },
    /// Добавить комментарий.
    Comment {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        text: String,
    },
    /// Удалить комментарий.
    Uncomment {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        comment_id: i64,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let server = resolve_server(cli.server, std::env::var(SERVER_ENV).ok());
    let mut client = PinClient::new(server).map_err(map_client_error)?;

    if let Some(token) = load_token().context("не удалось прочитать .pin_token")? {
        client.set_token(token);
    }

    let json = cli.json;
    match cli.command {
        Command::Register {
            name,
            email,
            password,
            moderator,
        } => {
            let result = if moderator {
                client.register_moderator(&name, &email, &password).await
            } else {
                client.register_user(&name, &email, &password).await
            };
            let state = match result {
                Ok(msg) => {
                    println!("{msg}");
                    AuthState::default().apply(AuthEvent::RegisterSuccess)
                }
                Err(err) => {
                    let msg = error_message(&err);
                    AuthState::default().apply(AuthEvent::RegisterFail(msg))
                }
            };
            finish_auth(&client, state)?;
        }
        Command::Login { email, password } => {
            let state = match client.login(&email, &password).await {
                Ok(msg) => {
                    println!("{msg}");
                    AuthState::default().apply(AuthEvent::LoginSuccess)
                }
                Err(err) => {
                    let msg = error_message(&err);
                    AuthState::default().apply(AuthEvent::LoginFail(msg))
                }
            };
            finish_auth(&client, state)?;
        }
        Command::Logout => {
            let msg = client.logout().await.map_err(map_client_error)?;
            remove_token().context("не удалось удалить токен")?;
            println!("{msg}");
        }
        Command::Me => {
            let state = match client.me().await {
                Ok(user) => AuthState::default().apply(AuthEvent::UserLoaded(user)),
                Err(err) => {
                    eprintln!("{}", error_message(&err));
                    AuthState::default().apply(AuthEvent::AuthError)
                }
            };
            let Some(user) = state.user else {
                remove_token().context("не удалось удалить токен")?;
                anyhow::bail!("сессия недействительна, выполните `pin-cli login ...`");
            };
            if json {
                print_json(&user)?;
            } else {
                println!("id: {}", user.id);
                println!("name: {}", user.name);
                println!("role: {:?}", user.role);
            }
        }
        Command::Check => {
            let status = client.check().await.map_err(map_client_error)?;
            let event = match status {
                TokenStatus::Valid => AuthEvent::ValidSuccess,
                TokenStatus::Invalid | TokenStatus::Missing => AuthEvent::ValidFail,
            };
            let state = AuthState::default().apply(event);
            println!("{}", check_text(status));
            if !state.token_valid {
                process::exit(2);
            }
        }
        Command::Block { email } => {
            let msg = client.block_user(&email).await.map_err(map_client_error)?;
            println!("{msg}: {email}");
        }
        Command::Unblock { email } => {
            let msg = client
                .unblock_user(&email)
                .await
                .map_err(map_client_error)?;
            println!("{msg}: {email}");
        }
        Command::Blocked => {
            let entries = client.list_blocked().await.map_err(map_client_error)?;
            if json {
                print_json(&entries)?;
            } else {
                print_blocked(&entries);
            }
        }
        Command::Create { title, file } => {
            let image = read_image(&file)?;
            let post = client
                .create_post(&title, &image)
                .await
                .map_err(map_client_error)?;
            output_post(json, "Пост создан", &post)?;
        }
        Command::Get { id } => {
            let post = client.get_post(id).await.map_err(map_client_error)?;
            output_post(json, "Пост", &post)?;
        }
        Command::Update { id, title, file } => {
            let image = file.as_deref().map(read_image).transpose()?;
            let post = client
                .update_post(id, &title, image.as_ref())
                .await
                .map_err(map_client_error)?;
            output_post(json, "Пост обновлён", &post)?;
        }
        Command::Delete { id } => {
            let msg = client.delete_post(id).await.map_err(map_client_error)?;
            println!("{msg}: id={id}");
        }
        Command::List {
            limit,
            offset,
            mine,
        } => {
            let list = if mine {
                client.list_own_posts(limit, offset).await
            } else {
                client.list_posts(limit, offset).await
            }
            .map_err(map_client_error)?;
            if json {
                print_json(&list)?;
            } else {
                print_list(&list);
            }
        }
        Command::Like { id } => {
            let likes = client.toggle_like(id).await.map_err(map_client_error)?;
            if json {
                print_json(&likes)?;
            } else {
                print_likes(&likes);
            }
        }
        Command::Comment { id, text } => {
            let comments = client
                .add_comment(id, &text)
                .await
                .map_err(map_client_error)?;
            output_comments(json, &comments)?;
        }
        Command::Uncomment { id, comment_id } => {
            let comments = client
                .delete_comment(id, comment_id)
                .await
                .map_err(map_client_error)?;
            output_comments(json, &comments)?;
        }
    }

    Ok(())
}

fn resolve_server(flag: Option<String>, env: Option<String>) -> String {
    let raw = flag
        .or(env)
        .filter(|server| !server.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SERVER.to_string());
    normalize_server(raw)
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn persist_token(client: &PinClient) -> io::Result<()> {
    if let Some(token) = client.get_token() {
        fs::write(TOKEN_FILE, token)?;
    }
    Ok(())
}

fn remove_token() -> io::Result<()> {
    match fs::remove_file(TOKEN_FILE) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Сохраняет токен после успешного входа или печатает ошибку сервера.
fn finish_auth(client: &PinClient, state: AuthState) -> Result<()> {
    if let Some(error) = state.error {
        anyhow::bail!(error);
    }
    if state.is_authenticated {
        persist_token(client).context("не удалось сохранить токен")?;
    }
    Ok(())
}

fn read_image(path: &Path) -> Result<ImageFile> {
    ImageFile::from_path(path)
        .with_context(|| format!("не удалось прочитать файл {}", path.display()))
}

fn error_message(err: &PinClientError) -> String {
    err.server_message()
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string())
}

fn map_client_error(err: PinClientError) -> anyhow::Error {
    let message = match err {
        PinClientError::Unauthorized(message) => format!(
            "требуется авторизация ({message}): выполните `pin-cli login ...` или `pin-cli register ...`"
        ),
        PinClientError::NotFound(message) => format!("не найдено: {message}"),
        PinClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        PinClientError::Server(message) => format!("ошибка сервера: {message}"),
        PinClientError::Http(err) => format!("ошибка HTTP: {err}"),
        PinClientError::MissingSession => "сервер не вернул cookie сессии".to_string(),
    };
    anyhow::anyhow!(message)
}

fn check_text(status: TokenStatus) -> &'static str {
    match status {
        TokenStatus::Valid => "Токен действителен",
        TokenStatus::Invalid => "Токен недействителен",
        TokenStatus::Missing => "Токен не найден",
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn output_post(json: bool, title: &str, post: &Post) -> Result<()> {
    if json {
        return print_json(post);
    }

    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("media_url: {}", post.media_url);
    println!("owner_id: {}", post.owner_id);
    println!("likes: {}", post.like_count);
    println!("comments: {}", post.comment_count);
    for comment in &post.comments {
        println!("  - [{}] {} (owner_id={})", comment.id, comment.text, comment.owner_id);
    }
    println!("created_at: {}", post.created_at);
    println!("updated_at: {}", post.updated_at);
    Ok(())
}

fn output_comments(json: bool, comments: &[Comment]) -> Result<()> {
    if json {
        return print_json(&comments);
    }

    println!("Комментариев: {}", comments.len());
    for comment in comments {
        println!(
            "- [{}] {} (owner_id={}, {})",
            comment.id, comment.text, comment.owner_id, comment.created_at
        );
    }
    Ok(())
}

fn print_likes(likes: &[Like]) {
    println!("Лайков: {}", likes.len());
    for like in likes {
        println!("- user_id={} ({})", like.user_id, like.created_at);
    }
}

fn print_blocked(entries: &[BlockEntry]) {
    println!("Заблокировано: {}", entries.len());
    for entry in entries {
        println!(
            "- {} (user_id={}, blocked_by={}, {})",
            entry.email, entry.user_id, entry.blocked_by, entry.created_at
        );
    }
}

fn print_list(list: &ListPostsResponse) {
    println!(
        "Постов: {} (limit={}, offset={}, total={})",
        list.posts.len(),
        list.limit,
        list.offset,
        list.total
    );

    for post in &list.posts {
        println!(
            "- [{}] {} (owner_id={}, likes={}, comments={})",
            post.id, post.title, post.owner_id, post.like_count, post.comment_count
        );
    }
}
