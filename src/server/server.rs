use anyhow::{Context, Result};
use std::sync::Arc;

use tracing::error;

use crate::error::ServiceError;
use crate::library::BookService;
use crate::user::UserManager;
use tower_http::services::ServeDir;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "slowdown")]
use super::slowdown_request;
use super::{log_requests, state::*, ServerConfig};

const POWER_OWNER: &str = "작성자";
const POWER_READER: &str = "이용자";

const MSG_DELETED_LISTING: &str = "삭제된 목록입니다.";
const MSG_NO_PERMISSION: &str = "권한 없음";
const MSG_CHECK_TITLE_AND_DESCRIPTION: &str = "제목과 내용을 다시 확인";
const MSG_UNKNOWN_USER: &str = "존재하지 않는 사용자입니다.";
const MSG_CHECK_CREDENTIALS: &str = "아이디와 비밀번호를 다시 확인해주세요.";
const MSG_DUPLICATE_LOGIN_ID: &str = "이미 사용 중인 아이디입니다.";
const MSG_WRONG_CREDENTIALS: &str = "아이디 또는 비밀번호가 잘못되었습니다.";
const MSG_NO_BOOKS: &str = "조회할 수 있는 책이 없습니다.";
const MSG_BOOK_DELETED: &str = "삭제되었습니다.";
const MSG_IMAGE_EXISTS: &str = "이미 이미지가 존재합니다.";
const MSG_SERVER_ERROR: &str = "서버 오류가 발생했습니다.";

const MAX_TITLE_CHARS: usize = 255;
const MAX_DESCRIPTION_CHARS: usize = 2000;

/// Fixed-shape error body: `{"status": "error", "message": ...}`.
#[derive(Serialize)]
struct StatusMessage {
    status: &'static str,
    message: String,
}

/// Boundary error: an HTTP status plus the fixed user-facing message for the
/// domain error behind it.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let (status, message) = match &err {
            ServiceError::UserNotFound => (StatusCode::BAD_REQUEST, MSG_UNKNOWN_USER.to_string()),
            ServiceError::BookNotFound | ServiceError::ImageNotFound => {
                (StatusCode::NOT_FOUND, MSG_DELETED_LISTING.to_string())
            }
            ServiceError::Unauthorized => (StatusCode::FORBIDDEN, MSG_NO_PERMISSION.to_string()),
            ServiceError::InvalidInput(_) => {
                (StatusCode::BAD_REQUEST, MSG_CHECK_CREDENTIALS.to_string())
            }
            ServiceError::DuplicateLogin => {
                (StatusCode::BAD_REQUEST, MSG_DUPLICATE_LOGIN_ID.to_string())
            }
            ServiceError::ImageAlreadyExists => {
                (StatusCode::BAD_REQUEST, MSG_IMAGE_EXISTS.to_string())
            }
            ServiceError::BadCredentials => {
                (StatusCode::UNAUTHORIZED, MSG_WRONG_CREDENTIALS.to_string())
            }
            ServiceError::Ingestion(e) => (
                StatusCode::NOT_FOUND,
                format!("이미지 다운로드 실패: {}", e),
            ),
            ServiceError::Internal(e) => {
                error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    MSG_SERVER_ERROR.to_string(),
                )
            }
        };
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(StatusMessage {
                status: "error",
                message: self.message,
            }),
        )
            .into_response()
    }
}

#[derive(Deserialize, Debug)]
struct CreateBookBody {
    pub user_id: i64,
    pub title: String,
    pub description: String,
}

#[derive(Deserialize, Debug)]
struct CheckBookBody {
    pub book_id: i64,
    pub user_id: i64,
}

#[derive(Deserialize, Debug)]
struct UpdateBookBody {
    pub book_id: i64,
    pub user_id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct DeleteBookBody {
    pub book_id: i64,
    pub user_id: i64,
}

#[derive(Deserialize, Debug)]
struct CreateImageBody {
    pub image_url: String,
    pub book_id: i64,
    pub user_id: Option<i64>,
}

#[derive(Deserialize, Debug)]
struct CheckImageBody {
    pub book_id: i64,
    pub user_id: Option<i64>,
}

#[derive(Deserialize, Debug)]
struct UpdateImageBody {
    pub book_id: i64,
    pub user_id: i64,
    pub image_url: String,
}

#[derive(Deserialize, Debug)]
struct CredentialsBody {
    pub login_id: String,
    pub password: String,
}

#[derive(Serialize)]
struct CreateBookResponse {
    book_id: i64,
}

#[derive(Serialize)]
struct CheckBookResponse {
    power: &'static str,
    title: String,
    description: String,
}

#[derive(Serialize)]
struct BookListItem {
    book_id: i64,
    title: String,
    description: String,
}

#[derive(Serialize)]
struct ListBooksResponse {
    data: Vec<BookListItem>,
}

#[derive(Serialize)]
struct ImageResponse {
    status: &'static str,
    image_url: String,
}

#[derive(Serialize)]
struct CheckImageResponse {
    power: &'static str,
    image_url: String,
}

#[derive(Serialize)]
struct UserIdResponse {
    user_id: i64,
}

fn validate_book_field(value: &str, max_chars: usize) -> Result<(), ApiError> {
    if value.trim().is_empty() || value.chars().count() > max_chars {
        return Err(ApiError::bad_request(MSG_CHECK_TITLE_AND_DESCRIPTION));
    }
    Ok(())
}

/// Relative references become absolute URLs only here, on the way out.
fn absolute_image_url(config: &ServerConfig, relative: &str) -> String {
    format!("{}{}", config.base_url, relative)
}

async fn post_book(
    State(service): State<GuardedBookService>,
    Json(body): Json<CreateBookBody>,
) -> Result<Json<CreateBookResponse>, ApiError> {
    validate_book_field(&body.title, MAX_TITLE_CHARS)?;
    validate_book_field(&body.description, MAX_DESCRIPTION_CHARS)?;

    let book = service.create_book(body.user_id, &body.title, &body.description)?;
    Ok(Json(CreateBookResponse { book_id: book.id }))
}

async fn check_book(
    State(service): State<GuardedBookService>,
    Json(body): Json<CheckBookBody>,
) -> Result<Json<CheckBookResponse>, ApiError> {
    let book = service.find_book(body.book_id)?;
    let power = if book.owner_id == body.user_id {
        POWER_OWNER
    } else {
        POWER_READER
    };
    Ok(Json(CheckBookResponse {
        power,
        title: book.title,
        description: book.description,
    }))
}

async fn list_books(State(service): State<GuardedBookService>) -> Result<Response, ApiError> {
    let books = service.list_books()?;
    if books.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(StatusMessage {
                status: "error",
                message: MSG_NO_BOOKS.to_string(),
            }),
        )
            .into_response());
    }

    let data = books
        .into_iter()
        .map(|book| BookListItem {
            book_id: book.id,
            title: book.title,
            description: book.description,
        })
        .collect();
    Ok(Json(ListBooksResponse { data }).into_response())
}

async fn put_book(
    State(service): State<GuardedBookService>,
    Json(body): Json<UpdateBookBody>,
) -> Result<StatusCode, ApiError> {
    if let Some(title) = body.title.as_deref().filter(|t| !t.trim().is_empty()) {
        validate_book_field(title, MAX_TITLE_CHARS)?;
    }
    if let Some(description) = body
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        validate_book_field(description, MAX_DESCRIPTION_CHARS)?;
    }

    service.update_book(
        body.book_id,
        body.user_id,
        body.title.as_deref(),
        body.description.as_deref(),
    )?;
    Ok(StatusCode::OK)
}

async fn delete_book(
    State(service): State<GuardedBookService>,
    Json(body): Json<DeleteBookBody>,
) -> Result<Json<StatusMessage>, ApiError> {
    service.delete_book(body.book_id, body.user_id).await?;
    Ok(Json(StatusMessage {
        status: "success",
        message: MSG_BOOK_DELETED.to_string(),
    }))
}

async fn post_image(
    State(service): State<GuardedBookService>,
    State(config): State<ServerConfig>,
    Json(body): Json<CreateImageBody>,
) -> Result<Json<ImageResponse>, ApiError> {
    let relative = service
        .create_image(&body.image_url, body.book_id, body.user_id)
        .await?;
    Ok(Json(ImageResponse {
        status: "success",
        image_url: absolute_image_url(&config, &relative),
    }))
}

async fn check_image(
    State(service): State<GuardedBookService>,
    State(config): State<ServerConfig>,
    Json(body): Json<CheckImageBody>,
) -> Result<Json<CheckImageResponse>, ApiError> {
    let image = service.get_image(body.book_id, body.user_id)?;
    Ok(Json(CheckImageResponse {
        power: POWER_READER,
        image_url: absolute_image_url(&config, &image.image_path),
    }))
}

async fn put_image(
    State(service): State<GuardedBookService>,
    State(config): State<ServerConfig>,
    Json(body): Json<UpdateImageBody>,
) -> Result<Json<ImageResponse>, ApiError> {
    let relative = service
        .update_image(body.book_id, &body.image_url, body.user_id)
        .await?;
    Ok(Json(ImageResponse {
        status: "success",
        image_url: absolute_image_url(&config, &relative),
    }))
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<UserIdResponse>, ApiError> {
    let user = user_manager.login(&body.login_id, &body.password)?;
    Ok(Json(UserIdResponse { user_id: user.id }))
}

async fn signup(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<UserIdResponse>, ApiError> {
    let user = user_manager.signup(&body.login_id, &body.password)?;
    Ok(Json(UserIdResponse { user_id: user.id }))
}

pub fn make_app(
    config: ServerConfig,
    book_service: Arc<BookService>,
    user_manager: Arc<UserManager>,
) -> Router {
    let images_root = book_service.storage().root().to_path_buf();
    let state = ServerState {
        config,
        book_service,
        user_manager,
    };

    let user_routes: Router = Router::new()
        .route("/login", post(login))
        .route("/signup", post(signup))
        .with_state(state.clone());

    let book_routes: Router = Router::new()
        .route("/", post(post_book))
        .route("/check", post(check_book))
        .route("/list", get(list_books))
        .route("/put", put(put_book))
        .route("/delete", delete(delete_book))
        .with_state(state.clone());

    let image_routes: Router = Router::new()
        .route("/", post(post_image))
        .route("/check", post(check_image))
        .route("/put", put(put_image))
        .with_state(state.clone());

    let mut app: Router = Router::new()
        .nest("/api/v1/users", user_routes)
        .nest("/api/v1/books", book_routes)
        .nest("/api/v1/image", image_routes)
        .nest_service("/images", ServeDir::new(images_root));

    #[cfg(feature = "slowdown")]
    {
        app = app.layer(middleware::from_fn(slowdown_request));
    }
    app = app.layer(middleware::from_fn_with_state(state, log_requests));

    app
}

pub async fn run_server(
    config: ServerConfig,
    book_service: Arc<BookService>,
    user_manager: Arc<UserManager>,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, book_service, user_manager);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    Ok(axum::serve(listener, app).await?)
}
