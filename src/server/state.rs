use axum::extract::FromRef;

use crate::library::BookService;
use crate::user::UserManager;
use std::sync::Arc;

use super::ServerConfig;

pub type GuardedBookService = Arc<BookService>;
pub type GuardedUserManager = Arc<UserManager>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub book_service: GuardedBookService,
    pub user_manager: GuardedUserManager,
}

impl FromRef<ServerState> for GuardedBookService {
    fn from_ref(input: &ServerState) -> Self {
        input.book_service.clone()
    }
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
