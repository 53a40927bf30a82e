use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    Router,
    routing::get,
};
use sqlx::postgres::PgPoolOptions;
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    configuration::{Settings, StorageBackend},
    routes::{
        health_check::health_check,
        pages::{todos_page, users_page},
        todos::{clear_todos, create_todo, delete_todo, get_todo, list_todos, update_todo},
        users::{create_user, delete_user, get_user, list_users, update_user},
    },
    services::{TodoService, UserService},
    store::{
        MemoryTodoStore, MemoryUserStore, TodoRepository, UserRepository, ensure_schema,
    },
};

#[derive(Clone, Debug)]
pub struct AppState {
    pub todo_service: TodoService,
    pub user_service: UserService,
}

impl AppState {
    /// State backed by process-local stores; nothing outside the process is touched.
    pub fn in_memory() -> Self {
        Self {
            todo_service: TodoService::new(Arc::new(MemoryTodoStore::new())),
            user_service: UserService::new(Arc::new(MemoryUserStore::new())),
        }
    }

    /// Connects to Postgres and creates the tables when they are missing.
    pub async fn postgres(settings: &Settings) -> anyhow::Result<Self> {
        let pg_pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(2))
            .connect_lazy_with(settings.database.connect_options());

        ensure_schema(&pg_pool)
            .await
            .context("failed to prepare the database schema")?;

        Ok(Self {
            todo_service: TodoService::new(Arc::new(TodoRepository::new(pg_pool.clone()))),
            user_service: UserService::new(Arc::new(UserRepository::new(pg_pool))),
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(todos_page))
        .route("/users", get(users_page))
        .route("/health_check", get(health_check))
        .route(
            "/todos",
            get(list_todos).post(create_todo).delete(clear_todos),
        )
        .route(
            "/todos/{id}",
            get(get_todo).patch(update_todo).delete(delete_todo),
        )
        .route("/api/user", get(list_users).post(create_user))
        .route(
            "/api/user/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .nest_service("/assets", ServeDir::new("public"))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let state = match settings.application.storage {
            StorageBackend::Postgres => AppState::postgres(&settings).await?,
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                AppState::in_memory()
            }
        };

        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("failed to bind {address}"))?;

        Ok(Self {
            listener,
            router: build_router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or_default()
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Server running on port {}", self.port());
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {:?}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {:?}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
