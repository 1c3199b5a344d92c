use crate::components::{GraphClient, MicrosoftIdentity, PhotoStore};
use crate::config::Config;
use crate::error::Error;
use crate::handlers::Services;
use crate::session::{InMemorySessionStore, RedisSessionStore, SessionStore};
use crate::shutdown;
use crate::web::{build_router, AppState, StaticDirs};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Pick the session backend, Redis when configured and reachable
pub async fn build_session_store(config: &Config) -> Arc<dyn SessionStore> {
    let Some(redis_url) = &config.redis_url else {
        info!("Using in-memory session store");
        return Arc::new(InMemorySessionStore::new(config.session_ttl_seconds));
    };

    let redis_store = match RedisSessionStore::new(redis_url, config.session_ttl_seconds) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to create Redis session store: {}", e);
            info!("Using in-memory session store as fallback");
            return Arc::new(InMemorySessionStore::new(config.session_ttl_seconds));
        }
    };

    match redis_store.ping().await {
        Ok(()) => {
            info!("Connected to Redis successfully");
            Arc::new(redis_store)
        }
        Err(e) => {
            // Log the error and fall back to an in-memory store
            error!("Failed to connect to Redis: {}", e);
            info!("Using in-memory session store as fallback");
            Arc::new(InMemorySessionStore::new(config.session_ttl_seconds))
        }
    }
}

/// Wire the identity, Graph and photo collaborators
pub fn build_services(config: &Config) -> Services {
    Services {
        identity: Arc::new(MicrosoftIdentity::new(config)),
        graph: Arc::new(GraphClient::new()),
        photos: PhotoStore::new(config.photo_dir.clone()),
    }
}

/// Build the router and serve it until a shutdown signal arrives
pub async fn start_server(config: Config) -> miette::Result<()> {
    // Ensure photo directory exists
    std::fs::create_dir_all(&config.photo_dir).map_err(Error::from)?;

    let state = AppState {
        services: build_services(&config),
        sessions: build_session_store(&config).await,
        session_ttl_seconds: config.session_ttl_seconds,
    };

    let dirs = StaticDirs {
        static_dir: config.static_dir.clone(),
        photo_dir: config.photo_dir.clone(),
    };
    let app = build_router(state, &dirs);

    // Bind to address and run server
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .map_err(|e| Error::Config(format!("Invalid bind address: {}", e)))?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(Error::from)?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await
        .map_err(Error::from)?;

    info!("Server stopped");
    Ok(())
}
