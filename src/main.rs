//! Jobdesk - A lightweight job board backend

use anyhow::Result;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobdesk::{
    api::{self, AppState, RequestStats},
    cache::create_cache,
    config::Config,
    db::{
        self,
        repositories::{
            SqlxBlogRepository, SqlxJobRepository, SqlxMasterDataRepository,
            SqlxSessionRepository, SqlxUserRepository,
        },
    },
    services::{BlogService, JobService, LoginRateLimiter, MasterDataService, UserService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobdesk=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Jobdesk job board...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Seed the master data catalog (idempotent)
    let md_repo = SqlxMasterDataRepository::new(pool.clone());
    db::seed::seed_master_data(&md_repo).await?;
    tracing::info!("Master data ready");

    // Demo mode: Create default admin user if not exists
    #[cfg(feature = "demo")]
    {
        use jobdesk::services::user::RegisterInput;

        let user_service = UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
        );
        if user_service.is_first_user().await? {
            tracing::info!("Demo mode: Creating default admin user (demo/demo1234)");
            user_service
                .register(RegisterInput {
                    username: "demo".to_string(),
                    email: "demo@jobdesk.local".to_string(),
                    password: "demo1234".to_string(),
                })
                .await?;
        }
    }

    // Initialize cache
    let cache = create_cache(&config.cache).await?;
    tracing::info!("Cache initialized");

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let blog_repo = SqlxBlogRepository::boxed(pool.clone());
    let job_repo = SqlxJobRepository::boxed(pool.clone());
    let master_data_repo = SqlxMasterDataRepository::boxed(pool.clone());

    // Initialize services
    let user_service = Arc::new(UserService::new(user_repo, session_repo));
    let blog_service = Arc::new(BlogService::new(blog_repo, cache.clone()));
    let job_service = Arc::new(JobService::new(
        job_repo,
        master_data_repo.clone(),
        cache.clone(),
    ));
    let master_data_service = Arc::new(MasterDataService::new(master_data_repo, cache));

    // Build application state
    let request_stats = Arc::new(RequestStats::new());
    let rate_limiter = Arc::new(LoginRateLimiter::new());

    let state = AppState {
        pool: pool.clone(),
        user_service: user_service.clone(),
        blog_service,
        job_service,
        master_data_service,
        rate_limiter: rate_limiter.clone(),
        request_stats,
    };

    // Rate limiter cleanup task (runs every 5 minutes)
    {
        let limiter = rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        });
    }

    // Expired session purge task (runs hourly)
    {
        let user_service = user_service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
            loop {
                interval.tick().await;
                match user_service.purge_expired_sessions().await {
                    Ok(0) => {}
                    Ok(n) => tracing::debug!("Purged {} expired session(s)", n),
                    Err(e) => tracing::warn!("Session purge failed: {}", e),
                }
            }
        });
    }

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
