use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use fleet_ops::{
    build_router,
    config::{database::DatabaseConfig, environment::EnvironmentConfig},
    database::DatabaseConnection,
    repositories::{FleetStore, MemoryFleetStore, PgFleetStore},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🚚 Fleet Ops - API de gestión de flota");
    info!("================================================");
    info!("🌍 Entorno: {}", config.environment);

    if config.uses_default_jwt_secret() && !config.is_development() {
        warn!("⚠️ JWT_SECRET no configurado, usando el secreto de desarrollo");
    }

    // Inicializar almacenamiento
    let store: Arc<dyn FleetStore> = match &config.database_url {
        Some(url) => {
            let db_connection = DatabaseConnection::connect(&DatabaseConfig::new(url.clone(), &config))
                .await
                .map_err(|e| {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    e
                })?;
            Arc::new(PgFleetStore::new(db_connection.pool().clone()))
        }
        None => {
            warn!("⚠️ DATABASE_URL no configurada, usando almacenamiento en memoria (los datos no persisten)");
            Arc::new(MemoryFleetStore::new())
        }
    };

    let addr = config.bind_address();
    let app = build_router(AppState::new(store, config));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("   POST /auth/register | /auth/login | /auth/check-email");
    info!("   GET|POST /vehicles, GET|PUT|DELETE /vehicles/:id");
    info!("   GET|POST /drivers, GET|PUT|DELETE /drivers/:id");
    info!("   GET|POST /trips, GET|PUT /trips/:id");
    info!("   GET|POST /maintenance, PUT /maintenance/:id/resolve");
    info!("   GET|POST /fuel");
    info!("   GET  /dashboard");
    info!("   GET  /analytics | /analytics/drivers | /analytics/monthly");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("no se pudo escuchar en {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
