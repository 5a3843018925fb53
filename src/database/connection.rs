//! Conexión a PostgreSQL
//!
//! Este módulo abre el pool y aplica las migraciones embebidas.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::database::DatabaseConfig;

/// Pool de conexiones listo para usar
#[derive(Clone)]
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Conectar y ejecutar migraciones
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("🗄️ Conectando a {}", mask_database_url(&config.url));

        let pool = config
            .create_pool()
            .await
            .context("Error conectando a la base de datos")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Error ejecutando migraciones")?;

        info!("✅ Base de datos lista (migraciones aplicadas)");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Función helper para enmascarar la URL de la base de datos en logs
fn mask_database_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at_pos)) if at_pos > scheme_end => {
            format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
