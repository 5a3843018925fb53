//! Servicio de autenticación
//!
//! Registro y login de usuarios con hash bcrypt y emisión de JWT.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::models::user::{User, UserRole};
use crate::repositories::FleetStore;
use crate::utils::errors::{AppError, AppResult, StateConflict};
use crate::utils::jwt::{generate_token, JwtConfig};

pub struct AuthService {
    store: Arc<dyn FleetStore>,
    jwt: JwtConfig,
    hash_cost: u32,
}

impl AuthService {
    pub fn new(store: Arc<dyn FleetStore>, jwt: JwtConfig, hash_cost: u32) -> Self {
        Self { store, jwt, hash_cost }
    }

    /// Registrar un usuario nuevo (rol por defecto `dispatcher`)
    pub async fn register(&self, request: RegisterRequest) -> AppResult<RegisterResponse> {
        let email = normalize_email(&request.email);

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(StateConflict::Duplicate {
                entity: "User",
                field: "email",
                value: email,
            }
            .into());
        }

        let password_hash = bcrypt::hash(&request.password, self.hash_cost)
            .map_err(|e| AppError::Hash(e.to_string()))?;

        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash,
            role: request.role.unwrap_or(UserRole::Dispatcher),
            created_at: Utc::now(),
        };
        self.store.insert_user(&user).await?;

        info!("👤 Usuario registrado: {} ({})", user.email, user.role);
        Ok(RegisterResponse {
            id: user.id,
            email: user.email,
            role: user.role,
        })
    }

    /// Login con email y password
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let email = normalize_email(&request.email);
        let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

        let user = match self.store.find_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!("🔒 Login fallido: email desconocido {}", email);
                return Err(invalid());
            }
        };

        let matches = bcrypt::verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Hash(e.to_string()))?;
        if !matches {
            warn!("🔒 Login fallido: password incorrecto para {}", email);
            return Err(invalid());
        }

        let token = generate_token(user.id, user.role, &self.jwt)?;
        info!("🔑 Login exitoso: {} ({})", user.email, user.role);
        Ok(LoginResponse {
            token,
            role: user.role,
        })
    }

    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        Ok(self
            .store
            .find_user_by_email(&normalize_email(email))
            .await?
            .is_some())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
