//! Middleware de autenticación JWT
//!
//! Este módulo maneja la autenticación JWT, extracción de tokens
//! y verificación de roles de los usuarios autenticados.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    models::user::UserRole,
    state::AppState,
    utils::{
        errors::{forbidden_error, AppError},
        jwt::{extract_token_from_header, verify_token, JwtConfig},
    },
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    /// Verificar que el rol del usuario esté entre los permitidos
    pub fn require_role(&self, allowed: &[UserRole], operation: &str) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            return Ok(());
        }
        Err(forbidden_error(
            operation,
            &format!("role '{}' is not allowed", self.role),
        ))
    }
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extraer token del header Authorization
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &JwtConfig::from(&state.config))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".to_string()))?;

    // El rol vigente es el guardado, no el del token
    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    debug!("🔐 {} autenticado como {}", user.email, user.role);

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        email: user.email,
        role: user.role,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: "someone@fleet.io".to_string(),
            role,
        }
    }

    #[test]
    fn allowed_role_passes() {
        let dispatcher = user(UserRole::Dispatcher);
        assert!(dispatcher
            .require_role(&[UserRole::Manager, UserRole::Dispatcher], "create trip")
            .is_ok());
    }

    #[test]
    fn other_roles_are_forbidden() {
        let analyst = user(UserRole::Analyst);
        let err = analyst
            .require_role(&[UserRole::Manager], "create vehicle")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Forbidden: Cannot create vehicle: role 'analyst' is not allowed"
        );
    }
}
