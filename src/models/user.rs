//! Modelo de User
//!
//! Usuarios del backoffice con su rol operativo.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Rol del usuario - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Manager,
    Dispatcher,
    SafetyOfficer,
    Analyst,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Manager => "manager",
            UserRole::Dispatcher => "dispatcher",
            UserRole::SafetyOfficer => "safety_officer",
            UserRole::Analyst => "analyst",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "manager" => Some(UserRole::Manager),
            "dispatcher" => Some(UserRole::Dispatcher),
            "safety_officer" => Some(UserRole::SafetyOfficer),
            "analyst" => Some(UserRole::Analyst),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User - mapea a la tabla users. El hash nunca sale en las respuestas.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}
