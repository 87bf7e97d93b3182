//! Accounts, customer profiles, registration and login payloads

use serde::{Deserialize, Serialize};

/// Account kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum AccountKind {
    Customer,
    Restaurant,
}

/// Account row (password hash is never loaded into this type)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub kind: AccountKind,
    pub created_at: i64,
}

/// Customer profile row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub account_id: i64,
    pub name: String,
    pub phone: String,
    pub cpf: Option<String>,
}

/// Customer profile merged with its account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CustomerProfile {
    pub id: i64,
    pub account_id: i64,
    pub username: String,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub cpf: Option<String>,
}

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: RegisterProfile,
}

/// Profile data created together with the account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegisterProfile {
    Customer {
        name: String,
        phone: String,
        #[serde(default)]
        cpf: Option<String>,
    },
    Restaurant {
        name: String,
        address: String,
        phone: String,
        cuisine_type_id: i64,
    },
}

impl RegisterProfile {
    pub fn kind(&self) -> AccountKind {
        match self {
            RegisterProfile::Customer { .. } => AccountKind::Customer,
            RegisterProfile::Restaurant { .. } => AccountKind::Restaurant,
        }
    }
}

/// Result of a successful registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub account: Account,
    pub profile_id: i64,
}

/// Account fields shared by both profile updates
///
/// A password change needs `current_password`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerProfileUpdate {
    #[serde(flatten)]
    pub account: AccountUpdate,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub cpf: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantProfileUpdate {
    #[serde(flatten)]
    pub account: AccountUpdate,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub account_id: i64,
    pub kind: AccountKind,
    pub profile_id: i64,
    /// Expiry as Unix seconds
    pub expires_at: i64,
}
