//! Accounts and profiles
//!
//! Registration and profile updates span the account row and the linked
//! profile row. Both run in one transaction; returning early drops the
//! transaction, which rolls it back.

use shared::error::{AppError, ErrorCode};
use shared::models::{
    Account, AccountKind, AccountUpdate, CustomerProfile, CustomerProfileUpdate, RegisterProfile,
    RegisterRequest, RegisterResponse, Restaurant, RestaurantProfileUpdate,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

use super::restaurants;
use crate::error::{ServiceError, ServiceResult, is_foreign_key_violation};
use crate::util::{hash_password, verify_password};

const ACCOUNT_UNIQUE_COLUMNS: &[&str] = &["accounts.username", "accounts.email"];

/// Login lookup result
#[derive(Debug, sqlx::FromRow)]
pub struct Credentials {
    pub account_id: i64,
    pub kind: AccountKind,
    pub password_hash: String,
}

fn require(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            format!("{field} is required"),
        ));
    }
    Ok(())
}

fn not_blank(value: Option<&str>, field: &str) -> Result<(), AppError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(AppError::validation(format!(
            "{field} must not be empty if provided"
        ))),
        _ => Ok(()),
    }
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::validation(format!("Invalid email: {email}"))),
    }
}

/// Required-field checks, run before anything is written
pub fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    require(&req.username, "username")?;
    require(&req.email, "email")?;
    require(&req.password, "password")?;
    validate_email(&req.email)?;
    match &req.profile {
        RegisterProfile::Customer { name, phone, .. } => {
            require(name, "name")?;
            require(phone, "phone")?;
        }
        RegisterProfile::Restaurant {
            name,
            address,
            phone,
            ..
        } => {
            require(name, "name")?;
            require(address, "address")?;
            require(phone, "phone")?;
        }
    }
    Ok(())
}

fn validate_account_update(upd: &AccountUpdate) -> Result<(), AppError> {
    not_blank(upd.username.as_deref(), "username")?;
    not_blank(upd.email.as_deref(), "email")?;
    not_blank(upd.new_password.as_deref(), "new_password")?;
    if let Some(email) = &upd.email {
        validate_email(email)?;
    }
    Ok(())
}

async fn fetch_account<'e, E>(ex: E, account_id: i64) -> Result<Option<Account>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Account>(
        "SELECT id, username, email, kind, created_at FROM accounts WHERE id = ?",
    )
    .bind(account_id)
    .fetch_optional(ex)
    .await
}

/// Create an account and its profile atomically
///
/// Restaurant accounts also get their cuisine association; an unknown
/// cuisine type rolls the whole registration back.
pub async fn register(
    pool: &SqlitePool,
    req: &RegisterRequest,
    password_hash: &str,
) -> ServiceResult<RegisterResponse> {
    let now = now_millis();
    let account_id = snowflake_id();
    let profile_id = snowflake_id();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO accounts (id, username, email, password_hash, kind, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(account_id)
    .bind(req.username.trim())
    .bind(req.email.trim().to_lowercase())
    .bind(password_hash)
    .bind(req.profile.kind())
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        ServiceError::unique_as(e, ACCOUNT_UNIQUE_COLUMNS, ErrorCode::AccountAlreadyExists)
    })?;

    match &req.profile {
        RegisterProfile::Customer { name, phone, cpf } => {
            sqlx::query(
                "INSERT INTO customers (id, account_id, name, phone, cpf) VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(profile_id)
            .bind(account_id)
            .bind(name.trim())
            .bind(phone.trim())
            .bind(cpf.as_deref().map(str::trim))
            .execute(&mut *tx)
            .await?;
        }
        RegisterProfile::Restaurant {
            name,
            address,
            phone,
            cuisine_type_id,
        } => {
            sqlx::query(
                "INSERT INTO restaurants (id, account_id, name, address, phone, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(profile_id)
            .bind(account_id)
            .bind(name.trim())
            .bind(address.trim())
            .bind(phone.trim())
            .bind(now)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                "INSERT INTO restaurant_cuisine_types (restaurant_id, cuisine_type_id) VALUES (?1, ?2)",
            )
            .bind(profile_id)
            .bind(cuisine_type_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    ServiceError::App(AppError::new(ErrorCode::CuisineTypeNotFound))
                } else {
                    e.into()
                }
            })?;
        }
    }

    let account = fetch_account(&mut *tx, account_id)
        .await?
        .ok_or_else(|| AppError::internal("Account vanished during registration"))?;
    tx.commit().await?;

    tracing::info!(account_id, profile_id, kind = ?account.kind, "Account registered");
    Ok(RegisterResponse {
        account,
        profile_id,
    })
}

/// Look up login credentials by username or email
pub async fn find_credentials(pool: &SqlitePool, login: &str) -> ServiceResult<Option<Credentials>> {
    let login = login.trim();
    let creds = sqlx::query_as::<_, Credentials>(
        "SELECT id AS account_id, kind, password_hash FROM accounts WHERE username = ?1 OR email = lower(?1)",
    )
    .bind(login)
    .fetch_optional(pool)
    .await?;
    Ok(creds)
}

/// Customer or restaurant id linked to an account
pub async fn profile_id(
    pool: &SqlitePool,
    account_id: i64,
    kind: AccountKind,
) -> ServiceResult<Option<i64>> {
    let sql = match kind {
        AccountKind::Customer => "SELECT id FROM customers WHERE account_id = ?",
        AccountKind::Restaurant => "SELECT id FROM restaurants WHERE account_id = ?",
    };
    let id = sqlx::query_scalar::<_, i64>(sql)
        .bind(account_id)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

pub async fn find_customer_profile<'e, E>(
    ex: E,
    customer_id: i64,
) -> ServiceResult<Option<CustomerProfile>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let profile = sqlx::query_as::<_, CustomerProfile>(
        "SELECT c.id, c.account_id, a.username, a.email, c.name, c.phone, c.cpf \
         FROM customers c JOIN accounts a ON a.id = c.account_id WHERE c.id = ?",
    )
    .bind(customer_id)
    .fetch_optional(ex)
    .await?;
    Ok(profile)
}

/// Apply the account half of a profile update inside `conn`'s transaction
async fn apply_account_update(
    conn: &mut SqliteConnection,
    account_id: i64,
    upd: &AccountUpdate,
) -> ServiceResult<()> {
    let new_hash = match upd.new_password.as_deref() {
        Some(new_password) => {
            let current = upd.current_password.as_deref().ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::RequiredField,
                    "current_password is required to change the password",
                )
            })?;
            let stored: String =
                sqlx::query_scalar("SELECT password_hash FROM accounts WHERE id = ?")
                    .bind(account_id)
                    .fetch_one(&mut *conn)
                    .await?;
            if !verify_password(current, &stored) {
                return Err(AppError::invalid_credentials().into());
            }
            Some(hash_password(new_password).map_err(|e| ServiceError::Db(e.to_string().into()))?)
        }
        None => None,
    };

    sqlx::query(
        "UPDATE accounts SET username = COALESCE(?1, username), email = COALESCE(?2, email), \
         password_hash = COALESCE(?3, password_hash) WHERE id = ?4",
    )
    .bind(upd.username.as_deref().map(str::trim))
    .bind(upd.email.as_deref().map(|e| e.trim().to_lowercase()))
    .bind(new_hash)
    .bind(account_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        ServiceError::unique_as(e, ACCOUNT_UNIQUE_COLUMNS, ErrorCode::AccountAlreadyExists)
    })?;

    Ok(())
}

/// Update account and customer rows in one save
pub async fn update_customer_profile(
    pool: &SqlitePool,
    customer_id: i64,
    upd: &CustomerProfileUpdate,
) -> ServiceResult<CustomerProfile> {
    validate_account_update(&upd.account)?;
    not_blank(upd.name.as_deref(), "name")?;
    not_blank(upd.phone.as_deref(), "phone")?;

    let mut tx = pool.begin().await?;

    let account_id: i64 = sqlx::query_scalar("SELECT account_id FROM customers WHERE id = ?")
        .bind(customer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?;

    apply_account_update(&mut tx, account_id, &upd.account).await?;

    sqlx::query(
        "UPDATE customers SET name = COALESCE(?1, name), phone = COALESCE(?2, phone), \
         cpf = COALESCE(?3, cpf) WHERE id = ?4",
    )
    .bind(upd.name.as_deref().map(str::trim))
    .bind(upd.phone.as_deref().map(str::trim))
    .bind(upd.cpf.as_deref().map(str::trim))
    .bind(customer_id)
    .execute(&mut *tx)
    .await?;

    let profile = find_customer_profile(&mut *tx, customer_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?;
    tx.commit().await?;

    tracing::info!(customer_id, "Customer profile updated");
    Ok(profile)
}

/// Update account and restaurant rows in one save
pub async fn update_restaurant_profile(
    pool: &SqlitePool,
    restaurant_id: i64,
    upd: &RestaurantProfileUpdate,
) -> ServiceResult<Restaurant> {
    validate_account_update(&upd.account)?;
    not_blank(upd.name.as_deref(), "name")?;
    not_blank(upd.address.as_deref(), "address")?;
    not_blank(upd.phone.as_deref(), "phone")?;

    let mut tx = pool.begin().await?;

    let account_id: i64 = sqlx::query_scalar("SELECT account_id FROM restaurants WHERE id = ?")
        .bind(restaurant_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?;

    apply_account_update(&mut tx, account_id, &upd.account).await?;

    sqlx::query(
        "UPDATE restaurants SET name = COALESCE(?1, name), address = COALESCE(?2, address), \
         phone = COALESCE(?3, phone) WHERE id = ?4",
    )
    .bind(upd.name.as_deref().map(str::trim))
    .bind(upd.address.as_deref().map(str::trim))
    .bind(upd.phone.as_deref().map(str::trim))
    .bind(restaurant_id)
    .execute(&mut *tx)
    .await?;

    let restaurant = restaurants::find_by_id(&mut *tx, restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?;
    tx.commit().await?;

    tracing::info!(restaurant_id, "Restaurant profile updated");
    Ok(restaurant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{self, memory_pool};

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn restaurant_request(username: &str, cuisine_type_id: i64) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: format!("{username}@example.com"),
            password: "pw".into(),
            profile: RegisterProfile::Restaurant {
                name: "Cantina".into(),
                address: "Av. Central, 5".into(),
                phone: "555".into(),
                cuisine_type_id,
            },
        }
    }

    #[tokio::test]
    async fn restaurant_registration_creates_all_rows() {
        let pool = memory_pool().await;
        let res = register(&pool, &restaurant_request("cantina", 2), "hash")
            .await
            .unwrap();

        assert_eq!(res.account.kind, AccountKind::Restaurant);
        assert_eq!(count(&pool, "accounts").await, 1);
        assert_eq!(count(&pool, "restaurants").await, 1);
        assert_eq!(count(&pool, "restaurant_cuisine_types").await, 1);
        assert_eq!(
            profile_id(&pool, res.account.id, AccountKind::Restaurant)
                .await
                .unwrap(),
            Some(res.profile_id)
        );
    }

    #[tokio::test]
    async fn failed_cuisine_association_rolls_back_everything() {
        let pool = memory_pool().await;
        let err = register(&pool, &restaurant_request("cantina", 999), "hash")
            .await
            .unwrap_err();

        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::CuisineTypeNotFound);
        assert_eq!(count(&pool, "restaurants").await, 0);
        assert_eq!(count(&pool, "accounts").await, 0);
        assert_eq!(count(&pool, "restaurant_cuisine_types").await, 0);
    }

    #[tokio::test]
    async fn duplicate_username_or_email_conflicts() {
        let pool = memory_pool().await;
        register(&pool, &restaurant_request("cantina", 1), "hash")
            .await
            .unwrap();

        let err: AppError = register(&pool, &restaurant_request("cantina", 1), "hash")
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::AccountAlreadyExists);

        let mut other = restaurant_request("other", 1);
        other.email = "CANTINA@example.com".into();
        let err: AppError = register(&pool, &other, "hash").await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::AccountAlreadyExists);

        assert_eq!(count(&pool, "accounts").await, 1);
        assert_eq!(count(&pool, "restaurants").await, 1);
    }

    #[test]
    fn registration_requires_fields() {
        let mut req = restaurant_request("x", 1);
        req.username = "  ".into();
        assert_eq!(
            validate_registration(&req).unwrap_err().code,
            ErrorCode::RequiredField
        );

        let mut req = restaurant_request("x", 1);
        req.email = "not-an-email".into();
        assert_eq!(
            validate_registration(&req).unwrap_err().code,
            ErrorCode::ValidationFailed
        );

        assert!(validate_registration(&restaurant_request("x", 1)).is_ok());
    }

    #[tokio::test]
    async fn credentials_match_username_or_email() {
        let pool = memory_pool().await;
        let (account_id, _) = test_support::customer(&pool, "ana").await;

        let by_name = find_credentials(&pool, "ana").await.unwrap().unwrap();
        assert_eq!(by_name.account_id, account_id);
        let by_email = find_credentials(&pool, "ANA@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.account_id, account_id);
        assert!(find_credentials(&pool, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn customer_profile_update_touches_both_rows() {
        let pool = memory_pool().await;
        let (_, customer_id) = test_support::customer(&pool, "ana").await;

        let upd = CustomerProfileUpdate {
            account: AccountUpdate {
                email: Some("ana.new@example.com".into()),
                ..Default::default()
            },
            phone: Some("555-9999".into()),
            ..Default::default()
        };
        let profile = update_customer_profile(&pool, customer_id, &upd).await.unwrap();
        assert_eq!(profile.email, "ana.new@example.com");
        assert_eq!(profile.phone, "555-9999");
        assert_eq!(profile.username, "ana");
    }

    #[tokio::test]
    async fn profile_update_conflict_rolls_back_profile_row() {
        let pool = memory_pool().await;
        test_support::customer(&pool, "ana").await;
        let (_, bia) = test_support::customer(&pool, "bia").await;

        let upd = CustomerProfileUpdate {
            account: AccountUpdate {
                email: Some("ana@example.com".into()),
                ..Default::default()
            },
            name: Some("Renamed".into()),
            ..Default::default()
        };
        let err: AppError = update_customer_profile(&pool, bia, &upd)
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::AccountAlreadyExists);

        let profile = find_customer_profile(&pool, bia).await.unwrap().unwrap();
        assert_eq!(profile.name, "Customer bia");
        assert_eq!(profile.email, "bia@example.com");
    }

    #[tokio::test]
    async fn password_change_requires_current_password() {
        let pool = memory_pool().await;
        let (_, customer_id) = test_support::customer(&pool, "ana").await;

        let wrong = CustomerProfileUpdate {
            account: AccountUpdate {
                current_password: Some("nope".into()),
                new_password: Some("new-pw".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let err: AppError = update_customer_profile(&pool, customer_id, &wrong)
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);

        let right = CustomerProfileUpdate {
            account: AccountUpdate {
                current_password: Some("password".into()),
                new_password: Some("new-pw".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        update_customer_profile(&pool, customer_id, &right).await.unwrap();
        let creds = find_credentials(&pool, "ana").await.unwrap().unwrap();
        assert!(verify_password("new-pw", &creds.password_hash));
    }

    #[tokio::test]
    async fn restaurant_profile_update_returns_fresh_row() {
        let pool = memory_pool().await;
        let (_, restaurant_id) = test_support::restaurant(&pool, "cantina").await;

        let upd = RestaurantProfileUpdate {
            name: Some("Cantina Nova".into()),
            account: AccountUpdate {
                email: Some("nova@example.com".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let restaurant = update_restaurant_profile(&pool, restaurant_id, &upd)
            .await
            .unwrap();
        assert_eq!(restaurant.name, "Cantina Nova");
        assert_eq!(restaurant.email, "nova@example.com");
    }
}
