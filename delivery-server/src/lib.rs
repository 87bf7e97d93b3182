//! Delivery marketplace server
//!
//! Customers browse storefronts, place orders from a single-restaurant cart,
//! settle at delivery and review completed orders. Restaurant operators move
//! orders through their lifecycle, keep their weekly hours and watch a
//! dashboard.
//!
//! ```text
//! delivery-server/src/
//! ├── api/      # axum routers and handlers
//! ├── auth/     # identity tokens and middleware
//! ├── db/       # sqlx pool, migrations, per-table queries
//! ├── config.rs # environment configuration
//! ├── error.rs  # ServiceError bridging storage and AppError
//! ├── state.rs  # shared handler state
//! └── time.rs   # business time zone helpers
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod state;
pub mod time;
pub mod util;

pub use config::Config;
pub use state::AppState;
