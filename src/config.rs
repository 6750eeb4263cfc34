//! Environment-based configuration accessors

use std::env;

/// Current deployment environment (defaults to "sandbox")
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// PostgreSQL connection string
pub fn get_database_url() -> String {
    env::var("DATABASE_URL")
        .unwrap_or_else(|_| "host=localhost user=ovotrix password=ovotrix dbname=ovotrix".to_string())
}

/// HTTP listen port (defaults to 8080)
pub fn get_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
}
