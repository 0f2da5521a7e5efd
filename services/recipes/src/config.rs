use std::path::PathBuf;

/// Recipes service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct RecipesConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HS256 signing key for auth tokens.
    pub jwt_secret: String,
    /// TCP port for the HTTP server (default 3114). Env var: `RECIPES_PORT`.
    pub port: u16,
    /// Directory holding uploaded images (default `./media`). Env var: `MEDIA_ROOT`.
    pub media_root: PathBuf,
    /// Origin used to build absolute media, pagination, and short-link URLs.
    /// Env var: `PUBLIC_URL` (default `http://localhost:<port>`).
    pub public_url: String,
    /// Token lifetime in seconds (default 30 days). Env var: `TOKEN_TTL_SECS`.
    pub token_ttl_secs: u64,
}

impl RecipesConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("RECIPES_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3114);
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            port,
            media_root: std::env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./media")),
            public_url: std::env::var("PUBLIC_URL")
                .map(|v| v.trim_end_matches('/').to_owned())
                .unwrap_or_else(|_| format!("http://localhost:{port}")),
            token_ttl_secs: std::env::var("TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30 * 24 * 60 * 60),
        }
    }

    /// Absolute URL of a stored media path.
    pub fn media_url(&self, path: &str) -> String {
        format!("{}/media/{path}", self.public_url)
    }
}
