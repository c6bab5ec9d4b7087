use std::path::PathBuf;
use std::time::Duration;

/// Which routes require a logged-in session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPolicy {
    /// Nothing is guarded.
    Open,
    /// POST/PUT/DELETE on the recipe API require a session.
    Mutations,
    /// Reads and the landing page are guarded too.
    Full,
}

impl GuardPolicy {
    fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "open" => Ok(Self::Open),
            "mutations" => Ok(Self::Mutations),
            "full" => Ok(Self::Full),
            other => anyhow::bail!("unknown GUARD_POLICY {other:?} (expected open|mutations|full)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string; when unset the flat-file store is used.
    pub database_url: Option<String>,
    pub data_file: PathBuf,
    pub guard: GuardPolicy,
    pub session_ttl: Duration,
    /// Mounts GET /crear-admin when set; the route does not exist otherwise.
    pub bootstrap_admin: bool,
    pub admin_password: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        let data_file = std::env::var("DATA_FILE")
            .unwrap_or_else(|_| "recetas.json".into())
            .into();
        let guard = match std::env::var("GUARD_POLICY") {
            Ok(v) => GuardPolicy::parse(&v)?,
            Err(_) => GuardPolicy::Mutations,
        };
        let session_ttl_minutes = std::env::var("SESSION_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60 * 24);
        let bootstrap_admin = std::env::var("BOOTSTRAP_ADMIN")
            .map(|v| v == "1" || v == "true")
            .unwrap_or(false);
        let admin_password = std::env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty());
        if bootstrap_admin && admin_password.is_none() {
            anyhow::bail!("BOOTSTRAP_ADMIN is set but ADMIN_PASSWORD is not");
        }
        Ok(Self {
            database_url,
            data_file,
            guard,
            session_ttl: Duration::from_secs(session_ttl_minutes * 60),
            bootstrap_admin,
            admin_password,
        })
    }
}
