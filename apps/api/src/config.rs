use anyhow::{bail, Context, Result};

/// Signing secret substituted only when `APP_ENV=development` and `JWT_SECRET` is unset.
const DEV_JWT_SECRET: &str = "clubnexus-development-secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("production") | Some("prod") => Ok(AppEnv::Production),
            Some("development") | Some("dev") => Ok(AppEnv::Development),
            Some(other) => bail!("APP_ENV must be 'development' or 'production', got '{other}'"),
        }
    }
}

/// Credentials for the admin account ensured at startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub name: String,
    pub club_name: String,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    /// True when the development secret stands in for an unset `JWT_SECRET`.
    pub jwt_secret_is_fallback: bool,
    pub app_env: AppEnv,
    pub port: u16,
    pub rust_log: String,
    pub admin_seed: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let app_env = AppEnv::parse(optional_env("APP_ENV").as_deref())?;
        let (jwt_secret, jwt_secret_is_fallback) =
            resolve_jwt_secret(optional_env("JWT_SECRET"), app_env)?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            database_max_connections: optional_env("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".to_string())
                .parse::<u32>()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            jwt_secret,
            jwt_secret_is_fallback,
            app_env,
            port: optional_env("PORT")
                .unwrap_or_else(|| "5001".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            admin_seed: admin_seed_from(
                optional_env("SEED_ADMIN_EMAIL"),
                optional_env("SEED_ADMIN_PASSWORD"),
                optional_env("SEED_ADMIN_NAME"),
                optional_env("SEED_ADMIN_CLUB"),
            ),
        })
    }
}

/// Picks the token signing secret. Only development may run without one.
fn resolve_jwt_secret(value: Option<String>, env: AppEnv) -> Result<(String, bool)> {
    match (value, env) {
        (Some(secret), _) => Ok((secret, false)),
        (None, AppEnv::Development) => Ok((DEV_JWT_SECRET.to_string(), true)),
        (None, AppEnv::Production) => {
            bail!("Required environment variable 'JWT_SECRET' is not set")
        }
    }
}

fn admin_seed_from(
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
    club_name: Option<String>,
) -> Option<AdminSeed> {
    let (email, password) = (email?, password?);
    Some(AdminSeed {
        email,
        password,
        name: name.unwrap_or_else(|| "Super Admin".to_string()),
        club_name: club_name.unwrap_or_else(|| "General Admin".to_string()),
    })
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads a variable, treating an empty value as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_secret_wins() {
        let (secret, fallback) =
            resolve_jwt_secret(Some("s3cret".into()), AppEnv::Production).unwrap();
        assert_eq!(secret, "s3cret");
        assert!(!fallback);
    }

    #[test]
    fn test_missing_secret_fails_outside_development() {
        let err = resolve_jwt_secret(None, AppEnv::Production).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_missing_secret_in_development_uses_flagged_fallback() {
        let (secret, fallback) = resolve_jwt_secret(None, AppEnv::Development).unwrap();
        assert_eq!(secret, DEV_JWT_SECRET);
        assert!(fallback);
    }

    #[test]
    fn test_app_env_parsing() {
        assert_eq!(AppEnv::parse(None).unwrap(), AppEnv::Production);
        assert_eq!(AppEnv::parse(Some("dev")).unwrap(), AppEnv::Development);
        assert_eq!(
            AppEnv::parse(Some("development")).unwrap(),
            AppEnv::Development
        );
        assert!(AppEnv::parse(Some("staging")).is_err());
    }

    #[test]
    fn test_admin_seed_needs_email_and_password() {
        assert!(admin_seed_from(Some("a@b.c".into()), None, None, None).is_none());
        let seed = admin_seed_from(Some("a@b.c".into()), Some("pw".into()), None, None).unwrap();
        assert_eq!(seed.name, "Super Admin");
        assert_eq!(seed.club_name, "General Admin");
    }
}
