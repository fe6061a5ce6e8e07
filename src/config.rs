use std::env;
use std::io;
use std::path::PathBuf;

/// Who may update or delete a product once it exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPolicy {
    /// Any authenticated user may mutate any product.
    AnyAuthenticated,
    /// Only the user referenced by the product's `farmerId` may mutate it.
    OwnerOnly,
}

impl MutationPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "any" => Some(MutationPolicy::AnyAuthenticated),
            "owner" => Some(MutationPolicy::OwnerOnly),
            _ => None,
        }
    }
}

pub struct Config {
    /// Postgres connection string. When unset the in-memory store is used.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub upload_dir: PathBuf,
    pub max_image_bytes: usize,
    pub mutation_policy: MutationPolicy,
}

impl Config {
    pub fn from_env() -> io::Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> io::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| invalid("JWT_SECRET must be set"))?;

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(invalid("BCRYPT_COST must be between 4 and 31"));
        }

        let token_ttl_hours: i64 = parse_or(&lookup, "JWT_TTL_HOURS", 24)?;
        if token_ttl_hours <= 0 {
            return Err(invalid("JWT_TTL_HOURS must be positive"));
        }

        let mutation_policy = match lookup("PRODUCT_MUTATION_POLICY") {
            Some(value) => MutationPolicy::parse(&value)
                .ok_or_else(|| invalid("PRODUCT_MUTATION_POLICY must be 'any' or 'owner'"))?,
            None => MutationPolicy::AnyAuthenticated,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            token_ttl_hours,
            bcrypt_cost,
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            max_image_bytes: parse_or(&lookup, "MAX_IMAGE_BYTES", 5 * 1024 * 1024)?,
            mutation_policy,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> io::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid(&format!("{} must be a number", key))),
        None => Ok(default),
    }
}

fn invalid(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message.to_string())
}
