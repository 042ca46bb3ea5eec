//! Process-wide configuration, resolved once at startup from environment
//! variables with sensible local defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

pub const APP_NAME: &str = "Clinivault";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "clinivault=info,tower_http=info"
}

/// Application data directory: `$CLINIVAULT_DATA_DIR` or `~/.clinivault`.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CLINIVAULT_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(".clinivault")
}

/// SQLite database file.
pub fn db_path() -> PathBuf {
    data_dir().join("clinivault.db")
}

/// Root directory for uploaded document blobs.
pub fn uploads_dir() -> PathBuf {
    data_dir().join("uploads")
}

/// Listen address: `$CLINIVAULT_ADDR` or `127.0.0.1:8080`.
pub fn bind_addr() -> SocketAddr {
    if let Ok(raw) = std::env::var("CLINIVAULT_ADDR") {
        match raw.parse() {
            Ok(addr) => return addr,
            Err(_) => tracing::warn!(%raw, "CLINIVAULT_ADDR is not a valid socket address, using default"),
        }
    }
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

/// Allowed CORS origin for the browser frontend.
pub fn cors_origin() -> String {
    std::env::var("CLINIVAULT_CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// External ledger endpoint. `None` selects the stub ledger.
pub fn ledger_url() -> Option<String> {
    std::env::var("CLINIVAULT_LEDGER_URL").ok().filter(|s| !s.is_empty())
}

/// Token-signing secret: `$CLINIVAULT_TOKEN_SECRET` (32 bytes, base64).
///
/// Falls back to a random per-process secret, which invalidates all
/// outstanding tokens on restart.
pub fn token_secret() -> [u8; 32] {
    use base64::Engine;

    match std::env::var("CLINIVAULT_TOKEN_SECRET") {
        Ok(encoded) => {
            if let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(&encoded) {
                if let Ok(secret) = <[u8; 32]>::try_from(bytes.as_slice()) {
                    return secret;
                }
            }
            tracing::warn!(
                "CLINIVAULT_TOKEN_SECRET is not 32 base64-encoded bytes, generating a per-process secret"
            );
        }
        Err(_) => {
            tracing::warn!("CLINIVAULT_TOKEN_SECRET not set, tokens will not survive a restart");
        }
    }
    rand::random()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_path_under_data_dir() {
        let db = db_path();
        assert!(db.starts_with(data_dir()));
        assert!(db.ends_with("clinivault.db"));
    }

    #[test]
    fn uploads_dir_under_data_dir() {
        let uploads = uploads_dir();
        assert!(uploads.starts_with(data_dir()));
        assert!(uploads.ends_with("uploads"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn default_cors_origin_is_localhost() {
        if std::env::var("CLINIVAULT_CORS_ORIGIN").is_err() {
            assert_eq!(cors_origin(), "http://localhost:3000");
        }
    }
}
