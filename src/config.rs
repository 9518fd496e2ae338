use log::info;
use std::env;
use std::path::PathBuf;

pub struct Config {
    pub bind_addr: String,
    /// Database directory; a temporary database is used when unset.
    pub db_path: Option<PathBuf>,
    pub session_key: [u8; 32],
}

impl Config {
    pub fn from_env() -> Config {
        let bind_addr = env::var("CINEMAPULSE_BIND").unwrap_or_else(|_| {
            info!("CINEMAPULSE_BIND not set, using default 127.0.0.1:8080");
            "127.0.0.1:8080".to_owned()
        });
        let db_path = env::var_os("CINEMAPULSE_DB").map(PathBuf::from);
        if db_path.is_none() {
            info!("CINEMAPULSE_DB not set, using a temporary database");
        }
        let mut session_key = [0u8; 32];
        if let Ok(key) = env::var("CINEMAPULSE_SESSION_KEY") {
            let bytes = key.as_bytes();
            let n = bytes.len().min(session_key.len());
            session_key[..n].copy_from_slice(&bytes[..n]);
        }
        Config {
            bind_addr,
            db_path,
            session_key,
        }
    }
}
