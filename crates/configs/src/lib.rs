use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Peer inventory service; only read by the billing service.
    #[serde(default)]
    pub inventory: PeerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default)]
    pub json_logs: bool,
    #[serde(default)]
    pub seed_demo_data: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            worker_threads: Some(4),
            json_logs: false,
            seed_demo_data: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

/// Address of a peer service. Resolution (service discovery) happens outside
/// this process; the resolved base url is configured here.
#[derive(Debug, Clone, Deserialize)]
pub struct PeerConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_peer_timeout")]
    pub timeout_ms: u64,
}

impl Default for PeerConfig {
    fn default() -> Self { Self { base_url: String::new(), timeout_ms: default_peer_timeout() } }
}

fn default_peer_timeout() -> u64 { 5000 }

/// Config file for a named service: `CONFIG_PATH` wins, else `config/<service>.toml`.
pub fn config_path_for(service: &str) -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| format!("config/{service}.toml"))
}

/// `Ok(None)` only when the file does not exist; unreadable or malformed
/// files are errors.
pub fn load_optional(path: &str) -> Result<Option<AppConfig>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(anyhow!("cannot read {path}: {e}")),
    };
    let cfg: AppConfig = toml::from_str(&content).map_err(|e| anyhow!("malformed {path}: {e}"))?;
    Ok(Some(cfg))
}

impl AppConfig {
    /// Configuration when no file is available: `SERVER_HOST`, `SERVER_PORT`,
    /// `DATABASE_URL` and `INVENTORY_BASE_URL`.
    pub fn from_env(default_port: u16) -> Self {
        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(default_port);
        let mut cfg = AppConfig {
            server: ServerConfig { host, port, ..ServerConfig::default() },
            ..AppConfig::default()
        };
        cfg.database.normalize_from_env();
        cfg.inventory.normalize_from_env();
        cfg
    }
}

impl ServerConfig {
    pub fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in the config file or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        let supported = ["postgresql://", "postgres://", "sqlite:"];
        if !supported.iter().any(|scheme| lower.starts_with(scheme)) {
            return Err(anyhow!(
                "database.url must start with postgres://, postgresql:// or sqlite:"
            ));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl PeerConfig {
    pub fn normalize_from_env(&mut self) {
        if self.base_url.trim().is_empty() {
            if let Ok(url) = std::env::var("INVENTORY_BASE_URL") {
                self.base_url = url;
            }
        }
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        let lower = self.base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("{name}.base_url must start with http(s)"));
        }
        if self.timeout_ms == 0 {
            return Err(anyhow!("{name}.timeout_ms must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let cfg: AppConfig = toml::from_str(r#"
            [server]
            host = "0.0.0.0"
            port = 8083
            json_logs = true

            [database]
            url = "sqlite::memory:"
            min_connections = 1

            [inventory]
            base_url = "http://127.0.0.1:8082"
            timeout_ms = 1500
        "#).unwrap();
        assert_eq!(cfg.server.port, 8083);
        assert!(cfg.server.json_logs);
        assert!(!cfg.server.seed_demo_data);
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.inventory.timeout_ms, 1500);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.inventory.timeout_ms, 5000);
        assert_eq!(cfg.database.min_connections, 2);
    }

    fn scratch_file(name: &str, content: &str) -> String {
        let path = std::env::temp_dir().join(format!("configs-{}-{name}", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn optional_load_distinguishes_missing_from_malformed() {
        assert!(load_optional("/definitely/not/here/service.toml").unwrap().is_none());

        let good = scratch_file("good.toml", "[server]\nhost = \"0.0.0.0\"\nport = 9001\n");
        assert_eq!(load_optional(&good).unwrap().map(|c| c.server.port), Some(9001));

        let bad = scratch_file("bad.toml", "[server\nport = \"nine\"");
        assert!(load_optional(&bad).is_err());
        let _ = std::fs::remove_file(good);
        let _ = std::fs::remove_file(bad);
    }

    #[test]
    fn normalize_fills_worker_threads_and_host() {
        let mut s = ServerConfig { host: " ".into(), port: 1, worker_threads: Some(0), json_logs: false, seed_demo_data: false };
        s.normalize().unwrap();
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.worker_threads, Some(4));
    }

    #[test]
    fn zero_port_rejected() {
        let mut s = ServerConfig { port: 0, ..ServerConfig::default() };
        assert!(s.normalize().is_err());
    }

    #[test]
    fn database_validation() {
        let ok = DatabaseConfig { url: "postgres://u:p@localhost/db".into(), ..DatabaseConfig::default() };
        assert!(ok.validate().is_ok());
        let sqlite = DatabaseConfig { url: "sqlite::memory:".into(), ..DatabaseConfig::default() };
        assert!(sqlite.validate().is_ok());
        let bad_scheme = DatabaseConfig { url: "mysql://localhost".into(), ..DatabaseConfig::default() };
        assert!(bad_scheme.validate().is_err());
        let bad_pool = DatabaseConfig { url: "sqlite::memory:".into(), min_connections: 5, max_connections: 2, ..DatabaseConfig::default() };
        assert!(bad_pool.validate().is_err());
        let zero_min = DatabaseConfig { url: "sqlite::memory:".into(), min_connections: 0, ..DatabaseConfig::default() };
        assert!(zero_min.validate().is_err());
    }

    #[test]
    fn peer_validation() {
        assert!(PeerConfig { base_url: "http://inventory:8082".into(), timeout_ms: 10 }.validate("inventory").is_ok());
        assert!(PeerConfig { base_url: "inventory:8082".into(), timeout_ms: 10 }.validate("inventory").is_err());
        assert!(PeerConfig { base_url: "http://inventory".into(), timeout_ms: 0 }.validate("inventory").is_err());
    }
}
