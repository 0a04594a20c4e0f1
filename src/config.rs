//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor de archivos con soporte para argumentos CLI y
//! variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./webroot-server --port 8080 --workers 10 /srv/www
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! WEBROOT_PORT=8080 WEBROOT_HOST=0.0.0.0 WEBROOT_DIR=/srv/www ./webroot-server
//! ```

use crate::error::StartError;
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

/// Puertos permitidos (0 pide un puerto efímero al sistema)
pub const MIN_PORT: u16 = 1024;
pub const MAX_PORT: u16 = 65535;

/// Configuración del servidor de archivos
#[derive(Debug, Clone, Parser)]
#[command(name = "webroot-server")]
#[command(about = "Servidor de archivos HTTP/1.0 concurrente sobre sockets TCP")]
#[command(version)]
pub struct ServerConfig {
    /// Directorio raíz que se sirve (webroot)
    #[arg(value_name = "ROOT_DIR", env = "WEBROOT_DIR")]
    pub root_dir: PathBuf,

    /// Puerto en el que escucha el servidor (1024-65535, 0 = efímero)
    #[arg(short, long, default_value = "8080", env = "WEBROOT_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "WEBROOT_HOST")]
    pub host: String,

    /// Máximo de conexiones atendidas a la vez
    #[arg(short = 'w', long = "workers", default_value = "10", env = "WEBROOT_WORKERS")]
    pub max_workers: usize,

    // === Timeouts ===

    /// Timeout de lectura del socket en milisegundos (0 = sin timeout)
    #[arg(long = "read-timeout-ms", default_value = "30000", env = "WEBROOT_READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Timeout de escritura del socket en milisegundos (0 = sin timeout)
    #[arg(long = "write-timeout-ms", default_value = "30000", env = "WEBROOT_WRITE_TIMEOUT_MS")]
    pub write_timeout_ms: u64,

    // === Salida ===

    /// Nivel de log (error, warn, info, debug, trace, off)
    #[arg(long = "log-level", default_value = "info", env = "WEBROOT_LOG_LEVEL")]
    pub log_level: LevelFilter,

    /// Imprime los eventos como líneas JSON en stdout
    #[arg(long = "json-events")]
    pub json_events: bool,
}

impl ServerConfig {
    /// Parsea argumentos CLI y variables de entorno
    pub fn from_args() -> Self {
        ServerConfig::parse()
    }

    /// Configuración por defecto sirviendo `root_dir` en `port`
    ///
    /// # Ejemplo
    /// ```rust
    /// use webroot_server::config::ServerConfig;
    ///
    /// let config = ServerConfig::new(9000, "/srv/www");
    /// assert_eq!(config.address(), "127.0.0.1:9000");
    /// assert_eq!(config.max_workers, 10);
    /// ```
    pub fn new(port: u16, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            port,
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    /// Obtiene la dirección completa para bind (host:port)
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }

    /// Valida la configuración
    ///
    /// Revisa el puerto, la cantidad de workers y que el webroot exista y
    /// sea un directorio.
    pub fn validate(&self) -> Result<(), StartError> {
        if self.port != 0 && self.port < MIN_PORT {
            return Err(StartError::InvalidPort(self.port));
        }

        if self.max_workers == 0 {
            return Err(StartError::InvalidWorkers);
        }

        match std::fs::metadata(&self.root_dir) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StartError::InvalidRoot {
                path: self.root_dir.clone(),
                reason: "not a directory".to_string(),
            }),
            Err(e) => Err(StartError::InvalidRoot {
                path: self.root_dir.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║             Webroot HTTP/1.0 Server Configuration            ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:        {}", self.address());
        println!("   Webroot:        {}", self.root_dir.display());
        println!();
        println!("👷 Workers:");
        println!("   Max workers:    {}", self.max_workers);
        println!("   Read timeout:   {}", describe_timeout(self.read_timeout_ms));
        println!("   Write timeout:  {}", describe_timeout(self.write_timeout_ms));
        println!();
        println!("📋 Output:");
        println!("   Log level:      {}", self.log_level);
        println!(
            "   Events:         {}",
            if self.json_events { "JSON lines" } else { "text" }
        );
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            port: 8080,
            host: "127.0.0.1".to_string(),
            max_workers: 10,
            read_timeout_ms: 30_000,
            write_timeout_ms: 30_000,
            log_level: LevelFilter::Info,
            json_events: false,
        }
    }
}

fn millis(ms: u64) -> Option<Duration> {
    if ms == 0 {
        None
    } else {
        Some(Duration::from_millis(ms))
    }
}

fn describe_timeout(ms: u64) -> String {
    if ms == 0 {
        "disabled".to_string()
    } else {
        format!("{} ms", ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir) -> ServerConfig {
        ServerConfig::new(8080, dir.path())
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.max_workers, 10);
        assert_eq!(config.read_timeout_ms, 30_000);
        assert_eq!(config.write_timeout_ms, 30_000);
        assert_eq!(config.log_level, LevelFilter::Info);
        assert!(!config.json_events);
    }

    #[test]
    fn test_address() {
        let config = ServerConfig::default();
        assert_eq!(config.address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_address_custom() {
        let mut config = ServerConfig::default();
        config.host = "0.0.0.0".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_timeouts() {
        let mut config = ServerConfig::default();
        assert_eq!(config.read_timeout(), Some(Duration::from_secs(30)));

        config.read_timeout_ms = 0;
        config.write_timeout_ms = 250;
        assert_eq!(config.read_timeout(), None);
        assert_eq!(config.write_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_validate_success() {
        let dir = TempDir::new().unwrap();
        assert!(config_for(&dir).validate().is_ok());
    }

    // ==================== Port Validation ====================

    #[test]
    fn test_validate_privileged_port() {
        let dir = TempDir::new().unwrap();
        let mut config = config_for(&dir);
        config.port = 80;
        assert!(matches!(config.validate(), Err(StartError::InvalidPort(80))));
    }

    #[test]
    fn test_validate_port_bounds() {
        let dir = TempDir::new().unwrap();
        let mut config = config_for(&dir);

        config.port = 1023;
        assert!(config.validate().is_err());
        config.port = MIN_PORT;
        assert!(config.validate().is_ok());
        config.port = MAX_PORT;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_ephemeral_port() {
        let dir = TempDir::new().unwrap();
        let mut config = config_for(&dir);
        config.port = 0;
        assert!(config.validate().is_ok());
    }

    // ==================== Workers Validation ====================

    #[test]
    fn test_validate_invalid_workers() {
        let dir = TempDir::new().unwrap();
        let mut config = config_for(&dir);
        config.max_workers = 0;
        assert!(matches!(config.validate(), Err(StartError::InvalidWorkers)));
    }

    // ==================== Webroot Validation ====================

    #[test]
    fn test_validate_missing_root() {
        let dir = TempDir::new().unwrap();
        let config = ServerConfig::new(8080, dir.path().join("missing"));
        match config.validate() {
            Err(StartError::InvalidRoot { path, .. }) => {
                assert!(path.ends_with("missing"));
            }
            other => panic!("expected InvalidRoot, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_root_is_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("index.html");
        std::fs::write(&file, b"hi").unwrap();

        let config = ServerConfig::new(8080, &file);
        match config.validate() {
            Err(StartError::InvalidRoot { reason, .. }) => {
                assert_eq!(reason, "not a directory");
            }
            other => panic!("expected InvalidRoot, got {:?}", other),
        }
    }

    // ==================== CLI ====================

    #[test]
    fn test_parse_cli() {
        let config = ServerConfig::try_parse_from([
            "webroot-server",
            "--port",
            "9090",
            "--workers",
            "4",
            "--read-timeout-ms",
            "0",
            "--log-level",
            "debug",
            "--json-events",
            "/srv/www",
        ])
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.max_workers, 4);
        assert_eq!(config.read_timeout(), None);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert!(config.json_events);
        assert_eq!(config.root_dir, PathBuf::from("/srv/www"));
    }

    #[test]
    fn test_parse_cli_rejects_bad_port() {
        let result = ServerConfig::try_parse_from(["webroot-server", "--port", "70000", "/srv"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_describe_timeout() {
        assert_eq!(describe_timeout(0), "disabled");
        assert_eq!(describe_timeout(1500), "1500 ms");
    }
}
