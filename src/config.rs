use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::Deserialize;

/// Environment variable naming the YAML configuration file.
pub const CONFIG_ENV: &str = "DOCSERVER_CONFIG";
/// Environment variable overriding `server.listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub tls: TlsSettings,
    pub static_files: StaticFilesSettings,
    pub access_log: AccessLogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub listen_addr: String,
    /// Sent in the `Server:` header and in page footers.
    pub server_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TlsSettings {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesSettings {
    pub document_root: PathBuf,
    /// Identifier served for `GET /`.
    pub default_resource: String,
    /// Chunk size used when streaming file bodies.
    pub buffer_size: usize,
    pub mime_types: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccessLogSettings {
    pub directory: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8443".to_string(),
            server_name: "docserver".to_string(),
        }
    }
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            cert_path: PathBuf::from("./etc/cert.pem"),
            key_path: PathBuf::from("./etc/key.pem"),
        }
    }
}

impl Default for StaticFilesSettings {
    fn default() -> Self {
        Self {
            document_root: PathBuf::from("./html"),
            default_resource: "/index.html".to_string(),
            buffer_size: 2048,
            mime_types: PathBuf::from("./docs/mime.types"),
        }
    }
}

impl Default for AccessLogSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./logs"),
        }
    }
}

impl Config {
    /// Loads the configuration from the process environment.
    ///
    /// Reads the YAML file named by `DOCSERVER_CONFIG` if set, otherwise
    /// starts from defaults, then applies the `LISTEN` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Applies environment-style overrides through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(LISTEN_ENV) {
            self.server.listen_addr = addr;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.listen_socket_addr()?;

        if self.static_files.buffer_size == 0 {
            bail!("static_files.buffer_size must be greater than zero");
        }
        if !self.static_files.default_resource.starts_with('/') {
            bail!(
                "static_files.default_resource must start with '/': {}",
                self.static_files.default_resource
            );
        }
        Ok(())
    }

    pub fn listen_socket_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .listen_addr
            .parse()
            .with_context(|| format!("invalid listen address {}", self.server.listen_addr))
    }
}
