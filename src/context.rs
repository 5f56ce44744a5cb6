//! Services shared by every connection task.
//!
//! Built once at startup, then handed to the listener behind an `Arc`.
//! Nothing in here is mutated after construction except the access log,
//! which serializes its own appends.

use std::path::PathBuf;
use std::sync::Arc;

use crate::access_log::AccessLog;
use crate::config::Config;
use crate::http::error_page::ErrorResponder;
use crate::http::mime::MimeTable;

/// Per-request settings taken from the configuration.
#[derive(Debug, Clone)]
pub struct ServeSettings {
    pub document_root: PathBuf,
    pub default_resource: String,
    pub buffer_size: usize,
    pub server_name: String,
}

impl ServeSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            document_root: cfg.static_files.document_root.clone(),
            default_resource: cfg.static_files.default_resource.clone(),
            buffer_size: cfg.static_files.buffer_size,
            server_name: cfg.server.server_name.clone(),
        }
    }
}

#[derive(Debug)]
pub struct ServeContext {
    pub settings: ServeSettings,
    pub mime: MimeTable,
    pub access_log: Arc<AccessLog>,
    pub errors: ErrorResponder,
}

impl ServeContext {
    pub fn new(settings: ServeSettings, mime: MimeTable, access_log: AccessLog) -> Self {
        let access_log = Arc::new(access_log);
        let errors = ErrorResponder::new(settings.server_name.clone(), Arc::clone(&access_log));
        Self {
            settings,
            mime,
            access_log,
            errors,
        }
    }

    /// Loads the mime table and opens the access log named by `cfg`.
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let mime = MimeTable::load(&cfg.static_files.mime_types)?;
        tracing::info!(
            path = %cfg.static_files.mime_types.display(),
            extensions = mime.len(),
            "Loaded mime table"
        );

        let access_log = AccessLog::open(&cfg.access_log.directory)?;
        Ok(Self::new(ServeSettings::from_config(cfg), mime, access_log))
    }
}
