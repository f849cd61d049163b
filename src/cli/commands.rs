// RKSOK — CLI Command Handlers
//
// `serve` resolves the configuration, opens the selected phonebook backend,
// and runs the TCP gateway. `send` is a minimal client for poking at a
// running gateway.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::{GatewayConfig, StorageBackend, StorageConfig};
use crate::error::RksokError;
use crate::gateway::{Gateway, GatewayServer, Message, Verb};
use crate::store::{
    FilePhonebookStore, MemoryPhonebookStore, PhonebookStore, ReadOnlyStore, SqlitePhonebookStore,
};

use super::{Commands, ServeArgs};

/// How long `send` waits for the gateway's answer.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Execute the parsed CLI command.
pub async fn execute(command: Commands) -> Result<(), RksokError> {
    match command {
        Commands::Serve(args) => cmd_serve(args).await,
        Commands::Send {
            addr,
            verb,
            name,
            payload,
        } => cmd_send(addr, verb.into(), name, payload).await,
    }
}

// ─── Serve ───────────────────────────────────────────────────────────────────

async fn cmd_serve(args: ServeArgs) -> Result<(), RksokError> {
    let config = resolve_config(args)?;
    let store = open_store(&config.storage)?;

    let gateway = Gateway::from_config(&config, store);
    let server = GatewayServer::new(config.listen.clone(), gateway);
    server.run().await?;

    Ok(())
}

/// Layer the CLI flags over the config file (or the defaults) and validate.
pub fn resolve_config(args: ServeArgs) -> Result<GatewayConfig, RksokError> {
    let mut config = match &args.config {
        Some(path) => GatewayConfig::load(path)?,
        None => GatewayConfig::default(),
    };

    if let Some(listen) = args.listen {
        config.listen = listen;
    }
    if let Some(authority) = args.authority {
        config.authority = authority;
    }
    if let Some(backend) = args.storage {
        config.storage.backend = backend;
    }
    if let Some(path) = args.storage_path {
        config.storage.path = Some(path);
    }
    if args.read_only {
        config.storage.read_only = true;
    }
    if let Some(secs) = args.frame_timeout {
        config.frame_timeout_secs = secs;
    }
    if let Some(secs) = args.authority_timeout {
        config.authority_timeout_secs = secs;
    }

    config.validate()?;
    Ok(config)
}

/// Open the configured phonebook backend.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn PhonebookStore>, RksokError> {
    let store: Arc<dyn PhonebookStore> = match config.backend {
        StorageBackend::Sql => Arc::new(SqlitePhonebookStore::new(config.resolved_path())?),
        StorageBackend::Files => Arc::new(FilePhonebookStore::new(config.resolved_path())?),
        StorageBackend::Memory => Arc::new(MemoryPhonebookStore::new()),
    };

    if config.read_only {
        tracing::info!("Phonebook opened read-only");
        return Ok(Arc::new(ReadOnlyStore::new(store)));
    }
    Ok(store)
}

// ─── Send ────────────────────────────────────────────────────────────────────

async fn cmd_send(addr: String, verb: Verb, name: String, payload: String) -> Result<(), RksokError> {
    let frame = Message::new(verb, name, payload).to_frame();

    let reply = tokio::time::timeout(SEND_TIMEOUT, async {
        let mut stream = TcpStream::connect(&addr).await?;
        stream.write_all(frame.as_bytes()).await?;
        stream.flush().await?;

        let mut reply = Vec::new();
        stream.read_to_end(&mut reply).await?;
        Ok::<_, std::io::Error>(reply)
    })
    .await
    .map_err(|_| RksokError::Other(format!("No response from {} within {:?}", addr, SEND_TIMEOUT)))??;

    print!("{}", String::from_utf8_lossy(&reply));
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_config_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rksok.json");
        std::fs::write(
            &path,
            r#"{"listen":"127.0.0.1:8000","authority":"127.0.0.1:9000","frame_timeout_secs":3}"#,
        )
        .unwrap();

        let config = resolve_config(ServeArgs {
            config: Some(path),
            authority: Some("127.0.0.1:9100".to_string()),
            storage: Some(StorageBackend::Memory),
            read_only: true,
            ..ServeArgs::default()
        })
        .unwrap();

        assert_eq!(config.listen, "127.0.0.1:8000");
        assert_eq!(config.authority, "127.0.0.1:9100");
        assert_eq!(config.frame_timeout_secs, 3);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.storage.read_only);
    }

    #[test]
    fn test_resolve_config_rejects_invalid_flags() {
        let result = resolve_config(ServeArgs {
            listen: Some("not-an-address".to_string()),
            ..ServeArgs::default()
        });
        assert!(matches!(result, Err(RksokError::Config(_))));
    }

    #[test]
    fn test_open_each_backend() {
        let dir = tempfile::tempdir().unwrap();

        for (backend, path) in [
            (StorageBackend::Sql, dir.path().join("rksok.db")),
            (StorageBackend::Files, dir.path().join("phonebook")),
            (StorageBackend::Memory, dir.path().join("unused")),
        ] {
            let store = open_store(&StorageConfig {
                backend,
                path: Some(path),
                read_only: false,
            })
            .unwrap();

            store.write("ivan", "+1-555-0100").unwrap();
            assert_eq!(
                store.fetch("ivan").unwrap().as_deref(),
                Some("+1-555-0100"),
                "{:?}",
                backend
            );
        }
    }

    #[test]
    fn test_open_read_only() {
        let store = open_store(&StorageConfig {
            backend: StorageBackend::Memory,
            path: None,
            read_only: true,
        })
        .unwrap();
        assert!(!store.supports(crate::store::Capability::Write));
    }
}
