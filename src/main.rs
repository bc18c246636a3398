use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use rawhttp::{handlers, HttpServer, ServeDir, ServerConfig, ServerError};

#[derive(Parser)]
#[command(name = "rawhttpd")]
#[command(about = "A minimal HTTP/1.1 server with echo, user-agent and file routes", long_about = None)]
struct Cli {
    /// Directory to serve files from
    #[arg(long, default_value = "/tmp/data/codecrafters.io/http-server-tester/")]
    directory: PathBuf,

    /// Max accepted file size in bytes; uploads must also fit in one read of
    /// --read-buffer-size, so larger bodies get 400 before this limit applies
    #[arg(long, default_value_t = 1_000_000)]
    max_file_size: usize,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:4221")]
    addr: SocketAddr,

    /// Size of the single read each connection gets
    #[arg(long, default_value_t = 8192)]
    read_buffer_size: usize,

    /// JSON settings file; replaces all other options when given
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Everything the binary needs, as stored in a settings file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Settings {
    server: ServerConfig,
    files: ServeDir,
}

impl Settings {
    fn load(cli: Cli) -> Result<Self, ServerError> {
        if let Some(path) = cli.config {
            let raw = std::fs::read_to_string(&path)?;
            return Ok(serde_json::from_str(&raw)?);
        }

        Ok(Self {
            server: ServerConfig {
                addr: cli.addr,
                read_buffer_size: cli.read_buffer_size,
            },
            files: ServeDir::new(cli.directory, cli.max_file_size),
        })
    }

    /// The largest upload that can actually be written: a body must arrive
    /// within the single read each connection gets.
    fn effective_upload_limit(&self) -> usize {
        self.files.max_file_size.min(self.server.read_buffer_size)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load(Cli::parse())?;
    info!("server configured: {}", serde_json::to_string(&settings)?);
    if settings.effective_upload_limit() < settings.files.max_file_size {
        warn!(
            "max_file_size ({max}) exceeds read_buffer_size ({read}); uploads over {read} bytes get 400",
            max = settings.files.max_file_size,
            read = settings.server.read_buffer_size
        );
    }

    let router = handlers::routes(settings.files)?;
    let server = HttpServer::new(settings.server, router);
    server.start().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_limit_is_capped_by_read_buffer() {
        let settings = Settings::default();
        assert_eq!(settings.effective_upload_limit(), 8192);

        let settings: Settings = serde_json::from_str(
            r#"{"server": {"read_buffer_size": 65536}, "files": {"max_file_size": 1024}}"#,
        )
        .unwrap();
        assert_eq!(settings.effective_upload_limit(), 1024);
    }
}
