//! TetraKV - A Concurrent In-Memory Key-Value Store
//!
//! This is the main entry point for the TetraKV server. It parses the
//! listen address, sets up logging, and runs the server until Ctrl+C.

use tetrakv::Server;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server configuration
struct Config {
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: tetrakv::DEFAULT_HOST.to_string(),
            port: tetrakv::DEFAULT_PORT,
        }
    }
}

/// Outcomes of argument parsing that do not produce a running config.
#[derive(Debug, PartialEq)]
enum ParseError {
    Help,
    Version,
    Invalid(String),
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        match Self::parse(&args) {
            Ok(config) => config,
            Err(ParseError::Help) => {
                print_help();
                std::process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("TetraKV version {}", tetrakv::VERSION);
                std::process::exit(0);
            }
            Err(ParseError::Invalid(message)) => {
                eprintln!("Error: {}", message);
                print_help();
                std::process::exit(1);
            }
        }
    }

    fn parse(args: &[String]) -> Result<Self, ParseError> {
        let mut config = Config::default();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--host" => {
                    let value = args.get(i + 1).ok_or_else(|| {
                        ParseError::Invalid("--host requires a value".to_string())
                    })?;
                    config.host = value.clone();
                    i += 2;
                }
                "--port" | "-p" => {
                    let value = args.get(i + 1).ok_or_else(|| {
                        ParseError::Invalid("--port requires a value".to_string())
                    })?;
                    config.port = value.parse().map_err(|_| {
                        ParseError::Invalid(format!("invalid port number '{}'", value))
                    })?;
                    i += 2;
                }
                "--help" | "-h" => return Err(ParseError::Help),
                "--version" | "-v" => return Err(ParseError::Version),
                other => return Err(ParseError::Invalid(format!("unknown argument '{}'", other))),
            }
        }

        Ok(config)
    }

    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn print_help() {
    println!(
        r#"
TetraKV - A Concurrent In-Memory Key-Value Store

USAGE:
    tetrakv [OPTIONS]

OPTIONS:
        --host <HOST>    Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>    Port to listen on (default: 6969)
    -v, --version        Print version information
    -h, --help           Print this help message

EXAMPLES:
    tetrakv                        # Start on 127.0.0.1:6969
    tetrakv --port 7000            # Start on port 7000
    tetrakv --host 0.0.0.0         # Listen on all interfaces

CONNECTING:
    Use redis-cli or any compatible client:
    $ redis-cli -p 6969
    127.0.0.1:6969> PING
    PONG
    127.0.0.1:6969> SET name ada
    OK
    127.0.0.1:6969> GET name
    "ada"
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args();

    // Set up logging; RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let server = Server::bind(&config.bind_address()).await?;
    info!("TetraKV v{} listening on {}", tetrakv::VERSION, config.bind_address());

    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    server.run(shutdown).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_defaults() {
        let config = Config::parse(&[]).unwrap();
        assert_eq!(config.host, tetrakv::DEFAULT_HOST);
        assert_eq!(config.port, tetrakv::DEFAULT_PORT);
    }

    #[test]
    fn parse_host_and_port() {
        let config = Config::parse(&args(&["--host", "0.0.0.0", "-p", "7000"])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 7000);
    }

    #[test]
    fn short_h_means_help_not_host() {
        assert!(matches!(Config::parse(&args(&["-h"])), Err(ParseError::Help)));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!(
            Config::parse(&args(&["--port"])),
            Err(ParseError::Invalid(_))
        ));
        assert!(matches!(
            Config::parse(&args(&["--port", "zero"])),
            Err(ParseError::Invalid(_))
        ));
        assert!(matches!(
            Config::parse(&args(&["--wibble"])),
            Err(ParseError::Invalid(_))
        ));
    }
}
