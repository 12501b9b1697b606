//! Interactive QTGP demo.
//!
//! Run mode comes from `QTGP_MODE` (`server` or `client`) or an
//! interactive prompt. The client reads the server host from
//! `config.json` (`{"host": "..."}`), falling back to localhost.

use std::io::{self, Write};
use std::net::{SocketAddr, ToSocketAddrs};

use qtgp::{
    load_config, ClientConfig, GameClient, GameServer, QtgpError,
    DEFAULT_PORT,
};

const CONFIG_PATH: &str = "config.json";

#[tokio::main]
async fn main() -> Result<(), QtgpError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mode = match std::env::var("QTGP_MODE") {
        Ok(mode) => mode,
        Err(_) => prompt("Run as [server/client]? "),
    };

    match mode.trim() {
        "server" => run_server().await,
        "client" => run_client().await,
        other => {
            eprintln!("unknown mode {other:?}, expected server or client");
            Ok(())
        }
    }
}

async fn run_server() -> Result<(), QtgpError> {
    let addr: SocketAddr = ([0, 0, 0, 0], DEFAULT_PORT).into();
    let server = GameServer::bind(addr)?;
    println!("Serving QTGP on {}", server.local_addr()?);
    server.run().await
}

async fn run_client() -> Result<(), QtgpError> {
    let config = load_config(CONFIG_PATH).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "no usable config, using defaults");
        ClientConfig::default()
    });

    let addr = resolve(&config.host)?;
    let mut client = GameClient::connect(addr).await?;
    println!("Connected to {addr}");

    loop {
        println!();
        println!("1) Start Game");
        println!("2) Make Move");
        println!("3) Resync");
        println!("4) Quit");
        let choice = prompt("> ");

        let result = match choice.trim() {
            "1" => {
                let player = prompt("Player name: ");
                let game = prompt("Game id: ");
                client
                    .join_game(player.trim(), game.trim(), 1)
                    .await
                    .map(|ack| {
                        println!(
                            "Joined (status {}, options {})",
                            ack.status, ack.agreed_options
                        );
                    })
            }
            "2" => {
                let state = prompt("Game state: ");
                client.make_move(state.trim()).await.map(|_| {
                    println!("Move acknowledged");
                })
            }
            "3" => client.resync().await.map(|_| {
                println!("Resync acknowledged");
            }),
            "4" => {
                client.close();
                println!("Bye");
                return Ok(());
            }
            other => {
                println!("Unknown choice {other:?}");
                continue;
            }
        };

        if let Err(e) = result {
            println!("Error: {e}");
        }
    }
}

fn resolve(host: &str) -> Result<SocketAddr, QtgpError> {
    (host, DEFAULT_PORT)
        .to_socket_addrs()
        .map_err(|e| QtgpError::Config(format!("resolve {host}: {e}")))?
        .next()
        .ok_or_else(|| {
            QtgpError::Config(format!("no address for {host}"))
        })
}

fn prompt(label: &str) -> String {
    print!("{label}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().read_line(&mut line);
    line
}
