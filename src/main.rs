//! # Webroot Server - Entry Point
//! src/main.rs
//!
//! Levanta el servidor con la configuración de la CLI, imprime los eventos
//! que publica y lo detiene cuando stdin se cierra o se escribe `quit`.

use log::{error, info};
use std::io::{self, BufRead};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread;
use webroot_server::config::ServerConfig;
use webroot_server::events::{ChannelSink, EventStatus, ServerEvent};
use webroot_server::logging;
use webroot_server::server::Server;

fn main() {
    let config = ServerConfig::from_args();

    if let Err(e) = logging::init(config.log_level) {
        eprintln!("💥 Could not initialize logging: {}", e);
        std::process::exit(1);
    }

    config.print_summary();

    let json_events = config.json_events;
    let (sink, events) = ChannelSink::new();

    let mut handle = match Server::start(config, Arc::new(sink)) {
        Ok(handle) => handle,
        Err(e) => {
            error!("💥 {}", e);
            std::process::exit(1);
        }
    };

    let printer = thread::spawn(move || print_events(events, json_events));

    info!(
        "Serving {} on http://{} (type 'quit' to stop)",
        handle.root().display(),
        handle.local_addr()
    );

    wait_for_quit();
    handle.stop();

    // Sin handle ya no queda ningún sender vivo y el printer termina
    drop(handle);
    let _ = printer.join();
}

/// Bloquea hasta EOF en stdin o una línea `quit` / `stop`
fn wait_for_quit() {
    for line in io::stdin().lock().lines() {
        match line {
            Ok(line) if matches!(line.trim(), "quit" | "stop") => return,
            Ok(_) => {}
            Err(_) => return,
        }
    }
}

/// Suscriptor de eventos: hace de tabla de conexiones
fn print_events(events: Receiver<ServerEvent>, json: bool) {
    for event in events {
        if json {
            match event.to_json_line() {
                Ok(line) => println!("{}", line),
                Err(e) => error!("Could not serialize event: {}", e),
            }
            continue;
        }

        // Las líneas de log ya salieron por el logger
        if let ServerEvent::Connection(conn) = event {
            let status = match &conn.status {
                EventStatus::Received => continue,
                EventStatus::Completed(code) => code.to_string(),
                EventStatus::Failed(reason) => format!("failed ({})", reason),
            };
            println!(
                "{}  {:<15}  {:<7}  {:<40}  {}",
                conn.timestamp.format("%H:%M:%S"),
                conn.client_address,
                conn.method,
                conn.path,
                status
            );
        }
    }
}
