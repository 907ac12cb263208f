//! Map-serving binary: a TCP listener answering `RequestMap` frames with
//! the current map as JSON, and an operator console on stdin for
//! generating and inspecting maps.

mod console;
mod protocol;

use std::io::{self, BufRead};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use warren_core::render::{RenderOptions, render};
use warren_core::{DungeonMap, MapRequest, generate, wire};

use protocol::{DEFAULT_PORT, MessageType, read_frame, write_frame};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TCP port to serve maps on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Address to bind the listener to
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,
}

/// The one piece of state the console and the client handlers share.
type SharedMap = Arc<Mutex<Option<DungeonMap>>>;

fn main() -> Result<()> {
    let args = Args::parse();
    let current_map: SharedMap = Arc::new(Mutex::new(None));

    let listener = TcpListener::bind((args.bind.as_str(), args.port))
        .with_context(|| format!("failed to bind {}:{}", args.bind, args.port))?;
    println!("serving maps on {}:{}", args.bind, args.port);

    let accept_map = Arc::clone(&current_map);
    thread::spawn(move || accept_clients(listener, accept_map));

    run_console(&current_map)
}

fn accept_clients(listener: TcpListener, current_map: SharedMap) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let client_map = Arc::clone(&current_map);
                thread::spawn(move || {
                    let peer = stream
                        .peer_addr()
                        .map_or_else(|_| "unknown".to_string(), |address| address.to_string());
                    if let Err(error) = handle_client(stream, &client_map) {
                        println!("client {peer} disconnected: {error}");
                    }
                });
            }
            Err(error) => println!("connection failed: {error}"),
        }
    }
}

fn handle_client(mut stream: TcpStream, current_map: &SharedMap) -> io::Result<()> {
    loop {
        let frame = read_frame(&mut stream)?;
        match frame.message_type {
            MessageType::RequestMap => {
                let encoded = {
                    let mut guard = current_map.lock().expect("map mutex is never poisoned");
                    if guard.is_none() {
                        // First request before the operator made a map:
                        // serve a default passage map.
                        *guard = generate(&MapRequest::default()).ok();
                    }
                    guard.as_ref().map(wire::to_json)
                };
                match encoded {
                    Some(Ok(payload)) => {
                        write_frame(&mut stream, MessageType::MapData, payload.as_bytes())?;
                    }
                    Some(Err(error)) => {
                        let reason = format!("map serialisation failed: {error}");
                        println!("{reason}");
                        write_frame(&mut stream, MessageType::Error, reason.as_bytes())?;
                    }
                    None => {
                        write_frame(&mut stream, MessageType::Error, b"no map available")?;
                    }
                }
            }
            MessageType::PlayerMove | MessageType::PlayerJoin | MessageType::PlayerLeave => {
                // Viewer-side traffic; the generator service just logs it.
                println!(
                    "ignoring {:?} frame ({} bytes)",
                    frame.message_type,
                    frame.payload.len()
                );
            }
            MessageType::MapData | MessageType::Error => {
                println!("unexpected {:?} frame from client", frame.message_type);
            }
        }
    }
}

fn run_console(current_map: &SharedMap) -> Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        match console::parse(&line) {
            Ok(console::Command::Exit) => break,
            Ok(console::Command::GenMap(request)) => match generate(&request) {
                Ok(map) => {
                    let seed = map.metadata.get("seed").cloned().unwrap_or_default();
                    println!("generated '{}' with seed {seed}", map.name);
                    *current_map.lock().expect("map mutex is never poisoned") = Some(map);
                }
                Err(error) => println!("generation failed: {error}"),
            },
            Ok(console::Command::ShowMap) => {
                let guard = current_map.lock().expect("map mutex is never poisoned");
                match guard.as_ref() {
                    Some(map) => match render(map, RenderOptions { color: true }) {
                        Ok(rendered) => println!("{}\n{rendered}", map.name),
                        Err(error) => println!("render failed: {error}"),
                    },
                    None => println!("no map yet (try genmap)"),
                }
            }
            Err(error) => println!("{error}"),
        }
    }
    Ok(())
}
