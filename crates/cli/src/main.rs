//! # CLI - RiptideKV Interactive Shell
//!
//! A REPL-style command-line interface for the RiptideKV storage engine.
//! Reads commands from stdin, executes them against the engine, and prints
//! results to stdout.
//!
//! ## Commands
//!
//! ```text
//! PUT key value   Insert or update a key-value pair (key is a signed 64-bit integer)
//! GET key         Look up a key (prints value or "(nil)")
//! DEL key         Delete a key (writes a tombstone)
//! RESET           Discard every on-disk level under the data directory
//! EXIT / QUIT     Shut down gracefully
//! ```
//!
//! ## Configuration
//!
//! ```text
//! RIPTIDE_DATA_DIR   Root directory for levels   (default: "data")
//! ```
//!
//! ## Example
//!
//! ```text
//! $ cargo run -p cli
//! RiptideKV started (dir=data)
//! > PUT 1 Alice
//! OK
//! > GET 1
//! Alice
//! > DEL 1
//! OK
//! > GET 1
//! (nil)
//! > EXIT
//! bye
//! ```
use anyhow::{Context, Result};
use engine::Engine;
use std::io::{self, BufRead, Write};

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn main() -> Result<()> {
    env_logger::init();

    // Configuration via environment variables with sensible defaults.
    //
    //  RIPTIDE_DATA_DIR - root directory for levels (default: "data")
    let dir = env_or("RIPTIDE_DATA_DIR", "data");

    let engine = Engine::open(&dir).with_context(|| format!("opening engine at {dir}"))?;
    log::info!("engine opened at {dir}");

    println!("RiptideKV started (dir={dir})");
    println!("Commands: PUT key value | GET key | DEL key | RESET | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "PUT" => match parts.next().map(str::parse::<i64>) {
                    Some(Ok(key)) => {
                        let value: String = parts.collect::<Vec<&str>>().join(" ");
                        if value.is_empty() {
                            println!("ERR usage: PUT key value");
                        } else {
                            match engine.put(key, value.into_bytes(), true) {
                                Ok(()) => println!("OK"),
                                Err(e) => println!("ERR put failed: {e}"),
                            }
                        }
                    }
                    Some(Err(_)) => println!("ERR key must be an integer"),
                    None => println!("ERR usage: PUT key value"),
                },
                "GET" => match parts.next().map(str::parse::<i64>) {
                    Some(Ok(key)) => match engine.get(key) {
                        Ok(value) if value.is_empty() => println!("(nil)"),
                        Ok(value) => println!("{}", String::from_utf8_lossy(&value)),
                        Err(e) => println!("ERR get failed: {e}"),
                    },
                    Some(Err(_)) => println!("ERR key must be an integer"),
                    None => println!("ERR usage: GET key"),
                },
                "DEL" => match parts.next().map(str::parse::<i64>) {
                    Some(Ok(key)) => match engine.del(key, true) {
                        Ok(_) => println!("OK"),
                        Err(e) => println!("ERR del failed: {e}"),
                    },
                    Some(Err(_)) => println!("ERR key must be an integer"),
                    None => println!("ERR usage: DEL key"),
                },
                "RESET" => match engine.reset() {
                    Ok(()) => println!("OK"),
                    Err(e) => println!("ERR reset failed: {e}"),
                },
                "EXIT" | "QUIT" => {
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {other}");
                }
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}
