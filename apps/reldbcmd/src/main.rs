//! Interactive line client for the reldb server.
//!
//! Reads statements from stdin, sends each as one newline-terminated line,
//! and prints everything the server returns up to the NUL end-of-response
//! marker.

use std::env;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

const DEFAULT_ADDR: &str = "127.0.0.1:9000";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = env::args().nth(1).unwrap_or_else(|| DEFAULT_ADDR.to_string());

    let stream = TcpStream::connect(&addr).map_err(|e| {
        format!("could not connect to {addr}: {e}. Is the server running?")
    })?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    println!("--- reldb client ({addr}) ---");
    println!("Type 'exit' to quit\n");

    let stdin = std::io::stdin();
    let mut input = String::new();
    let mut response = Vec::new();

    loop {
        print!("reldb> ");
        std::io::stdout().flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break; // EOF on stdin
        }

        let statement = input.trim();
        if statement == "exit" {
            break;
        }
        if statement.is_empty() {
            continue;
        }

        writer.write_all(statement.as_bytes())?;
        writer.write_all(b"\n")?;

        response.clear();
        reader.read_until(0, &mut response)?;
        if response.is_empty() {
            println!("Server closed connection.");
            break;
        }
        if response.last() == Some(&0) {
            response.pop();
        }
        print!("{}", String::from_utf8_lossy(&response));
    }

    Ok(())
}
