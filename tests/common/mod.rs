#![allow(dead_code)]

use hockey_stats::source::StaticSource;
use hockey_stats::Entity;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread::JoinHandle;
use tempfile::TempDir;

/// A data directory holding one JSON document per entity.
pub fn data_dir(documents: &[(Entity, &str)]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    for (entity, body) in documents {
        write_document(dir.path(), *entity, body);
    }
    dir
}

pub fn write_document(dir: &Path, entity: Entity, body: &str) {
    std::fs::write(StaticSource::path_for(dir, entity), body).expect("Failed to write document");
}

/// Serve a single HTTP response on a local port.
///
/// Returns the base URL and a handle yielding the request line that was received.
pub fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("Failed to accept");
        let mut reader = BufReader::new(stream.try_clone().expect("Failed to clone stream"));
        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("Failed to read request");
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                break;
            }
        }
        stream
            .write_all(response.as_bytes())
            .expect("Failed to write response");
        request_line.trim_end().to_string()
    });

    (format!("http://{}/v4/spreadsheets", addr), handle)
}

/// Display strings of one column, in display order.
pub fn column_values(view: &hockey_stats::view::TableView, column: &str) -> Vec<String> {
    let index = view
        .schema()
        .columns
        .iter()
        .position(|c| c.id == column)
        .expect("Unknown column");
    view.rows().map(|r| r.cell(index).display()).collect()
}
