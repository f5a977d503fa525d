//! Shared helpers for integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use arte_cli::app::models::TransferProgress;
use arte_cli::{ArteClient, ClientConfig};

/// Client pointed at `base_url` with default settings
pub fn client(base_url: &str) -> ArteClient {
    ArteClient::new(base_url, None, ClientConfig::default()).unwrap()
}

/// Client that sends `token` as Authorization
pub fn client_with_token(base_url: &str, token: &str) -> ArteClient {
    ArteClient::new(base_url, Some(token.to_string()), ClientConfig::default()).unwrap()
}

/// Zip-looking file of exactly `size` bytes
pub fn write_zip(dir: &Path, name: &str, size: usize) -> PathBuf {
    let mut content = b"PK\x03\x04".to_vec();
    content.extend((0..size.saturating_sub(4)).map(|i| b'a' + (i % 26) as u8));
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Names of every entry in `dir`
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Progress callback that records every event
pub fn recorder(events: &mut Vec<TransferProgress>) -> impl FnMut(TransferProgress) + '_ {
    move |progress| events.push(progress)
}
