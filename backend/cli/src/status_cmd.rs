//! CLI Status Command
//!
//! Queries a running server's health endpoint.

use anyhow::Result;
use serde_json::Value;

use crate::terminal_output::{note_success, note_warn};

pub async fn run(port: u16) -> Result<()> {
    let url = format!("http://localhost:{port}/api/health");
    let client = reqwest::Client::new();
    match client.get(&url).send().await {
        Ok(resp) => {
            let body: Value = resp.json().await?;
            note_success(&format!("ReelForge is running on port {port}"));
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Err(_) => {
            note_warn(&format!("ReelForge is not running on port {port}"));
        }
    }
    Ok(())
}
