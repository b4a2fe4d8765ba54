//! Example: Ask lircd for its version and the remotes it knows.

use std::sync::Arc;

use lirc_client::{Connection, List, Version};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let socket = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/var/run/lirc/lircd".to_string());
    let conn = Arc::new(Connection::unix(socket));

    println!("Connecting to {}...", conn.endpoint());
    let runner = {
        let conn = conn.clone();
        tokio::spawn(async move { conn.start().await })
    };

    let version = conn.send_command(&Version).await?;
    println!("lircd {}", version.data.join(" "));

    let remotes = conn.send_command(&List::default()).await?;
    println!("\n--- Remotes ({}) ---", remotes.data.len());
    for remote in &remotes.data {
        let buttons = conn
            .send_command(&List {
                remote: Some(remote.clone()),
            })
            .await?;
        println!("  {:20} {} buttons", remote, buttons.data.len());
    }

    conn.disconnect();
    runner.await??;
    Ok(())
}
