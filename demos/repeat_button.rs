//! Example: Hold a button down for a few seconds, e.g. to ramp the volume.

use std::sync::Arc;
use std::time::Duration;

use lirc_client::{Connection, SendOnce};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let remote = args.next().unwrap_or_else(|| "Television".to_string());
    let button = args.next().unwrap_or_else(|| "KEY_VOLUMEUP".to_string());

    let conn = Arc::new(Connection::unix("/var/run/lirc/lircd"));
    let runner = {
        let conn = conn.clone();
        tokio::spawn(async move { conn.start().await })
    };

    println!("Sending {button} once...");
    conn.send_command(&SendOnce {
        remote: remote.clone(),
        button: button.clone(),
        repeats: None,
    })
    .await?;

    println!("Holding {button} for 3 seconds...");
    let repeating = conn.repeat_button(&remote, &button).await?;
    tokio::time::sleep(Duration::from_secs(3)).await;
    repeating.stop().await;
    println!("Released");

    conn.disconnect();
    runner.await??;
    Ok(())
}
