//! Example: Route button presses to handlers by remote and button pattern.

use std::sync::Arc;

use lirc_client::{ButtonPress, Connection, EventRouter};

fn volume(press: &ButtonPress) {
    // Ignore the first few repeats so a short hold is a single step.
    if press.repeat_count == 0 || press.repeat_count > 3 {
        println!("Volume {} on {}", press.button_name, press.remote_control_name);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let conn = Arc::new(Connection::unix("/var/run/lirc/lircd"));
    let mut events = conn
        .take_events()
        .ok_or_else(|| anyhow::anyhow!("events already taken"))?;

    let router = EventRouter::new()
        .on("*", "KEY_POWER", |press| {
            println!("Power toggled on {}", press.remote_control_name)
        })?
        .on("*", "KEY_VOLUME*", volume)?
        .on("Television", "KEY_[0-9]", |press| {
            println!("Channel digit {}", &press.button_name[4..])
        })?;

    let runner = {
        let conn = conn.clone();
        tokio::spawn(async move { conn.start().await })
    };

    println!("Listening for button presses (Ctrl+C to exit)...");
    router
        .run(&mut events, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    conn.disconnect();
    runner.await??;
    Ok(())
}
