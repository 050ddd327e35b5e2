//! Live captioning demo
//!
//! Captures from the default input device and prints captions from a
//! running captioning service.
//!
//! Run:
//!   LIVECAP_SERVER=ws://127.0.0.1:5000/stream cargo run --example live_captions

use std::time::Duration;

use livecap::audio::DeviceTarget;
use livecap::coordinator::{CaptureConfig, CaptureCoordinator, CoordinatorEvent};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let server = std::env::var("LIVECAP_SERVER")
        .unwrap_or_else(|_| "ws://127.0.0.1:5000/stream".to_string());
    let source = std::env::var("LIVECAP_SOURCE").unwrap_or_else(|_| "en-IN".to_string());
    let target = std::env::var("LIVECAP_TARGET").unwrap_or_else(|_| "hi".to_string());

    println!("=== LiveCap demo ===");
    println!("Service:  {}", server);
    println!("Language: {} -> {}", source, target);

    let handle = CaptureCoordinator::spawn();
    let mut events = handle.subscribe().await?;

    let config = CaptureConfig::new(server).with_languages(source, target);
    let session_id = handle.start_capture(DeviceTarget::Default, config).await?;
    println!("Session started: {}\n", session_id);

    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                CoordinatorEvent::Caption(caption) => {
                    println!("[{}] {}", caption.id, caption.original);
                    if let Some(translated) = &caption.translated {
                        println!("      -> {}", translated);
                    }
                    if let Some(simplified) = &caption.simplified {
                        println!("      ~> {}", simplified);
                    }
                }
                CoordinatorEvent::ServiceError { message } => {
                    eprintln!("Service error: {}", message);
                }
                CoordinatorEvent::Disconnected => {
                    eprintln!("Service disconnected");
                    break;
                }
            }
        }
    });

    println!("Capturing for 30 seconds, speak now...");
    tokio::time::sleep(Duration::from_secs(30)).await;

    handle.stop_capture().await?;
    printer.abort();

    println!("\nRecent captions:");
    for caption in handle.recent_captions().await? {
        println!("  [{}] {}", caption.id, caption.original);
    }

    Ok(())
}
