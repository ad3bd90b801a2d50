use std::sync::Arc;

use genforge_protocol::WireEvent;
use genforge_relay::vendors::anthropic::AnthropicClient;
use genforge_relay::{GenerationRequest, Relay, RelayConfig, RelayError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), RelayError> {
    let relay = Relay::new(
        Arc::new(AnthropicClient::from_env()?),
        RelayConfig::default(),
    );

    let mut stream = relay
        .generate(GenerationRequest {
            prompt: std::env::args()
                .nth(1)
                .unwrap_or_else(|| "A single-file pomodoro timer web app".into()),
        })
        .await?;

    while let Some(event) = stream.next_event().await {
        match event {
            WireEvent::CodeDelta { content } => print!("{content}"),
            WireEvent::Done { code } => println!("\n--- extracted artifact ---\n{code}"),
            WireEvent::Error { message } => eprintln!("relay error: {message}"),
        }
    }
    Ok(())
}
