use chat_shell::config::ShellArgs;
use chat_shell::terminal;
use chat_shell::{ChatSession, LivenessProbe, RelayClient};
use clap::Parser;
use service_core::observability::init_tracing;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ShellArgs::parse();
    init_tracing("chat-shell", &args.log_level, None);

    let client = RelayClient::new(&args.server_url, args.ping_timeout(), args.chat_timeout())?;
    let (session, mut events) = ChatSession::with_events(client);
    let session = Arc::new(session);

    println!("{}", terminal::WELCOME);
    println!("{}", terminal::HELP);

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Some(line) = terminal::render_event(&event) {
                println!("{}", line);
            }
        }
    });

    let shutdown = CancellationToken::new();
    let interrupt = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => interrupt.cancel(),
            Err(e) => tracing::error!("Failed to install Ctrl+C handler: {}", e),
        }
    });

    let probe = LivenessProbe::spawn(session.clone(), args.probe_interval());

    let result = terminal::run(&session, BufReader::new(tokio::io::stdin()), &shutdown).await;

    probe.stop().await;
    // Last sender goes with the session; the printer drains and exits.
    drop(session);
    let _ = printer.await;

    Ok(result?)
}
