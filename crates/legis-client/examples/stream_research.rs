use std::time::Duration;

use legis_client::prelude::*;

const DEFAULT_QUERY: &str =
    "Is a limitation of liability clause enforceable against gross negligence?";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ClientError> {
    legis_client::load_dotenv();
    legis_client::init_observability();

    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_QUERY.to_string());
    let client = LegisClient::from_env()?;
    let mut session = client
        .research(&ResearchRequest::new(query).max_results(5))?
        .start_stream()?;

    // Give up after two minutes without a terminal frame.
    let cancel = session.cancel_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(120)).await;
        cancel.cancel();
    });

    let mut printed = 0;
    while let Some(event) = session.next_event().await {
        match event {
            StreamEvent::Started { session_id, .. } => eprintln!("session {session_id}"),
            StreamEvent::Progress { delta, text, .. } => {
                print!("{delta}");
                printed = text.len();
            }
            StreamEvent::Completed { .. } => println!(),
            StreamEvent::Failed { error } => eprintln!("\nstream failed: {error}"),
            StreamEvent::Cancelled => eprintln!("\ncancelled after {printed} bytes"),
        }
    }

    session.finish().await.into_result()?;
    Ok(())
}
