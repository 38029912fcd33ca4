use std::error::Error;

use wordweave_service::clues::GeminiClient;
use wordweave_service::generate::handle_generate;
use wordweave_service::request::GenerationRequest;
use wordweave_service::store::ArtifactStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: wordweave <request.json>")?;
    let raw = std::fs::read_to_string(&path)?;
    let request: GenerationRequest = serde_json::from_str(&raw)?;

    let store = ArtifactStore::from_env();
    let provider = GeminiClient::from_env();
    let response = handle_generate(&request, &provider, &store).await;

    if let Some(puzzle) = &response.puzzle {
        for row in &puzzle.grid {
            let line: String = row
                .iter()
                .map(|cell| cell.as_deref().unwrap_or("·"))
                .collect();
            println!("{line}");
        }
        println!();
    }
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.success { Ok(()) } else { Err(response.error.unwrap_or_default().into()) }
}
