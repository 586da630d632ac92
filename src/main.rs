use anyhow::Result;
use tracing::{info, warn};

use vidrank_cli::api_client::ApiClient;
use vidrank_cli::config::Config;
use vidrank_cli::logging;
use vidrank_cli::session::RankSession;
use vidrank_cli::ui::tui::SelectorTui;

fn main() -> Result<()> {
    logging::init()?;

    let config = Config::load()?;
    let client = ApiClient::new(&config.api.base_url);

    match client.status() {
        Ok(_) => {
            if let Ok(response) = client.version() {
                info!(target: "system", "backend version {}", response.version);
            }
        }
        Err(err) => {
            warn!(target: "system", "backend not reachable at {}: {err}", config.api.base_url);
        }
    }

    let session = RankSession::new(client, config.settings());
    SelectorTui::new(session).run()
}
