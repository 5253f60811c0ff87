use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use poibot_core::config::Config;
use poibot_core::Error;
use poibot_dialog::{Bot, DialogConfig, Reply, Transport};

const CONVERSATION: &str = "console";

struct ConsoleTransport;

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send(&self, _conversation: &str, reply: &Reply) -> poibot_core::Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "bot> {}", reply.to_string().trim_end()).map_err(|e| Error::Transport(format!("stdout: {e}")))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    poibot_cli::init_tracing();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;

    let search = poibot_cli::build_search_client(&settings)?;
    let dialog = DialogConfig::builder()
        .multiple_selection(settings.dialog.multiple_selection)
        .search(search)
        .refiners(settings.dialog.refiners.clone())
        .build()?;
    let bot = Bot::new(dialog)?;

    println!("📍 POI search bot ({:?} provider)", settings.search.provider);
    println!("Say anything to start, 'help' for help, /quit to exit.\n");

    let transport = ConsoleTransport;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else { break };
        let line = line.trim();
        if line.is_empty() { continue; }
        if matches!(line, "/quit" | "/q") { println!("👋 Goodbye!"); break; }
        bot.on_turn(CONVERSATION, line, &transport).await?;
    }
    Ok(())
}
