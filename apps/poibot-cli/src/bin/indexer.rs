use indicatif::{ProgressBar, ProgressStyle};
use std::{env, path::PathBuf, time::Duration};

use poibot_core::config::{resolve_with_base, Config};
use poibot_core::records::RecordLoader;
use poibot_search::PoiIndexer;

fn main() -> anyhow::Result<()> {
    poibot_cli::init_tracing();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let args: Vec<String> = env::args().skip(1).collect();
    let mut data_dir = None; let mut limit = None;
    let mut i = 0; while i < args.len() { match args[i].as_str() {
        "--limit" => { match args.get(i + 1).and_then(|v| v.parse::<usize>().ok()) { Some(n) => { limit = Some(n); i += 1; } None => { eprintln!("Error: --limit requires a number"); std::process::exit(1); } } }
        _ if !args[i].starts_with('-') => data_dir = Some(PathBuf::from(&args[i])), _ => {} } i += 1; }

    let cwd = env::current_dir()?;
    let data_dir = data_dir.unwrap_or_else(|| resolve_with_base(&cwd, &settings.data.records_dir));
    let index_dir = poibot_cli::local_index_dir(&settings)?;
    println!("POI Indexer\n===========");
    println!("Records directory: {}", data_dir.display());
    println!("Index directory:   {}", index_dir.display());
    println!("Key field:         {}", settings.data.key_field);

    let mut loader = RecordLoader::new();
    if let Some(n) = limit { println!("🔢 Limiting to {} records", n); loader = loader.with_limit(n); }
    let records = loader.load_directory(&data_dir)?;
    if records.is_empty() { println!("Nothing to index."); return Ok(()); }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Indexing {} records", records.len()));
    let indexer = PoiIndexer::new(index_dir, &settings.data.key_field, &settings.dialog.refiners)?;
    let count = indexer.index_records(&records)?;
    pb.finish_with_message(format!("✅ Indexed {} of {} records", count, records.len()));

    println!("\n💡 To chat, run: cargo run --bin poibot");
    Ok(())
}
