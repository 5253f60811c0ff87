use std::env;

use poibot_core::config::Config;
use poibot_core::mapper::map_page;
use poibot_core::traits::SearchProvider;
use poibot_core::Query;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    poibot_cli::init_tracing();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <query> [Field=Value ...]", args[0]);
        eprintln!("Example: {} Manila Neighborhood=Intramuros", args[0]);
        std::process::exit(1);
    }
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let provider = poibot_cli::build_provider(&settings)?;

    let mut query = Query::new(args[1].as_str());
    for constraint in &args[2..] {
        match constraint.split_once('=') {
            Some((field, value)) => query = query.refined(field, value),
            None => { eprintln!("Ignoring '{}': expected Field=Value", constraint); }
        }
    }
    println!("🔍 poibot-query\n==============");
    println!("Query: {}", query.text);
    for r in &query.refinements { println!("  where {} = {}", r.field, r.value); }

    let page = provider.search(&query).await?;
    let results = map_page(&poibot_cli::poi_mapper(&settings), page);
    println!("\n🔍 Found {} results{}", results.hits.len(), if results.has_more { " (more available)" } else { "" });
    for (i, hit) in results.hits.iter().enumerate() {
        println!("\n  {}. [{}] {}", i + 1, hit.key, hit.title);
        println!("     {}", hit.description);
    }
    if results.skipped > 0 { println!("\n⚠️  {} records could not be mapped", results.skipped); }
    println!("\n📊 Facets:");
    for facet in &results.facets { println!("  {}: {}", facet.field, facet.values.join(", ")); }
    Ok(())
}
