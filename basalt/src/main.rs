use std::env;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use basalt::{
    BlockFilter, BlockManager, DataSource, IngestContext, IngestSpec, TableRegistry, TableSpec,
    TimeSpec,
};

fn print_usage() {
    const NAME: &str = env!("CARGO_PKG_NAME");
    const VER: &str = env!("CARGO_PKG_VERSION");
    println!("{} version {}", NAME, VER);
    println!("Usage: basalt <schema> <tsv-file> [unix-time]");
    println!();
    println!("Ingests a tab-separated file into an in-process block manager");
    println!("and prints the installed block signatures.");
    println!("  <schema>     table schema, e.g. 'ROW<id:int, event:string>'");
    println!("  <tsv-file>   headerless tab-separated data file");
    println!("  [unix-time]  static time stamped on every row (default 0)");
}

fn main() -> ExitCode {
    use tracing_subscriber::filter::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    let schema = args[0].clone();
    let file = Path::new(&args[1]);
    let time = args.get(2).and_then(|v| v.parse::<i64>().ok()).unwrap_or(0);

    let (Some(domain), Some(key)) = (
        file.parent().map(|p| p.to_string_lossy().into_owned()),
        file.file_name().map(|n| n.to_string_lossy().into_owned()),
    ) else {
        eprintln!("cannot split '{}' into directory and file", file.display());
        return ExitCode::FAILURE;
    };
    let name = file
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "demo".to_string());
    let size = fs::metadata(file).map(|m| m.len()).unwrap_or(0);

    let table = TableSpec {
        name: name.clone(),
        schema,
        source: DataSource::Local,
        loader: "Roll".to_string(),
        format: "csv".to_string(),
        time_spec: TimeSpec::fixed(time),
        ..TableSpec::default()
    };
    let mut spec = IngestSpec::new(Arc::new(table), "1.0", key, domain, size, 0);

    let ctx = IngestContext::new(Arc::new(BlockManager::new()), Arc::new(TableRegistry::new()));
    if !spec.work(&ctx) {
        eprintln!("ingestion failed for spec {}", spec.id());
        return ExitCode::FAILURE;
    }

    let blocks = ctx.blocks.enumerate(&name, &BlockFilter::any());
    println!("installed {} block(s) for table '{}'", blocks.len(), name);
    for block in &blocks {
        println!(
            "  {}  rows={} bytes={}",
            block.signature(),
            block.rows(),
            block.memory()
        );
    }
    ExitCode::SUCCESS
}
