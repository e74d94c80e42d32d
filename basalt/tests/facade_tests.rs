use std::fs;
use std::sync::Arc;

use basalt::{
    BlockFilter, BlockManager, DataSource, IngestContext, IngestOptions, IngestSpec, RowRead,
    TIME_COLUMN, TableRegistry, TableSpec, TimeSpec,
};

// one end-to-end pass through the re-exported surface
#[test]
fn ingest_through_facade() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("e.tsv"), "1\tping\n2\tpong\n").unwrap();

    let table = TableSpec {
        name: "echo".to_string(),
        schema: "ROW<id:int, event:string>".to_string(),
        source: DataSource::Local,
        loader: "Roll".to_string(),
        format: "csv".to_string(),
        time_spec: TimeSpec::fixed(7),
        ..TableSpec::default()
    };
    let mut spec = IngestSpec::new(
        Arc::new(table),
        "1.0",
        "e.tsv",
        dir.path().to_string_lossy().into_owned(),
        12,
        0,
    );

    let ctx = IngestContext::new(Arc::new(BlockManager::new()), Arc::new(TableRegistry::new()))
        .with_options(IngestOptions {
            block_max_rows: 1000,
            ..IngestOptions::default()
        });
    assert!(spec.work(&ctx));

    let blocks = ctx.blocks.enumerate("echo", &BlockFilter::any());
    assert_eq!(blocks.len(), 1);
    let row = blocks[0].data().row(0).unwrap();
    assert_eq!(row.read_string("event").unwrap(), "ping");
    assert_eq!(row.read_long(TIME_COLUMN).unwrap(), 7);
}
