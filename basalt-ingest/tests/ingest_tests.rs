use std::fs::{self, File};
use std::sync::Arc;
use std::thread;

use arrow::array::{Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use basalt_execution::{BlockFilter, BlockManager};
use basalt_ingest::{IngestContext, IngestOptions, IngestSpec, SpecState};
use basalt_meta::{DataSource, TableRegistry, TableSpec, TimeSpec};
use basalt_types::TIME_COLUMN;
use basalt_types::row::RowRead;

fn context() -> IngestContext {
    IngestContext::new(Arc::new(BlockManager::new()), Arc::new(TableRegistry::new()))
}

fn options(block_max_rows: usize) -> IngestOptions {
    IngestOptions {
        block_max_rows,
        ..IngestOptions::default()
    }
}

fn local_table(name: &str, schema: &str, loader: &str, format: &str, time_spec: TimeSpec) -> TableSpec {
    TableSpec {
        name: name.to_string(),
        max_mb: 1000,
        max_hr: 10,
        schema: schema.to_string(),
        source: DataSource::Local,
        loader: loader.to_string(),
        format: format.to_string(),
        time_spec,
        ..TableSpec::default()
    }
}

fn spec_for(dir: &std::path::Path, table: TableSpec, key: &str, mdate: i64) -> IngestSpec {
    let size = fs::metadata(dir.join(key)).map(|m| m.len()).unwrap_or(0);
    IngestSpec::new(
        Arc::new(table),
        "1.0",
        key,
        dir.to_string_lossy().into_owned(),
        size,
        mdate,
    )
}

// csv + static time: rows segment into capacity-bounded blocks in source
// order, every block stamped with the fixed time and the spec id
#[test]
fn csv_static_time_segments_into_blocks() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("events.tsv"), "1\ta\n2\tb\n3\tc\n4\td\n").unwrap();

    let table = local_table(
        "t",
        "ROW<id:int, event:string>",
        "Roll",
        "csv",
        TimeSpec::fixed(1000),
    );
    let mut spec = spec_for(dir.path(), table, "events.tsv", 0);
    let ctx = context().with_options(options(3));

    assert!(spec.work(&ctx));
    assert_eq!(spec.state(), SpecState::Ready);

    let blocks = ctx.blocks.enumerate("t", &BlockFilter::any());
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].rows(), 3);
    assert_eq!(blocks[1].rows(), 1);

    let mut ids = Vec::new();
    let mut events = Vec::new();
    for (seq, block) in blocks.iter().enumerate() {
        let sig = block.signature();
        assert_eq!(sig.seq, seq as u64);
        assert_eq!(sig.time_min, 1000);
        assert_eq!(sig.time_max, 1000);
        assert_eq!(sig.spec, spec.id());
        for i in 0..block.rows() {
            let row = block.data().row(i).unwrap();
            ids.push(row.read_int("id").unwrap());
            events.push(row.read_string("event").unwrap().to_string());
            assert_eq!(row.read_long(TIME_COLUMN).unwrap(), 1000);
        }
    }
    // concatenation preserves source order
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(events, vec!["a", "b", "c", "d"]);

    // the ingested table stays resolvable while its blocks are installed
    assert!(ctx.tables.lookup("t").is_some());
}

fn write_parquet(path: &std::path::Path, ids: &[i32], ts: &[&str]) {
    let schema = Arc::new(ArrowSchema::new(vec![
        Field::new("id", DataType::Int32, false),
        Field::new("ts", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![
            Arc::new(Int32Array::from(ids.to_vec())),
            Arc::new(StringArray::from(ts.to_vec())),
        ],
    )
    .unwrap();
    let mut writer = ArrowWriter::try_new(File::create(path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

// parquet + column time: the source time column is parsed into _time_ and
// dropped from the final schema
#[test]
fn parquet_column_time_replaces_source_column() {
    let dir = tempfile::tempdir().unwrap();
    write_parquet(
        &dir.path().join("rows.parquet"),
        &[1, 2],
        &["2020-01-01 00:00:00", "2020-01-01 00:00:10"],
    );

    let table = local_table(
        "pq",
        "ROW<id:int, ts:string>",
        "Roll",
        "parquet",
        TimeSpec::from_column("ts", "%Y-%m-%d %H:%M:%S"),
    );
    let mut spec = spec_for(dir.path(), table, "rows.parquet", 0);
    let ctx = context();

    assert!(spec.work(&ctx));

    let blocks = ctx.blocks.enumerate("pq", &BlockFilter::any());
    assert_eq!(blocks.len(), 1);
    let block = &blocks[0];
    assert_eq!(block.signature().time_min, 1_577_836_800);
    assert_eq!(block.signature().time_max, 1_577_836_810);
    assert_eq!(
        block.data().schema().to_string(),
        "ROW<id:int,_time_:bigint>"
    );

    let first = block.data().row(0).unwrap();
    assert_eq!(first.read_int("id").unwrap(), 1);
    assert_eq!(first.read_long(TIME_COLUMN).unwrap(), 1_577_836_800);
    let second = block.data().row(1).unwrap();
    assert_eq!(second.read_long(TIME_COLUMN).unwrap(), 1_577_836_810);
}

// a malformed time value under COLUMN derivation zero-fills, keeping the row
#[test]
fn csv_column_time_zero_fills_malformed_rows() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("mixed.tsv"),
        "1\t2020-01-01 00:00:00\n2\toops\n",
    )
    .unwrap();

    let table = local_table(
        "mixed",
        "ROW<id:int, ts:string>",
        "Roll",
        "csv",
        TimeSpec::from_column("ts", "%Y-%m-%d %H:%M:%S"),
    );
    let mut spec = spec_for(dir.path(), table, "mixed.tsv", 0);
    let ctx = context();

    assert!(spec.work(&ctx));
    let blocks = ctx.blocks.enumerate("mixed", &BlockFilter::any());
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].rows(), 2);
    assert_eq!(blocks[0].signature().time_min, 0);
    assert_eq!(blocks[0].signature().time_max, 1_577_836_800);
    let bad = blocks[0].data().row(1).unwrap();
    assert_eq!(bad.read_int("id").unwrap(), 2);
    assert_eq!(bad.read_long(TIME_COLUMN).unwrap(), 0);
}

// swap replaces every same-spec block, atomically from the reader's view
#[test]
fn swap_replaces_prior_generation() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("gen.tsv"), "1\ta\n2\tb\n3\tc\n4\td\n").unwrap();
    fs::write(dir.path().join("other.tsv"), "9\tz\n").unwrap();

    let ctx = context().with_options(options(2));

    // first generation via roll: two blocks of two rows
    let roll = local_table(
        "s",
        "ROW<id:int, event:string>",
        "Roll",
        "csv",
        TimeSpec::fixed(10),
    );
    let mut first = spec_for(dir.path(), roll, "gen.tsv", 0);
    assert!(first.work(&ctx));

    // an unrelated spec that must survive the swap
    let other = local_table(
        "s",
        "ROW<id:int, event:string>",
        "Roll",
        "csv",
        TimeSpec::fixed(10),
    );
    let mut unrelated = spec_for(dir.path(), other, "other.tsv", 0);
    assert!(unrelated.work(&ctx));
    assert_eq!(ctx.blocks.enumerate("s", &BlockFilter::any()).len(), 3);

    // same identity (table@path@size), now swapped in as a single block
    let swap = local_table(
        "s",
        "ROW<id:int, event:string>",
        "Swap",
        "csv",
        TimeSpec::fixed(10),
    );
    let mut second = spec_for(dir.path(), swap, "gen.tsv", 0);
    assert_eq!(second.id(), first.id());
    // same manager and registry, larger block capacity
    let ctx2 = IngestContext::new(Arc::clone(&ctx.blocks), Arc::clone(&ctx.tables))
        .with_options(options(10));
    assert!(second.work(&ctx2));

    let swapped = ctx.blocks.enumerate("s", &BlockFilter::any().for_spec(first.id()));
    assert_eq!(swapped.len(), 1);
    assert_eq!(swapped[0].rows(), 4);

    // the unrelated spec's block is untouched
    assert_eq!(
        ctx.blocks
            .enumerate("s", &BlockFilter::any().for_spec(unrelated.id()))
            .len(),
        1
    );
}

// synthetic loader: one block per hardware thread over contiguous windows
#[test]
fn test_loader_builds_contiguous_windows() {
    let table = TableSpec {
        name: "whatever".to_string(),
        max_hr: 24,
        schema: "ROW<id:int>".to_string(),
        loader: "NebulaTest".to_string(),
        time_spec: TimeSpec::fixed(0),
        ..TableSpec::default()
    };
    let mut spec = IngestSpec::new(Arc::new(table), "1.0", "none", "none", 0, 0);
    let ctx = context().with_options(options(128));

    assert!(spec.work(&ctx));

    let parallelism = thread::available_parallelism().map(usize::from).unwrap_or(1);
    let window = 86_400 / parallelism as i64;
    let blocks = ctx
        .blocks
        .enumerate(basalt_ingest::test_data::TEST_TABLE_NAME, &BlockFilter::any());
    assert_eq!(blocks.len(), parallelism);

    for (i, block) in blocks.iter().enumerate() {
        let sig = block.signature();
        assert_eq!(sig.seq, i as u64);
        assert_eq!(sig.time_min, i as i64 * window);
        assert_eq!(sig.time_max, (i as i64 + 1) * window);
        assert_eq!(sig.spec, spec.id());
        assert_eq!(block.rows(), 128);
        for r in 0..block.rows() {
            let t = block.data().row(r).unwrap().read_long(TIME_COLUMN).unwrap();
            assert!(t >= sig.time_min && t < sig.time_max);
        }
    }
    assert!(
        ctx.tables
            .lookup(basalt_ingest::test_data::TEST_TABLE_NAME)
            .is_some()
    );
}

// configuration failures: work() reports false and installs nothing
#[test]
fn unsupported_format_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("data.orc"), b"not really orc").unwrap();

    let table = local_table("t", "ROW<id:int>", "Roll", "orc", TimeSpec::fixed(0));
    let mut spec = spec_for(dir.path(), table, "data.orc", 0);
    let ctx = context();

    assert!(!spec.work(&ctx));
    assert_eq!(spec.state(), SpecState::Failed);
    assert_eq!(ctx.blocks.blocks(), 0);
}

#[test]
fn unknown_loader_and_bad_sources_fail() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("data.tsv"), "1\n").unwrap();
    let ctx = context();

    let table = local_table("t", "ROW<id:int>", "Shuffle", "csv", TimeSpec::fixed(0));
    let mut unknown = spec_for(dir.path(), table, "data.tsv", 0);
    assert!(!unknown.work(&ctx));

    let mut kafka_table = local_table("t", "ROW<id:int>", "Swap", "csv", TimeSpec::fixed(0));
    kafka_table.source = DataSource::Kafka;
    let mut streaming = spec_for(dir.path(), kafka_table, "data.tsv", 0);
    assert!(!streaming.work(&ctx));

    let mut custom_table = local_table("t", "ROW<id:int>", "Roll", "csv", TimeSpec::fixed(0));
    custom_table.source = DataSource::Custom;
    let mut custom = spec_for(dir.path(), custom_table, "data.tsv", 0);
    assert!(!custom.work(&ctx));

    assert_eq!(ctx.blocks.blocks(), 0);
}

#[test]
fn unsupported_time_specs_fail() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("data.tsv"), "1\n").unwrap();
    let ctx = context();

    let table = local_table(
        "t",
        "ROW<id:int>",
        "Roll",
        "csv",
        TimeSpec::from_macro("hour"),
    );
    let mut bad_macro = spec_for(dir.path(), table, "data.tsv", 0);
    assert!(!bad_macro.work(&ctx));

    let provided = local_table("t", "ROW<id:int>", "Roll", "csv", TimeSpec::provided());
    let mut streaming_time = spec_for(dir.path(), provided, "data.tsv", 0);
    assert!(!streaming_time.work(&ctx));

    assert_eq!(ctx.blocks.blocks(), 0);
}

// the "date" macro stamps the spec-level date on every row
#[test]
fn date_macro_uses_spec_mdate() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("d.tsv"), "1\n2\n").unwrap();

    let table = local_table("dated", "ROW<id:int>", "Roll", "csv", TimeSpec::from_macro("date"));
    let mut spec = spec_for(dir.path(), table, "d.tsv", 555);
    let ctx = context();

    assert!(spec.work(&ctx));
    let blocks = ctx.blocks.enumerate("dated", &BlockFilter::any());
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].signature().time_min, 555);
    assert_eq!(blocks[0].signature().time_max, 555);
}

// an empty source succeeds and installs nothing
#[test]
fn empty_source_installs_no_blocks() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("empty.tsv"), "").unwrap();

    let table = local_table(
        "empty",
        "ROW<id:int, event:string>",
        "Roll",
        "csv",
        TimeSpec::fixed(0),
    );
    let mut spec = spec_for(dir.path(), table, "empty.tsv", 0);
    let ctx = context();

    assert!(spec.work(&ctx));
    assert_eq!(spec.state(), SpecState::Ready);
    assert_eq!(ctx.blocks.blocks(), 0);
}
