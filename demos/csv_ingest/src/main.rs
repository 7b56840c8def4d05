//! csv_ingest: load long-format CSV records into a tsfile.
//!
//! ```text
//! csv_ingest [SCHEMA_CSV RECORDS_CSV OUTPUT]
//! ```
//!
//! With no arguments a small embedded weather-station data set is written to
//! `output/csv_ingest/weather.tsfile`.  Records are fanned out to a few
//! producer threads that share one session, the way a task framework would
//! call it.  Records that break the schema are counted and skipped; any other
//! failure aborts the run.  Set `RUST_LOG=debug` to see the writer's log.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use log::info;

use ts_core::{FileSchema, TsRecord};
use ts_io::Destination;
use ts_write::{
    ErrorKind, RecordWriter, TsFileReader, WriterConfig, load_records_csv, load_records_reader,
    load_schema_csv, load_schema_reader,
};

// ── Constants ─────────────────────────────────────────────────────────────────

const PRODUCERS:      usize = 3;
const DEFAULT_OUTPUT: &str  = "output/csv_ingest/weather.tsfile";

// ── Embedded data set ─────────────────────────────────────────────────────────

const SCHEMA_CSV: &str = "\
measurement,data_type,encoding\n\
temperature,DOUBLE,GORILLA\n\
humidity,INT32,RLE\n\
online,BOOLEAN,RLE\n\
firmware,TEXT,DICTIONARY\n\
";

// `wind` is not declared above; its rows are rejected by the writer.
const RECORDS_CSV: &str = "\
entity,timestamp,measurement,value\n\
station-1,1700000000000,temperature,21.5\n\
station-1,1700000000000,humidity,40\n\
station-1,1700000000000,online,true\n\
station-2,1700000000000,temperature,19.25\n\
station-2,1700000000000,firmware,v2.4.1\n\
station-1,1700000060000,temperature,21.7\n\
station-1,1700000060000,humidity,41\n\
station-2,1700000060000,temperature,19.5\n\
station-3,1700000060000,wind,12\n\
station-3,1700000120000,temperature,17.0\n\
station-3,1700000120000,online,false\n\
station-1,1700000120000,temperature,21.9\n\
station-2,1700000120000,humidity,55\n\
";

// ── Input ─────────────────────────────────────────────────────────────────────

fn load_input(args: &[String]) -> Result<(FileSchema, Vec<TsRecord>, PathBuf)> {
    match args {
        [] => {
            let schema = load_schema_reader(Cursor::new(SCHEMA_CSV))?;
            let records = load_records_reader(Cursor::new(RECORDS_CSV), &schema)?;
            Ok((schema, records, PathBuf::from(DEFAULT_OUTPUT)))
        }
        [schema_path, records_path, output] => {
            let schema = load_schema_csv(Path::new(schema_path))
                .with_context(|| format!("loading schema from {schema_path}"))?;
            let records = load_records_csv(Path::new(records_path), &schema)
                .with_context(|| format!("loading records from {records_path}"))?;
            Ok((schema, records, PathBuf::from(output)))
        }
        _ => bail!("usage: csv_ingest [SCHEMA_CSV RECORDS_CSV OUTPUT]"),
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (schema, records, output) = load_input(&args)?;
    let schema = Arc::new(schema);

    println!("=== csv_ingest ===");
    println!("Schema: {} measurements", schema.len());
    for m in schema.measurements() {
        println!("  {:<14} {:<8} {}", m.name, m.data_type.name(), m.encoding);
    }
    println!("Loaded {} records", records.len());
    println!();

    // 1. Open the session.
    let session = Arc::new(
        RecordWriter::open(&Destination::local(&output), Arc::clone(&schema), &WriterConfig::default())
            .with_context(|| format!("creating {}", output.display()))?,
    );

    // 2. Producers, each owning every PRODUCERS-th record.
    let t0 = Instant::now();
    let mut shards: Vec<Vec<TsRecord>> = vec![Vec::new(); PRODUCERS];
    for (i, record) in records.into_iter().enumerate() {
        shards[i % PRODUCERS].push(record);
    }
    let handles: Vec<_> = shards
        .into_iter()
        .map(|shard| {
            let session = Arc::clone(&session);
            thread::spawn(move || -> Result<(usize, usize)> {
                let (mut accepted, mut rejected) = (0, 0);
                for record in shard {
                    match session.write(record) {
                        Ok(()) => accepted += 1,
                        Err(e) if e.kind() == ErrorKind::SchemaViolation => {
                            eprintln!("skipped: {e}");
                            rejected += 1;
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                Ok((accepted, rejected))
            })
        })
        .collect();

    let (mut accepted, mut rejected) = (0, 0);
    for handle in handles {
        let Ok(result) = handle.join() else {
            bail!("producer thread panicked");
        };
        let (a, r) = result?;
        accepted += a;
        rejected += r;
    }

    // 3. Finalize.
    session.close().context("closing output")?;
    let elapsed = t0.elapsed();
    info!("wrote {accepted} records to {}", output.display());

    // 4. Read back.
    let reader = TsFileReader::open(&output)?;
    let stored = reader.num_records();
    let read_back = reader.read_all()?;

    println!("Ingest complete in {:.3} s", elapsed.as_secs_f64());
    println!("  accepted : {accepted}");
    println!("  rejected : {rejected}");
    println!("  stored   : {stored} rows in {}", output.display());
    println!();

    println!("{:<12} {:<16} {}", "Entity", "Timestamp", "Values");
    println!("{}", "-".repeat(56));
    for record in &read_back {
        let values: Vec<String> = record
            .points
            .iter()
            .map(|p| format!("{}={}", p.measurement, p.value))
            .collect();
        println!("{:<12} {:<16} {}", record.entity.as_str(), record.timestamp.as_millis(), values.join(" "));
    }

    Ok(())
}
