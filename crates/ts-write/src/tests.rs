//! Tests for ts-write.

#[cfg(test)]
mod support {
    use std::io::{self, Write};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use ts_core::{DataType, Encoding, FileSchema};
    use ts_io::{MemoryOutputStream, MemorySink, OutputStream, StreamConfig};

    pub fn tmp() -> tempfile::TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    pub fn temperature_schema() -> Arc<FileSchema> {
        Arc::new(FileSchema::builder().measurement("temperature", DataType::Double).build().unwrap())
    }

    pub fn weather_schema() -> Arc<FileSchema> {
        Arc::new(
            FileSchema::builder()
                .measurement_with_encoding("temperature", DataType::Double, Encoding::Gorilla)
                .measurement_with_encoding("humidity", DataType::Int32, Encoding::Rle)
                .measurement_with_encoding("online", DataType::Boolean, Encoding::Rle)
                .measurement_with_encoding("uptime", DataType::Int64, Encoding::DeltaBinaryPacked)
                .measurement("pressure", DataType::Float)
                .measurement_with_encoding("firmware", DataType::Text, Encoding::Dictionary)
                .build()
                .unwrap(),
        )
    }

    /// Switches for injecting stream failures from outside the writer.
    #[derive(Clone, Default)]
    pub struct Faults {
        pub fail_writes: Arc<AtomicBool>,
        pub fail_close:  Arc<AtomicBool>,
    }

    impl Faults {
        pub fn set_fail_writes(&self, on: bool) {
            self.fail_writes.store(on, Ordering::SeqCst);
        }

        pub fn set_fail_close(&self, on: bool) {
            self.fail_close.store(on, Ordering::SeqCst);
        }
    }

    /// In-memory stream whose writes and close can be made to fail.
    pub struct FailingStream {
        inner:  MemoryOutputStream,
        faults: Faults,
    }

    impl FailingStream {
        pub fn new(sink: MemorySink, faults: Faults) -> Self {
            let inner = MemoryOutputStream::create(sink, &StreamConfig::default()).unwrap();
            Self { inner, faults }
        }
    }

    impl Write for FailingStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.faults.fail_writes.load(Ordering::SeqCst) {
                return Err(io::Error::other("injected write failure"));
            }
            self.inner.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.inner.flush()
        }
    }

    impl OutputStream for FailingStream {
        fn position(&self) -> u64 {
            self.inner.position()
        }

        fn close(&mut self) -> io::Result<()> {
            if self.faults.fail_close.load(Ordering::SeqCst) {
                return Err(io::Error::other("injected close failure"));
            }
            self.inner.close()
        }
    }
}

// ── TsFileWriter ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod writer_tests {
    use std::sync::Arc;

    use ts_core::{TsRecord, Value};
    use ts_io::{Destination, MemorySink, StreamConfig};

    use super::support::{tmp, temperature_schema, weather_schema, Faults, FailingStream};
    use crate::{
        Compression, ErrorKind, RecordWriter, SessionState, TsFileReader, TsFileWriter, Violation,
        WriteError, WriterConfig,
    };

    fn temp(entity: &str, ts: i64, value: f64) -> TsRecord {
        TsRecord::new(entity, ts).with_point("temperature", value)
    }

    #[test]
    fn rejected_measurement_leaves_no_trace() {
        let dir = tmp();
        let path = dir.path().join("scenario.tsfile");
        let mut w = TsFileWriter::create(&Destination::local(&path), temperature_schema(), &WriterConfig::default())
            .unwrap();

        w.append(temp("A", 100, 21.5)).unwrap();

        let err = w.append(TsRecord::new("A", 101).with_point("humidity", 40)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert_eq!(err.measurement(), Some("humidity"));
        assert!(err.to_string().contains("humidity"));
        assert!(w.is_open());

        w.close().unwrap();
        assert_eq!(w.state(), SessionState::Closed);

        let records = TsFileReader::open(&path).unwrap().read_all().unwrap();
        assert_eq!(records, vec![temp("A", 100, 21.5)]);
    }

    #[test]
    fn compatible_records_keep_session_open() {
        let dir = tmp();
        let mut w = TsFileWriter::create(
            &Destination::local(dir.path().join("a.tsfile")),
            weather_schema(),
            &WriterConfig::default(),
        )
        .unwrap();

        w.append(TsRecord::new("d1", 1).with_point("temperature", 20.0)).unwrap();
        w.append(TsRecord::new("d1", 2).with_point("online", true).with_point("firmware", "1.0.3"))
            .unwrap();
        w.append(TsRecord::new("d2", 1).with_point("uptime", 86_400i64).with_point("pressure", 1013.25f32))
            .unwrap();

        assert!(w.is_open());
        assert_eq!(w.records_written(), 3);
        assert_eq!(w.buffered_rows(), 3);
    }

    #[test]
    fn invalid_record_fails_identically_on_retry() {
        let sink = MemorySink::new();
        let mut w = TsFileWriter::create(&Destination::Memory(sink.clone()), temperature_schema(), &WriterConfig::default())
            .unwrap();
        let bad = TsRecord::new("A", 5).with_point("temperature", 1.0).with_point("humidity", 40);

        let first = w.append(bad.clone()).unwrap_err().to_string();
        for _ in 0..3 {
            assert_eq!(w.append(bad.clone()).unwrap_err().to_string(), first);
        }
        assert_eq!(w.records_written(), 0);
        assert_eq!(w.buffered_rows(), 0);

        w.append(temp("A", 6, 2.0)).unwrap();
        w.close().unwrap();
        let records = TsFileReader::from_bytes(sink.contents()).unwrap().read_all().unwrap();
        assert_eq!(records, vec![temp("A", 6, 2.0)]);
    }

    #[test]
    fn type_mismatch_rejected() {
        let mut w = TsFileWriter::create(&Destination::memory(), temperature_schema(), &WriterConfig::default())
            .unwrap();
        let err = w.append(TsRecord::new("A", 1).with_point("temperature", 21i32)).unwrap_err();
        match err {
            WriteError::SchemaViolation { measurement, violation } => {
                assert_eq!(measurement, "temperature");
                assert!(matches!(violation, Violation::TypeMismatch { .. }));
            }
            other => panic!("expected schema violation, got {other}"),
        }
        assert!(w.is_open());
    }

    #[test]
    fn duplicate_measurement_rejected() {
        let mut w = TsFileWriter::create(&Destination::memory(), temperature_schema(), &WriterConfig::default())
            .unwrap();
        let err = w
            .append(TsRecord::new("A", 1).with_point("temperature", 1.0).with_point("temperature", 2.0))
            .unwrap_err();
        assert!(matches!(
            err,
            WriteError::SchemaViolation { violation: Violation::Duplicate, .. }
        ));
    }

    #[test]
    fn empty_record_rejected() {
        let mut w = TsFileWriter::create(&Destination::memory(), temperature_schema(), &WriterConfig::default())
            .unwrap();
        let err = w.append(TsRecord::new("A", 1)).unwrap_err();
        assert!(matches!(err, WriteError::EmptyRecord { .. }));
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
    }

    #[test]
    fn empty_entity_rejected() {
        let sink = MemorySink::new();
        let mut w = TsFileWriter::create(&Destination::Memory(sink.clone()), temperature_schema(), &WriterConfig::default())
            .unwrap();
        let err = w.append(temp("", 1, 1.0)).unwrap_err();
        assert!(matches!(err, WriteError::EmptyEntity { timestamp: 1 }), "got {err}");
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert!(w.is_open());
        assert_eq!(w.records_written(), 0);

        w.append(temp("A", 2, 2.0)).unwrap();
        w.close().unwrap();
        let records = TsFileReader::from_bytes(sink.contents()).unwrap().read_all().unwrap();
        assert_eq!(records, vec![temp("A", 2, 2.0)]);
    }

    #[test]
    fn second_close_fails_and_leaves_file_unchanged() {
        let dir = tmp();
        let path = dir.path().join("a.tsfile");
        let mut w = TsFileWriter::create(&Destination::local(&path), temperature_schema(), &WriterConfig::default())
            .unwrap();
        w.append(temp("A", 1, 1.0)).unwrap();
        w.close().unwrap();
        let before = std::fs::read(&path).unwrap();

        let err = w.close().unwrap_err();
        assert!(matches!(err, WriteError::AlreadyClosed));
        assert_eq!(err.kind(), ErrorKind::AlreadyClosed);
        assert_eq!(std::fs::read(&path).unwrap(), before);

        assert!(matches!(w.append(temp("A", 2, 2.0)), Err(WriteError::AlreadyClosed)));
        assert_eq!(TsFileReader::open(&path).unwrap().num_records(), 1);
    }

    #[test]
    fn stream_close_failure_keeps_writer_open() {
        let sink = MemorySink::new();
        let faults = Faults::default();
        let stream = Box::new(FailingStream::new(sink.clone(), faults.clone()));
        let mut w = TsFileWriter::new(stream, temperature_schema(), &WriterConfig::default()).unwrap();
        w.append(temp("A", 1, 1.0)).unwrap();

        faults.set_fail_close(true);
        let err = w.close().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
        assert!(w.is_open());

        // Footer is on the stream; no more appends, but close may be retried.
        assert!(matches!(w.append(temp("A", 2, 2.0)), Err(WriteError::Finalized)));

        faults.set_fail_close(false);
        w.close().unwrap();
        assert_eq!(w.state(), SessionState::Closed);

        let records = TsFileReader::from_bytes(sink.contents()).unwrap().read_all().unwrap();
        assert_eq!(records, vec![temp("A", 1, 1.0)]);
    }

    #[test]
    fn stream_write_failure_during_finalize_is_io_failure() {
        let faults = Faults::default();
        let stream = Box::new(FailingStream::new(MemorySink::new(), faults.clone()));
        let mut w = TsFileWriter::new(stream, temperature_schema(), &WriterConfig::default()).unwrap();
        w.append(temp("A", 1, 1.0)).unwrap();

        faults.set_fail_writes(true);
        let err = w.close().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure, "got {err}");
        assert!(w.is_open());
        assert_eq!(w.failure(), Some(ErrorKind::IoFailure));

        // The footer never made it out; retrying cannot repair that.
        faults.set_fail_writes(false);
        let retry = w.close().unwrap_err();
        assert!(matches!(retry, WriteError::Broken { .. }), "got {retry}");
        assert_eq!(retry.kind(), ErrorKind::IoFailure);
        w.abandon();
    }

    #[test]
    fn stream_failure_during_row_group_flush_breaks_writer() {
        let faults = Faults::default();
        let stream = Box::new(FailingStream::new(MemorySink::new(), faults.clone()));
        // One row group of 5000 rows is far larger than Parquet's internal
        // write buffer, so flushing it reaches the stream.
        let config = WriterConfig {
            max_buffered_rows:  5_000,
            max_row_group_size: 5_000,
            compression:        Compression::Uncompressed,
            ..WriterConfig::default()
        };
        let mut w = TsFileWriter::new(stream, temperature_schema(), &config).unwrap();
        for i in 0..4_999 {
            w.append(temp("A", i, i as f64)).unwrap();
        }
        assert_eq!(w.records_written(), 4_999);
        assert_eq!(w.failure(), None);

        faults.set_fail_writes(true);
        let err = w.append(temp("A", 4_999, 0.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure, "got {err}");
        assert_eq!(w.records_written(), 4_999);
        assert_eq!(w.failure(), Some(ErrorKind::IoFailure));

        // Even with the stream healthy again, nothing more is acknowledged.
        faults.set_fail_writes(false);
        for ts in 5_000..5_003 {
            let err = w.append(temp("A", ts, 1.0)).unwrap_err();
            assert!(matches!(err, WriteError::Broken { .. }), "got {err}");
            assert_eq!(err.kind(), ErrorKind::IoFailure);
        }
        assert_eq!(w.records_written(), 4_999);
        assert_eq!(w.flush().unwrap_err().kind(), ErrorKind::IoFailure);

        for _ in 0..2 {
            let err = w.close().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::IoFailure, "got {err}");
            assert!(w.is_open());
        }
        w.abandon();
    }

    #[test]
    fn broken_writer_surfaces_io_failure_through_session() {
        let faults = Faults::default();
        let stream = Box::new(FailingStream::new(MemorySink::new(), faults.clone()));
        let config = WriterConfig {
            max_buffered_rows:  4_000,
            max_row_group_size: 4_000,
            compression:        Compression::Uncompressed,
            ..WriterConfig::default()
        };
        let session = RecordWriter::new(TsFileWriter::new(stream, temperature_schema(), &config).unwrap());
        for i in 0..3_999 {
            session.write(temp("A", i, 0.5)).unwrap();
        }
        faults.set_fail_writes(true);
        assert_eq!(session.write(temp("A", 3_999, 0.5)).unwrap_err().kind(), ErrorKind::IoFailure);
        faults.set_fail_writes(false);
        assert_eq!(session.write(temp("A", 4_000, 0.5)).unwrap_err().kind(), ErrorKind::IoFailure);
        assert_eq!(session.close().unwrap_err().kind(), ErrorKind::IoFailure);
        assert_eq!(session.state().unwrap(), SessionState::Open);
        session.into_inner().unwrap().abandon();
    }

    #[test]
    fn dropped_writer_leaves_unreadable_file() {
        let dir = tmp();
        let path = dir.path().join("a.tsfile");
        {
            let mut w = TsFileWriter::create(&Destination::local(&path), temperature_schema(), &WriterConfig::default())
                .unwrap();
            w.append(temp("A", 1, 1.0)).unwrap();
            // Dropped without close(): no footer.
        }
        assert!(TsFileReader::open(&path).is_err(), "file without footer must not open");
    }

    #[test]
    fn buffered_rows_flush_at_threshold() {
        let config = WriterConfig { max_buffered_rows: 2, ..WriterConfig::default() };
        let mut w = TsFileWriter::create(&Destination::memory(), temperature_schema(), &config).unwrap();
        w.append(temp("A", 1, 1.0)).unwrap();
        assert_eq!(w.buffered_rows(), 1);
        w.append(temp("A", 2, 2.0)).unwrap();
        assert_eq!(w.buffered_rows(), 0);
        w.append(temp("A", 3, 3.0)).unwrap();
        assert_eq!(w.buffered_rows(), 1);
        w.flush().unwrap();
        assert_eq!(w.buffered_rows(), 0);
        assert_eq!(w.records_written(), 3);
    }

    #[test]
    fn append_order_preserved_across_row_groups() {
        let dir = tmp();
        let path = dir.path().join("many.tsfile");
        let config = WriterConfig {
            max_buffered_rows:  3,
            max_row_group_size: 4,
            compression:        Compression::Zstd,
            ..WriterConfig::default()
        };
        let mut w = TsFileWriter::create(&Destination::local(&path), weather_schema(), &config).unwrap();

        let mut expected = Vec::new();
        for i in 0..25i64 {
            let entity = if i % 2 == 0 { "d1" } else { "d2" };
            let mut r = TsRecord::new(entity, i).with_point("temperature", i as f64 * 0.5);
            if i % 3 == 0 {
                r.push("humidity", i as i32);
            }
            if i % 5 == 0 {
                r.push("firmware", format!("fw-{i}"));
            }
            expected.push(r.clone());
            w.append(r).unwrap();
        }
        w.close().unwrap();

        let reader = TsFileReader::open(&path).unwrap();
        assert_eq!(reader.num_records(), 25);
        assert_eq!(reader.read_all().unwrap(), expected);
    }

    #[test]
    fn schema_recovered_from_file() {
        let dir = tmp();
        let path = dir.path().join("schema.tsfile");
        let schema = weather_schema();
        let mut w = TsFileWriter::create(&Destination::local(&path), Arc::clone(&schema), &WriterConfig::default())
            .unwrap();
        w.append(
            TsRecord::new("d1", 1)
                .with_point("temperature", 1.5)
                .with_point("humidity", 40)
                .with_point("online", false)
                .with_point("uptime", 7i64)
                .with_point("pressure", 990.5f32)
                .with_point("firmware", "2.1"),
        )
        .unwrap();
        w.close().unwrap();

        let reader = TsFileReader::open(&path).unwrap();
        assert_eq!(**reader.schema(), *schema);
        let records = reader.read_all().unwrap();
        assert_eq!(records[0].get("online"), Some(&Value::Boolean(false)));
        assert_eq!(records[0].get("pressure"), Some(&Value::Float(990.5)));
    }

    #[test]
    fn invalid_config_is_construction_failure_and_removes_file() {
        let dir = tmp();
        let path = dir.path().join("bad.tsfile");
        let config = WriterConfig { max_row_group_size: 0, ..WriterConfig::default() };
        let err = TsFileWriter::create(&Destination::local(&path), temperature_schema(), &config)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::ConstructionFailure);
        assert!(!path.exists(), "partial file should be removed");
    }

    #[test]
    fn existing_file_is_construction_failure_and_untouched() {
        let dir = tmp();
        let path = dir.path().join("taken.tsfile");
        std::fs::write(&path, b"someone else's data").unwrap();
        let config = WriterConfig {
            stream: StreamConfig { overwrite: false, ..StreamConfig::default() },
            ..WriterConfig::default()
        };
        let err = TsFileWriter::create(&Destination::local(&path), temperature_schema(), &config)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::ConstructionFailure);
        assert_eq!(std::fs::read(&path).unwrap(), b"someone else's data");
    }

    #[test]
    fn remote_destination_unsupported() {
        let dest = Destination::resolve("hdfs://nn:8020/x.tsfile");
        assert!(dest.is_err());
    }

    #[test]
    fn bytes_reach_stream_only_by_close() {
        let sink = MemorySink::new();
        let mut w = TsFileWriter::create(&Destination::Memory(sink.clone()), temperature_schema(), &WriterConfig::default())
            .unwrap();
        w.append(temp("A", 1, 1.0)).unwrap();
        assert!(TsFileReader::from_bytes(sink.contents()).is_err());
        w.close().unwrap();
        assert_eq!(&sink.contents()[..4], b"PAR1");
        assert_eq!(&sink.contents()[sink.len() - 4..], b"PAR1");
    }
}

// ── RecordWriter ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod session_tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread;

    use ts_core::{TsRecord, Value};
    use ts_io::{Destination, MemorySink};

    use super::support::{tmp, temperature_schema, Faults, FailingStream};
    use crate::{ErrorKind, RecordWriter, SessionState, TsFileReader, TsFileWriter, WriterConfig};

    const THREADS: usize = 8;
    const PER_THREAD: i64 = 200;

    #[test]
    fn concurrent_writes_are_serialized() {
        let dir = tmp();
        let path = dir.path().join("concurrent.tsfile");
        let config = WriterConfig { max_buffered_rows: 7, max_row_group_size: 64, ..WriterConfig::default() };
        let session = Arc::new(RecordWriter::open(&Destination::local(&path), temperature_schema(), &config).unwrap());

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let session = Arc::clone(&session);
                thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        let record = TsRecord::new(format!("dev{t}"), i).with_point("temperature", i as f64);
                        session.write(record).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        session.close().unwrap();
        assert_eq!(session.records_written().unwrap(), THREADS as u64 * PER_THREAD as u64);

        let records = TsFileReader::open(&path).unwrap().read_all().unwrap();
        assert_eq!(records.len(), THREADS * PER_THREAD as usize);

        // Every row is intact and each producer's records keep their order.
        let mut by_entity: HashMap<String, Vec<i64>> = HashMap::new();
        for r in &records {
            assert_eq!(r.len(), 1);
            assert_eq!(r.get("temperature"), Some(&Value::Double(r.timestamp.0 as f64)));
            by_entity.entry(r.entity.to_string()).or_default().push(r.timestamp.0);
        }
        assert_eq!(by_entity.len(), THREADS);
        for timestamps in by_entity.values() {
            assert_eq!(*timestamps, (0..PER_THREAD).collect::<Vec<_>>());
        }
    }

    #[test]
    fn concurrent_rejections_do_not_disturb_valid_records() {
        let sink = MemorySink::new();
        let session = Arc::new(
            RecordWriter::open(&Destination::Memory(sink.clone()), temperature_schema(), &WriterConfig::default())
                .unwrap(),
        );

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let session = Arc::clone(&session);
                thread::spawn(move || {
                    let mut rejected = 0;
                    for i in 0..50i64 {
                        let record = if i % 2 == 0 {
                            TsRecord::new(format!("dev{t}"), i).with_point("temperature", i as f64)
                        } else {
                            TsRecord::new(format!("dev{t}"), i).with_point("humidity", 40)
                        };
                        if let Err(e) = session.write(record) {
                            assert_eq!(e.kind(), ErrorKind::SchemaViolation);
                            rejected += 1;
                        }
                    }
                    rejected
                })
            })
            .collect();
        let rejected: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(rejected, 4 * 25);

        session.close().unwrap();
        let records = TsFileReader::from_bytes(sink.contents()).unwrap().read_all().unwrap();
        assert_eq!(records.len(), 4 * 25);
        assert!(records.iter().all(|r| r.timestamp.0 % 2 == 0));
    }

    #[test]
    fn write_and_close_after_close_fail() {
        let session = RecordWriter::open(&Destination::memory(), temperature_schema(), &WriterConfig::default())
            .unwrap();
        session.write(TsRecord::new("A", 1).with_point("temperature", 1.0)).unwrap();
        session.close().unwrap();
        assert_eq!(session.state().unwrap(), SessionState::Closed);

        let err = session.write(TsRecord::new("A", 2).with_point("temperature", 2.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyClosed);
        assert_eq!(session.close().unwrap_err().kind(), ErrorKind::AlreadyClosed);
    }

    #[test]
    fn close_failure_propagates() {
        let faults = Faults::default();
        let stream = Box::new(FailingStream::new(MemorySink::new(), faults.clone()));
        let writer = TsFileWriter::new(stream, temperature_schema(), &WriterConfig::default()).unwrap();
        let session = RecordWriter::new(writer);
        session.write(TsRecord::new("A", 1).with_point("temperature", 1.0)).unwrap();

        faults.set_fail_close(true);
        let err = session.close().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
        assert!(err.to_string().starts_with("I/O failure"));
        assert_eq!(session.state().unwrap(), SessionState::Open);

        session.into_inner().unwrap().abandon();
    }

    #[test]
    fn construction_failure_surfaces_through_session() {
        let config = WriterConfig { max_buffered_rows: 0, ..WriterConfig::default() };
        let err = RecordWriter::open(&Destination::memory(), temperature_schema(), &config)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::ConstructionFailure);
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader_tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use ts_core::{DataType, Encoding, TsRecord, Value};
    use ts_io::Destination;

    use super::support::tmp;
    use crate::{
        load_records_reader, load_schema_reader, ErrorKind, LoadError, RecordWriter, TsFileReader,
        WriterConfig,
    };

    const SCHEMA_CSV: &str = "\
measurement,data_type,encoding\n\
temperature,DOUBLE,GORILLA\n\
status,BOOLEAN,RLE\n\
firmware,TEXT,\n";

    const RECORDS_CSV: &str = "\
entity,timestamp,measurement,value\n\
A,100,temperature,21.5\n\
A,100,status,true\n\
A,101,temperature,21.7\n\
B,100,firmware,v1.2\n\
A,102,humidity,40\n";

    #[test]
    fn schema_csv() {
        let schema = load_schema_reader(Cursor::new(SCHEMA_CSV)).unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.get("temperature").unwrap().encoding, Encoding::Gorilla);
        assert_eq!(schema.get("status").unwrap().data_type, DataType::Boolean);
        assert_eq!(schema.get("firmware").unwrap().encoding, Encoding::Plain);
    }

    #[test]
    fn schema_csv_unknown_type_reports_line() {
        let csv = "measurement,data_type,encoding\ntemperature,DECIMAL,\n";
        match load_schema_reader(Cursor::new(csv)).unwrap_err() {
            LoadError::Line { line, .. } => assert_eq!(line, 2),
            other => panic!("expected line error, got {other}"),
        }
    }

    #[test]
    fn records_grouped_by_entity_and_timestamp() {
        let schema = load_schema_reader(Cursor::new(SCHEMA_CSV)).unwrap();
        let records = load_records_reader(Cursor::new(RECORDS_CSV), &schema).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(
            records[0],
            TsRecord::new("A", 100).with_point("temperature", 21.5).with_point("status", true)
        );
        assert_eq!(records[2].get("firmware"), Some(&Value::Text("v1.2".into())));
        // Undeclared measurements come through as text for the writer to reject.
        assert_eq!(records[3].get("humidity"), Some(&Value::Text("40".into())));
    }

    #[test]
    fn bad_value_reports_line() {
        let schema = load_schema_reader(Cursor::new(SCHEMA_CSV)).unwrap();
        let csv = "entity,timestamp,measurement,value\nA,1,temperature,21.5\nA,2,temperature,hot\n";
        match load_records_reader(Cursor::new(csv), &schema).unwrap_err() {
            LoadError::Line { line, .. } => assert_eq!(line, 3),
            other => panic!("expected line error, got {other}"),
        }
    }

    #[test]
    fn csv_to_file() {
        let dir = tmp();
        let path = dir.path().join("csv.tsfile");
        let schema = Arc::new(load_schema_reader(Cursor::new(SCHEMA_CSV)).unwrap());
        let records = load_records_reader(Cursor::new(RECORDS_CSV), &schema).unwrap();

        let session = RecordWriter::open(&Destination::local(&path), Arc::clone(&schema), &WriterConfig::default())
            .unwrap();
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for r in records {
            match session.write(r.clone()) {
                Ok(()) => accepted.push(r),
                Err(e) => {
                    assert_eq!(e.kind(), ErrorKind::SchemaViolation);
                    rejected.push(e);
                }
            }
        }
        session.close().unwrap();

        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].as_write_error().and_then(|e| e.measurement()), Some("humidity"));
        assert_eq!(TsFileReader::open(&path).unwrap().read_all().unwrap(), accepted);
    }
}

// ── Errors & config ───────────────────────────────────────────────────────────

#[cfg(test)]
mod error_tests {
    use std::io;

    use parquet::errors::ParquetError;
    use ts_core::{DataType, Encoding};
    use parquet::basic::Encoding as ParquetEncoding;

    use crate::config::{column_encoding, ColumnEncoding};
    use crate::{ErrorKind, WriteError, WriterConfig};

    #[test]
    fn wrapped_io_error_is_io_failure() {
        let err = WriteError::from(ParquetError::External(Box::new(io::Error::other("disk gone"))));
        assert!(matches!(err, WriteError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn other_parquet_error_is_encoding() {
        let err = WriteError::from(ParquetError::General("bad page".into()));
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }

    #[test]
    fn construction_does_not_double_wrap() {
        let inner = WriteError::construction(io::Error::other("nope"));
        let outer = WriteError::construction(inner);
        match outer {
            WriteError::Construction(source) => assert!(matches!(*source, WriteError::Io(_))),
            other => panic!("expected construction error, got {other}"),
        }
    }

    #[test]
    fn config_validation() {
        assert!(WriterConfig::default().validate().is_ok());
        let zero = WriterConfig { max_buffered_rows: 0, ..WriterConfig::default() };
        assert_eq!(zero.validate().unwrap_err().kind(), ErrorKind::ConstructionFailure);
    }

    #[test]
    fn encoding_hints_map_to_supported_parquet_encodings() {
        assert_eq!(
            column_encoding(DataType::Int64, Encoding::DeltaBinaryPacked),
            ColumnEncoding::Explicit(ParquetEncoding::DELTA_BINARY_PACKED)
        );
        assert_eq!(
            column_encoding(DataType::Double, Encoding::DeltaBinaryPacked),
            ColumnEncoding::Explicit(ParquetEncoding::PLAIN)
        );
        assert_eq!(
            column_encoding(DataType::Boolean, Encoding::Rle),
            ColumnEncoding::Explicit(ParquetEncoding::RLE)
        );
        assert_eq!(column_encoding(DataType::Int32, Encoding::Rle), ColumnEncoding::FormatDefault);
        assert_eq!(column_encoding(DataType::Text, Encoding::Dictionary), ColumnEncoding::Dictionary);
    }
}
