//! Criterion comparison of single-row SELECT latency for a raw cached
//! `rusqlite` statement vs. the `GetRowUnique` functor. Both variants read the
//! same seeded file so the numbers show call overhead, not storage effects.

use std::fs;
use std::hint::black_box;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use sql_typed_query::prelude::*;

struct Dataset {
    path: String,
    ids: Vec<i64>,
}

static DATASET: LazyLock<Dataset> = LazyLock::new(|| {
    let row_count = lookup_row_count();
    let path = PathBuf::from("benchmark_typed_single_lookup.db");
    prepare_dataset(&path, row_count).expect("failed to prepare SQLite dataset");

    let mut ids: Vec<i64> = (1..=row_count as i64).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(1_234_567_890);
    ids.shuffle(&mut rng);

    Dataset {
        path: path.to_string_lossy().into_owned(),
        ids,
    }
});

fn lookup_row_count() -> usize {
    std::env::var("BENCH_LOOKUPS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(1000)
}

fn prepare_dataset(path: &Path, row_count: usize) -> Result<(), TypedQueryError> {
    if path.exists() {
        fs::remove_file(path)?;
    }

    let conn: SqliteConnection = SqliteConfig::builder(path.to_string_lossy())
        .journal_mode(JournalMode::Wal)
        .connect()?;
    conn.execute_batch(
        "CREATE TABLE test (
            id      INTEGER PRIMARY KEY,
            name    TEXT NOT NULL,
            score   REAL NOT NULL,
            active  INTEGER NOT NULL
        );",
    )?;

    let tx = conn.transaction()?;
    {
        let mut insert: Execute<'_, Sqlite, (i64, String, f64, bool)> = Execute::new(
            &conn,
            "INSERT INTO test (id, name, score, active) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for id in 1..=row_count as i64 {
            insert.call((id, format!("name-{id}"), id as f64 * 0.5, id % 2 == 0))?;
        }
    }
    tx.commit()?;
    conn.close()
}

type BenchRow = (i64, String, f64, bool);

fn benchmark_rusqlite_direct(
    group: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>,
) {
    let dataset = &*DATASET;
    let connection = rusqlite::Connection::open(&dataset.path).expect("open sqlite connection");

    group.bench_function(BenchmarkId::new("rusqlite", dataset.ids.len()), |b| {
        b.iter_custom(|iters| {
            let mut stmt = connection
                .prepare_cached("SELECT id, name, score, active FROM test WHERE id = ?1")
                .expect("prepare select statement");
            let mut total = Duration::default();
            for _ in 0..iters {
                let start = Instant::now();
                for &id in &dataset.ids {
                    let row: BenchRow = stmt
                        .query_row([id], |row| {
                            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                        })
                        .expect("query row");
                    black_box(row);
                }
                total += start.elapsed();
            }
            total
        });
    });
}

fn benchmark_functor(group: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>) {
    let dataset = &*DATASET;
    let conn: SqliteConnection = Connection::open(dataset.path.clone()).expect("open connection");
    let mut lookup: GetRowUnique<'_, Sqlite, BenchRow, (i64,)> =
        GetRowUnique::new(&conn, "SELECT id, name, score, active FROM test WHERE id = ?1")
            .expect("prepare lookup");

    group.bench_function(BenchmarkId::new("get_row_unique", dataset.ids.len()), |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::default();
            for _ in 0..iters {
                let start = Instant::now();
                for &id in &dataset.ids {
                    black_box(lookup.call((id,)).expect("lookup row"));
                }
                total += start.elapsed();
            }
            total
        });
    });
}

fn single_row_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("sqlite_single_row_lookup");
    group.throughput(Throughput::Elements(DATASET.ids.len() as u64));
    benchmark_rusqlite_direct(&mut group);
    benchmark_functor(&mut group);
    group.finish();
}

criterion_group!(benches, single_row_lookup);
criterion_main!(benches);
