#![cfg(feature = "sqlite")]

use std::collections::{BTreeSet, VecDeque};

use sql_typed_query::prelude::*;

mod common;

use common::sqlite::people_db;

#[test]
fn get_column_fills_containers_in_fetch_order() -> Result<(), Box<dyn std::error::Error>> {
    let conn = people_db()?;
    let mut names: GetColumn<'_, Sqlite, String, (&str,)> =
        GetColumn::new(&conn, "SELECT name FROM people WHERE team = ?1 ORDER BY id DESC")?;

    assert_eq!(names.call(("red",))?, ["cyd", "brook", "ada"]);
    assert!(names.call(("purple",))?.is_empty());

    let mut queue = VecDeque::from(["first".to_string()]);
    let added = names.collect_into(("red",), &mut queue)?;
    assert_eq!(added, 3);
    assert_eq!(queue, ["first", "cyd", "brook", "ada"]);

    let mut set = BTreeSet::new();
    names.collect_into(("blue",), &mut set)?;
    names.collect_into(("green",), &mut set)?;
    assert_eq!(set.into_iter().collect::<Vec<_>>(), ["dana", "eli"]);
    Ok(())
}

#[test]
fn get_table_returns_every_row() -> Result<(), Box<dyn std::error::Error>> {
    let conn = people_db()?;
    let mut table: GetTable<'_, Sqlite, (i64, String, Option<f64>), ()> =
        GetTable::new(&conn, "SELECT id, name, score FROM people ORDER BY id")?;

    let rows = table.call(())?;
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0], (1, "ada".to_string(), Some(9.5)));
    assert_eq!(rows[2], (3, "cyd".to_string(), None));
    assert_eq!(rows[4].0, 5);
    Ok(())
}

#[test]
fn write_into_fills_slots_and_rejects_overflow() -> Result<(), Box<dyn std::error::Error>> {
    let conn = people_db()?;
    let mut ids: GetColumn<'_, Sqlite, i64, (&str,)> =
        GetColumn::new(&conn, "SELECT id FROM people WHERE team = ?1 ORDER BY id")?;

    let mut slots = [0_i64; 5];
    let written = ids.write_into(("red",), slots.iter_mut())?;
    assert_eq!(written, 3);
    assert_eq!(slots, [1, 2, 3, 0, 0]);

    let mut small = [0_i64; 2];
    let err = ids.write_into(("red",), &mut small).unwrap_err();
    assert_eq!(
        err.cardinality_violation(),
        Some(CardinalityViolation::ExceedsCapacity(2))
    );
    assert_eq!(small, [1, 2]);

    let mut table: GetTable<'_, Sqlite, (i64, String), ()> =
        GetTable::new(&conn, "SELECT id, name FROM people WHERE id <= 2 ORDER BY id")?;
    let mut rows = vec![(0, String::new()); 2];
    assert_eq!(table.write_into((), &mut rows)?, 2);
    assert_eq!(rows[1], (2, "brook".to_string()));
    Ok(())
}
