#![cfg(feature = "sqlite")]

use std::ops::ControlFlow;

use sql_typed_query::prelude::*;

mod common;

use common::sqlite::people_db;

const ALL_PEOPLE: &str = "SELECT id, name FROM people WHERE id >= ?1 ORDER BY id";

#[test]
fn conditional_callback_stops_on_the_third_row() -> Result<(), Box<dyn std::error::Error>> {
    let conn = people_db()?;
    let mut each: Foreach<'_, Sqlite, (i64, String), (i64,)> = Foreach::new(&conn, ALL_PEOPLE)?;

    let mut visited = Vec::new();
    let outcome = each.for_each_until((1,), |(id, name)| {
        visited.push(name);
        if id == 3 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;

    assert_eq!(outcome, Visited::StoppedEarly);
    assert_eq!(visited, ["ada", "brook", "cyd"]);

    let outcome = each.for_each_until((1,), |_| ControlFlow::Continue(()))?;
    assert_eq!(outcome, Visited::AllRows);
    Ok(())
}

#[test]
fn side_effect_callback_visits_every_row() -> Result<(), Box<dyn std::error::Error>> {
    let conn = people_db()?;
    let mut each: Foreach<'_, Sqlite, (i64, String), (i64,)> = Foreach::new(&conn, ALL_PEOPLE)?;

    let mut ids = Vec::new();
    each.for_each((1,), |(id, _name)| ids.push(id))?;
    assert_eq!(ids, [1, 2, 3, 4, 5]);

    ids.clear();
    each.for_each((4,), |(id, _)| ids.push(id))?;
    assert_eq!(ids, [4, 5]);
    Ok(())
}

#[test]
fn function_owns_its_callback() -> Result<(), Box<dyn std::error::Error>> {
    let conn = people_db()?;

    let mut names = Vec::new();
    {
        let mut collect =
            Function::<'_, Sqlite, (i64, String), (i64,), _>::every_row(&conn, ALL_PEOPLE, |(_, name)| {
                names.push(name);
            })?;
        collect.call((1,))?;
        // Past the last id: no rows, so nothing more is collected.
        collect.call((6,))?;
    }
    assert_eq!(names, ["ada", "brook", "cyd", "dana", "eli"]);

    let mut seen = 0;
    let mut first_two =
        Function::<'_, Sqlite, (i64, String), (i64,), _>::until(&conn, ALL_PEOPLE, |_row| {
            seen += 1;
            if seen == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;
    assert_eq!(first_two.call((1,))?, Visited::StoppedEarly);
    drop(first_two);
    assert_eq!(seen, 2);
    Ok(())
}

struct Summer {
    total: f64,
    rows: usize,
}

impl RowVisitor<(Option<f64>,)> for Summer {
    type Output = Visited;

    fn visit(&mut self, (score,): (Option<f64>,)) -> ControlFlow<()> {
        self.rows += 1;
        self.total += score.unwrap_or_default();
        ControlFlow::Continue(())
    }

    fn finish(visited: Visited) -> Visited {
        visited
    }
}

#[test]
fn custom_visitor_keeps_state_between_calls() -> Result<(), Box<dyn std::error::Error>> {
    let conn = people_db()?;
    let mut sum: Function<'_, Sqlite, (Option<f64>,), (&str,), Summer> = Function::new(
        &conn,
        "SELECT score FROM people WHERE team = ?1",
        Summer { total: 0.0, rows: 0 },
    )?;

    assert_eq!(sum.call(("red",))?, Visited::AllRows);
    assert_eq!(sum.call(("blue",))?, Visited::AllRows);
    let summer = sum.into_visitor();
    assert_eq!(summer.rows, 4);
    assert!((summer.total - 24.75).abs() < f64::EPSILON);
    Ok(())
}

#[test]
fn callbacks_can_run_other_statements_on_the_same_connection() -> Result<(), Box<dyn std::error::Error>> {
    let conn = people_db()?;
    conn.execute_batch("CREATE TABLE visits (person_id INTEGER NOT NULL)")?;
    let mut each: Foreach<'_, Sqlite, (i64,), ()> =
        Foreach::new(&conn, "SELECT id FROM people ORDER BY id")?;
    let mut count: GetValueUnique<'_, Sqlite, i64, ()> =
        GetValueUnique::new(&conn, "SELECT COUNT(*) FROM visits")?;

    let mut seen = Vec::new();
    let mut failures = Vec::new();
    each.for_each((), |(id,)| {
        let visits = conn
            .execute("INSERT INTO visits (person_id) VALUES (?1)", (id,))
            .and_then(|()| count.call(()));
        match visits {
            Ok(visits) => seen.push(visits),
            Err(err) => failures.push(err.to_string()),
        }
    })?;

    assert!(failures.is_empty(), "{failures:?}");
    assert_eq!(seen, [1, 2, 3, 4, 5]);
    assert_eq!(common::sqlite::count_people(&conn)?, 5);
    Ok(())
}
