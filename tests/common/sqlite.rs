use sql_typed_query::prelude::*;

pub const PEOPLE_SCHEMA: &str = "
    CREATE TABLE people (
        id     INTEGER PRIMARY KEY,
        name   TEXT NOT NULL,
        team   TEXT NOT NULL,
        score  REAL
    );
";

/// Five people: three on team `red`, one on `blue`, one on `green`.
pub const PEOPLE_ROWS: &str = "
    INSERT INTO people (id, name, team, score) VALUES
        (1, 'ada',    'red',   9.5),
        (2, 'brook',  'red',   7.0),
        (3, 'cyd',    'red',   NULL),
        (4, 'dana',   'blue',  8.25),
        (5, 'eli',    'green', 6.5);
";

pub fn people_db() -> Result<SqliteConnection, TypedQueryError> {
    let conn: SqliteConnection = Connection::open_in_memory()?;
    conn.execute_batch(PEOPLE_SCHEMA)?;
    conn.execute_batch(PEOPLE_ROWS)?;
    Ok(conn)
}

pub fn count_people<M: LockMode>(conn: &Connection<Sqlite, M>) -> Result<i64, TypedQueryError> {
    let mut count = conn.prepare::<(i64,), ()>("SELECT COUNT(*) FROM people")?;
    Ok(count.get_unique(())?.0)
}
