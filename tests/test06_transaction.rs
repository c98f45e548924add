#![cfg(feature = "sqlite")]

use sql_typed_query::prelude::*;

mod common;

use common::sqlite::{count_people, people_db};

fn add_person(conn: &SqliteConnection, name: &str) -> Result<i64, TypedQueryError> {
    conn.insert(
        "INSERT INTO people (name, team) VALUES (?1, 'white')",
        (name,),
    )
}

#[test]
fn dropped_transaction_rolls_back() -> Result<(), Box<dyn std::error::Error>> {
    let conn = people_db()?;
    {
        let tx = conn.transaction()?;
        assert_eq!(tx.state(), TxState::Active);
        assert_eq!(tx.exit_action(), ExitAction::Rollback);
        add_person(&conn, "ghost")?;
        assert_eq!(count_people(&conn)?, 6);
    }
    assert_eq!(count_people(&conn)?, 5);
    Ok(())
}

#[test]
fn committed_transaction_is_visible() -> Result<(), Box<dyn std::error::Error>> {
    let conn = people_db()?;
    let tx = Transaction::begin(&conn)?;
    add_person(tx.connection(), "gwen")?;
    tx.commit()?;
    assert_eq!(count_people(&conn)?, 6);

    let tx = conn.transaction()?;
    add_person(&conn, "hal")?;
    tx.rollback()?;
    assert_eq!(count_people(&conn)?, 6);
    Ok(())
}

#[test]
fn autocommit_transaction_commits_on_drop() -> Result<(), Box<dyn std::error::Error>> {
    let conn = people_db()?;
    {
        let _tx = conn.transaction_autocommit()?;
        add_person(&conn, "ivy")?;
    }
    assert_eq!(count_people(&conn)?, 6);

    let tx = Transaction::begin_autocommit(&conn)?;
    add_person(&conn, "jon")?;
    assert_eq!(tx.finish()?, TxState::Committed);
    assert_eq!(count_people(&conn)?, 7);
    Ok(())
}

#[test]
fn finish_reports_exit_failures() -> Result<(), Box<dyn std::error::Error>> {
    let conn = people_db()?;
    let tx = conn.transaction()?;
    add_person(&conn, "kim")?;
    // Ending the transaction behind the controller's back makes its ROLLBACK fail.
    conn.execute_batch("COMMIT")?;
    assert!(tx.finish().is_err());
    assert_eq!(count_people(&conn)?, 6);

    let tx = conn.transaction()?;
    conn.execute_batch("ROLLBACK")?;
    // The failing implicit rollback is logged, not raised.
    drop(tx);
    assert_eq!(count_people(&conn)?, 6);
    Ok(())
}

#[test]
fn nested_begin_is_a_backend_error() -> Result<(), Box<dyn std::error::Error>> {
    let conn = people_db()?;
    let _outer = conn.transaction()?;
    let err = conn.transaction().unwrap_err();
    assert!(matches!(err, TypedQueryError::SqliteError(_)), "{err}");
    Ok(())
}
