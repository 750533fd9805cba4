use std::cell::Cell;

use websql_sync::prelude::*;

fn egg_db() -> Result<Database, WebSqlError> {
    let db = Database::open(":memory:")?;
    db.exec("CREATE TABLE egg (a, y, e)")?;
    Ok(db)
}

#[test]
fn insert_reports_affected_rows_and_insert_id() -> Result<(), Box<dyn std::error::Error>> {
    let db = egg_db()?;

    let seen_id = Cell::new(0);
    db.query(
        "INSERT INTO egg (a) VALUES (1)",
        QueryOptions::new().on_complete(|batch| seen_id.set(batch.map_or(0, |b| b.insert_id))),
    )?;
    assert_eq!(seen_id.get(), 1);

    let batch = db
        .query(
            "INSERT INTO egg (a) VALUES (?)",
            QueryOptions::new().parameters(vec![RowValues::Int(5)]),
        )?
        .expect("one statement");
    assert_eq!(batch.statement_count(), 1);
    assert_eq!(batch.rows_affected, 1);
    assert_eq!(batch.insert_id, 2);
    assert!(batch.rows().item(0).is_none());
    Ok(())
}

#[test]
fn each_statement_gets_its_own_result_set() -> Result<(), Box<dyn std::error::Error>> {
    let db = egg_db()?;
    db.exec("INSERT INTO egg (a) VALUES (1); INSERT INTO egg (a) VALUES (5);")?;

    let batch = db
        .query("UPDATE egg SET y='Y'; UPDATE egg SET e='E';", QueryOptions::new())?
        .expect("two statements");
    assert_eq!(batch.all().len(), 2);
    assert_eq!(batch.all()[0].rows_affected, 2);
    assert_eq!(batch.all()[1].rows_affected, 2);

    let batch = db
        .query("SELECT 1 AS n; SELECT 2 AS n; SELECT 3 AS n", QueryOptions::new())?
        .expect("three statements");
    let ns: Vec<i64> = batch
        .all()
        .iter()
        .map(|rs| *rs[0].get("n").and_then(RowValues::as_int).expect("n"))
        .collect();
    assert_eq!(ns, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn counters_are_captured_per_statement() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(":memory:")?;
    db.exec("CREATE TABLE t (a)")?;

    let batch = db
        .query(
            "INSERT INTO t VALUES (1), (2), (3);
             UPDATE t SET a = a + 10 WHERE a > 1;
             DELETE FROM t WHERE a = 1;",
            QueryOptions::new(),
        )?
        .expect("three statements");
    let affected: Vec<u64> = batch.all().iter().map(|rs| rs.rows_affected).collect();
    assert_eq!(affected, vec![3, 2, 1]);
    assert_eq!(batch.all()[0].insert_id, 3);
    assert_eq!(batch.all()[2].insert_id, 3);
    Ok(())
}

#[test]
fn rows_view_matches_indexing() -> Result<(), Box<dyn std::error::Error>> {
    let db = egg_db()?;
    db.exec("INSERT INTO egg VALUES (1, 'a', 'b'); INSERT INTO egg VALUES (2, 'c', 'd');")?;

    let batch = db
        .query("SELECT * FROM egg ORDER BY a", QueryOptions::new())?
        .expect("one statement");
    let rows = batch.rows();
    assert_eq!(rows.length(), 2);
    assert_eq!(rows.length(), batch.len());
    for i in 0..rows.length() {
        assert!(std::ptr::eq(rows.item(i).expect("row"), &batch[i]));
    }
    assert!(rows.item(rows.length()).is_none());

    let mut visited = 0;
    while let Some(row) = rows.item(visited) {
        assert!(row.get("a").is_some());
        visited += 1;
    }
    assert_eq!(visited, 2);
    assert_eq!(batch.column_names(), ["a", "y", "e"]);
    Ok(())
}

#[test]
fn on_complete_sees_primary_and_every_result_set() -> Result<(), Box<dyn std::error::Error>> {
    let db = egg_db()?;
    db.exec(
        "INSERT INTO egg VALUES (1, 'Y', 'E'); INSERT INTO egg VALUES (2, 'Y', 'E');
         INSERT INTO egg VALUES (3, 'Y', 'E'); INSERT INTO egg VALUES (4, 'Y', 'E');",
    )?;

    let calls = Cell::new(0);
    let returned = db.query(
        "SELECT a FROM egg; SELECT y FROM egg",
        QueryOptions::new().on_complete(|batch| {
            calls.set(calls.get() + 1);
            let batch = batch.expect("two statements");
            let (as_, ys) = (&batch.all()[0], &batch.all()[1]);
            assert!(std::ptr::eq(batch.primary(), as_));
            assert_eq!(as_.len(), 4);
            assert_eq!(ys.len(), 4);
            assert_eq!(ys[0].get("y"), Some(&RowValues::Text("Y".into())));
        }),
    )?;
    assert_eq!(calls.get(), 1);
    assert_eq!(returned.expect("batch").statement_count(), 2);
    Ok(())
}

#[test]
fn blank_sql_yields_no_result() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(":memory:")?;
    let calls = Cell::new(0);
    let saw_none = Cell::new(false);

    assert!(db.query("", QueryOptions::new())?.is_none());
    let result = db.query(
        " \n\t ",
        QueryOptions::new().on_complete(|batch| {
            calls.set(calls.get() + 1);
            saw_none.set(batch.is_none());
        }),
    )?;
    assert!(result.is_none());
    assert_eq!(calls.get(), 1);
    assert!(saw_none.get());
    Ok(())
}

#[test]
fn malformed_sql_fails_the_batch() -> Result<(), Box<dyn std::error::Error>> {
    let db = egg_db()?;
    let called = Cell::new(false);

    let err = db
        .query(
            "CRAPPY QUERY THAT DOESN'T WORK",
            QueryOptions::new().on_complete(|_| called.set(true)),
        )
        .unwrap_err();
    assert!(matches!(err, WebSqlError::SqliteError(_)));
    assert!(!called.get());

    // statements before the bad one have already run
    let err = db
        .query("INSERT INTO egg (a) VALUES (7); SELEKT 1;", QueryOptions::new())
        .unwrap_err();
    assert!(matches!(err, WebSqlError::SqliteError(_)));
    let count = db
        .query("SELECT count(*) AS c FROM egg", QueryOptions::new())?
        .expect("one statement");
    assert_eq!(count[0].get("c"), Some(&RowValues::Int(1)));
    Ok(())
}

#[test]
fn values_come_back_as_stored() -> Result<(), Box<dyn std::error::Error>> {
    let db = egg_db()?;
    db.query(
        "INSERT INTO egg (a, y, e) VALUES (?, ?, ?)",
        QueryOptions::new().parameters(vec![
            RowValues::Float(1.01),
            RowValues::Text("two".into()),
            RowValues::Blob(vec![0, 1, 2]),
        ]),
    )?;

    let batch = db
        .query("SELECT a, y, e FROM egg", QueryOptions::new())?
        .expect("one statement");
    let row = batch.rows().item(0).expect("row");
    assert_eq!(row.get("a"), Some(&RowValues::Float(1.01)));
    assert_eq!(row.get("y").and_then(RowValues::as_text), Some("two"));
    assert_eq!(row.get("e").and_then(RowValues::as_blob), Some(&[0u8, 1, 2][..]));

    let json = serde_json::to_value(&batch)?;
    assert_eq!(json[0]["rows"][0]["y"], "two");
    assert_eq!(json[0]["rowsAffected"], 1);
    Ok(())
}

#[test]
fn file_database_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("test.db");
    let path = path.to_string_lossy().into_owned();

    let created = Cell::new(false);
    let db = open_database(&path, "1.0", "Test", 1024, |db| {
        created.set(db.options().version.as_deref() == Some("1.0"));
    })?;
    assert!(created.get());
    db.exec("CREATE TABLE egg (a)")?;
    db.query(
        "INSERT INTO egg VALUES (?)",
        QueryOptions::new().parameters(vec![RowValues::Int(42)]),
    )?;
    db.close()?;

    let db = DatabaseOptionsBuilder::new(path).wal(true).open()?;
    let batch = db
        .query("SELECT a FROM egg", QueryOptions::new())?
        .expect("one statement");
    assert_eq!(batch[0].get("a"), Some(&RowValues::Int(42)));
    db.close()?;
    Ok(())
}
