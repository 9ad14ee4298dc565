/*!
 * Tests for bulk load descriptions against a file-backed database
 */

use anyhow::Result;

use recimport::database::{BulkLoad, DatabaseConnection, TableNames};
use recimport::tsv;
use crate::common;

/// Test that file columns and constants land in the right table columns
#[test]
fn test_executeFile_withCustomTables_shouldLoadPositionally() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let langs = common::create_test_file(temp_dir.path(), "l.tsv", "en\nsimple\n")?;
    let scores = common::create_test_file(temp_dir.path(), "s.tsv", "Q7\t0.25\tignored\n")?;

    let tables = TableNames::new("lang", "rec")?;
    let mut db = DatabaseConnection::new_in_memory(tables)?;

    let (languages, recommendations) = db.transaction(|tx, tables| {
        let languages = BulkLoad::into_table(&tables.language)
            .columns(&["code"])
            .execute_file(tx, &langs, |_, _| {})?;

        let recommendations = BulkLoad::into_table(&tables.recommendation)
            .columns(&["wikidata_id", "score"])
            .set("source_id", 2i64)
            .set("target_id", 1i64)
            .execute_file(tx, &scores, |_, _| {})?;

        Ok((languages, recommendations))
    })?;

    assert_eq!(languages, 2);
    assert_eq!(recommendations, 1);

    let row: (String, f64, i64, i64) = db.execute(|conn, _| {
        Ok(conn.query_row(
            "SELECT wikidata_id, score, source_id, target_id FROM rec",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?)
    })?;

    assert_eq!(row.0, "Q7");
    assert!((row.1 - 0.25).abs() < f64::EPSILON);
    assert_eq!((row.2, row.3), (2, 1));

    Ok(())
}

/// Test that a header-only file loads zero rows
#[test]
fn test_execute_withOnlyHeader_shouldInsertNothing() -> Result<()> {
    let mut db = DatabaseConnection::new_in_memory(TableNames::default())?;

    let inserted = db.transaction(|tx, tables| {
        BulkLoad::into_table(&tables.language)
            .columns(&["code"])
            .ignore_lines(1)
            .execute(tx, tsv::from_reader("code\n".as_bytes()), |_, _| {})
    })?;

    assert_eq!(inserted, 0);
    Ok(())
}

/// Test that an unknown constant column is rejected by the database
#[test]
fn test_execute_withUnknownColumn_shouldFail() -> Result<()> {
    let mut db = DatabaseConnection::new_in_memory(TableNames::default())?;

    let result = db.transaction(|tx, tables| {
        BulkLoad::into_table(&tables.language)
            .columns(&["code"])
            .set("missing_column", 1i64)
            .execute(tx, tsv::from_reader("en\n".as_bytes()), |_, _| {})
    });

    assert!(result.is_err());
    Ok(())
}
