use super::*;

#[test]
fn test_captures_in_order() {
    let mut driver = CaptureDriver::new();
    driver
        .execute_compiled(&CompiledQuery::new("CREATE SCHEMA a;"))
        .unwrap();
    driver
        .execute_compiled(&CompiledQuery::new("CREATE TABLE a.node(id uuid);"))
        .unwrap();

    assert_eq!(
        driver.harvest(),
        &["CREATE SCHEMA a;", "CREATE TABLE a.node(id uuid);"]
    );
}

#[test]
fn test_invalid_sql_still_succeeds() {
    let mut driver = CaptureDriver::new();
    let result = driver
        .execute_compiled(&CompiledQuery::new("this is not sql"))
        .unwrap();
    assert!(result.rows.is_empty());
    assert_eq!(result.rows_affected, None);
}

#[test]
fn test_harvest_does_not_clear() {
    let mut driver = CaptureDriver::new();
    driver.execute_compiled(&CompiledQuery::new("SELECT 1")).unwrap();
    assert_eq!(driver.harvest().len(), 1);
    assert_eq!(driver.harvest().len(), 1);

    driver.reset();
    assert!(driver.harvest().is_empty());
}

#[test]
fn test_lifecycle_is_noop() {
    let mut driver = CaptureDriver::new();
    driver.init().unwrap();
    driver.acquire_connection().unwrap();
    driver.begin_transaction().unwrap();
    driver.execute_compiled(&CompiledQuery::new("SELECT 1")).unwrap();
    driver.rollback_transaction().unwrap();
    driver.begin_transaction().unwrap();
    driver.commit_transaction().unwrap();
    driver.release_connection().unwrap();
    driver.destroy().unwrap();

    // Rolling back does not discard captured text
    assert_eq!(driver.harvest(), &["SELECT 1"]);
    assert_eq!(driver.driver_type(), "capture");
}
