///
/// Minimal tour of the client core: open an in-memory database, run DDL
/// and an ad-hoc query with a row callback, then use a prepared statement
/// with named parameters and typed fetch.
///

use sq3_core::{consts, Connection, RowAction, StatusCode};

fn main() {
    println!("engine {} ({})", sq3_core::lib_version(), sq3_core::source_id());

    let mut conn = Connection::new();
    let rc = conn.open(":memory:", consts::OPEN_DEFAULT);
    assert_eq!(rc, StatusCode::OK, "open failed: {rc}");

    conn.execute("CREATE TABLE users(id INTEGER PRIMARY KEY, name TEXT, score REAL)");

    let mut insert = conn
        .prepare("INSERT INTO users(name, score) VALUES (:name, :score)")
        .expect("prepare insert");
    for (name, score) in [("ada", 99.5f64), ("grace", 97.0), ("linus", 88.25)] {
        insert.bind_text(":name", name);
        insert.bind_double(":score", score);
        assert_eq!(insert.step(), StatusCode::DONE);
        insert.reset();
        insert.clear_bindings();
    }
    insert.finalize();
    println!("inserted {} rows", conn.total_changes());

    // Ad-hoc path: text-oriented, one callback per row.
    conn.execute_rows("SELECT id, name FROM users ORDER BY id", |names, values| {
        for (n, v) in names.iter().zip(values) {
            print!("{n}={} ", v.unwrap_or("<null>"));
        }
        println!();
        RowAction::Continue
    });

    // Typed path: prepared statement with fetch.
    let mut top = conn
        .prepare("SELECT name, score FROM users WHERE score >= ? ORDER BY score DESC")
        .expect("prepare select");
    top.bind_double(1, 90.0);
    loop {
        let (row, rc) = top.fetch();
        let Some(row) = row else {
            assert_eq!(rc, StatusCode::DONE, "fetch failed: {rc}");
            break;
        };
        println!("{:?}", row.iter().collect::<Vec<_>>());
    }
    top.finalize();

    assert_eq!(conn.close(), StatusCode::OK);
}
