// End-to-end splits over a real SQLite file: config-shaped inputs, the
// read-only store, palette CSV, and the aggregator together.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::{params, Connection};

use moneyball_core::db::{RecordStore, SqliteStore};
use moneyball_core::palette::{Palette, PaletteTable};
use moneyball_core::splits::{Dimension, MetricKind, SplitsError, SplitsService};

/// (name, team, pitch, inning, alignment, hand, woba, babip, events)
type Row<'a> = (
    &'a str,
    &'a str,
    &'a str,
    i64,
    Option<&'a str>,
    &'a str,
    Option<f64>,
    Option<f64>,
    Option<&'a str>,
);

fn build_db(name: &str, rows: &[Row<'_>]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{name}.db"));
    let _ = std::fs::remove_file(&path);
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE data22 (
            batter_name TEXT, batter_team TEXT, pitch_type TEXT, inning INTEGER,
            if_fielding_alignment TEXT, p_throws TEXT,
            woba_value REAL, babip_value REAL, events TEXT
        );",
    )
    .unwrap();
    for r in rows {
        conn.execute(
            "INSERT INTO data22 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![r.0, r.1, r.2, r.3, r.4, r.5, r.6, r.7, r.8],
        )
        .unwrap();
    }
    path
}

fn build_colors(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{name}.csv"));
    std::fs::write(
        &path,
        "team,color1,color2\nCubs,#0E3386,#CC3433\nMets,#002D72,#FF5910\n",
    )
    .unwrap();
    path
}

fn service(db: &PathBuf, colors: &PathBuf) -> SplitsService {
    let store = SqliteStore::open(db, "data22").unwrap();
    let palettes = PaletteTable::load(
        colors,
        Palette::new(vec!["#000000".into(), "#FFFFFF".into()]),
    )
    .unwrap();
    SplitsService::new(Arc::new(store), palettes, "Seiya Suzuki", MetricKind::Woba)
}

fn season() -> Vec<Row<'static>> {
    vec![
        ("Seiya Suzuki", "Cubs", "FF", 3, Some("Standard"), "R", Some(0.400), Some(1.0), Some("single")),
        ("Seiya Suzuki", "Cubs", "SL", 11, Some("Infield shift"), "L", Some(0.100), Some(0.0), Some("field_out")),
        ("Seiya Suzuki", "Cubs", "CH", 6, Some("Standard"), "R", None, None, None),
        ("Seiya Suzuki", "Cubs", "EP", 9, None, "L", Some(0.700), Some(1.0), Some("double")),
        ("Pete Alonso", "Mets", "SI", 1, Some("Strategic"), "R", Some(2.0), Some(1.0), Some("home_run")),
    ]
}

#[test]
fn full_pipeline_over_sqlite() {
    let db = build_db("mb_it_pipeline", &season());
    let colors = build_colors("mb_it_pipeline_colors");
    let svc = service(&db, &colors);

    let result = svc.compute_splits("seiya SUZUKI", MetricKind::Woba).unwrap();
    assert_eq!(result.player, "Seiya Suzuki");
    assert_eq!(result.team.as_deref(), Some("Cubs"));
    assert_eq!(result.palette.colors(), ["#0E3386", "#CC3433"]);
    assert!((result.overall_mean.unwrap() - 0.4).abs() < 1e-12);

    let pitch_keys: Vec<_> = result.pitch.rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(pitch_keys, vec!["Fastball", "Breaking", "Offspeed", "Other"]);

    let inning_keys: Vec<_> = result.inning.rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(inning_keys, vec!["3", "6", "9", "Extras"]);

    let shift_keys: Vec<_> = result.shift.rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(shift_keys, vec!["Infield shift", "Standard", "Unknown"]);

    let platoon = &result.platoon;
    assert_eq!(platoon.row("L").unwrap().count, 2);
    assert!((platoon.row("L").unwrap().mean.unwrap() - 0.4).abs() < 1e-12);
    assert_eq!(platoon.row("R").unwrap().records, 2);
    assert_eq!(platoon.row("R").unwrap().plate_appearances, 1);

    assert_eq!(result.empty_buckets(), vec![(Dimension::Pitch, "Offspeed"), (Dimension::Inning, "6")]);

    let _ = std::fs::remove_file(&db);
    let _ = std::fs::remove_file(&colors);
}

#[test]
fn ba_metric_uses_babip_column() {
    let db = build_db("mb_it_ba", &season());
    let colors = build_colors("mb_it_ba_colors");
    let svc = service(&db, &colors);

    let result = svc.compute_from_params(Some("Seiya Suzuki"), Some("BA")).unwrap();
    assert_eq!(result.metric, MetricKind::Ba);
    assert!((result.overall_mean.unwrap() - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(result.pitch.row("Fastball").unwrap().mean, Some(1.0));

    let _ = std::fs::remove_file(&db);
    let _ = std::fs::remove_file(&colors);
}

#[test]
fn blank_request_falls_back_to_default_player() {
    let db = build_db("mb_it_fallback", &season());
    let colors = build_colors("mb_it_fallback_colors");
    let svc = service(&db, &colors);

    let result = svc.compute_from_params(None, None).unwrap();
    assert_eq!(result.player, "Seiya Suzuki");
    assert_eq!(result.metric, MetricKind::Woba);
    assert!(result.fell_back);

    let other = svc.compute_splits("pete alonso", MetricKind::Woba).unwrap();
    assert_eq!(other.team.as_deref(), Some("Mets"));
    assert_eq!(other.palette.colors()[0], "#002D72");

    let _ = std::fs::remove_file(&db);
    let _ = std::fs::remove_file(&colors);
}

#[test]
fn accented_uppercase_name_finds_player() {
    let mut rows = season();
    rows.push(("José Ramírez", "Guardians", "SI", 2, Some("Standard"), "L", Some(0.5), Some(1.0), Some("single")));
    let db = build_db("mb_it_unicode", &rows);
    let colors = build_colors("mb_it_unicode_colors");
    let svc = service(&db, &colors);

    let result = svc.compute_splits("JOSÉ RAMÍREZ", MetricKind::Woba).unwrap();
    assert!(!result.fell_back);
    assert_eq!(result.player, "José Ramírez");
    assert_eq!(result.team.as_deref(), Some("Guardians"));

    let _ = std::fs::remove_file(&db);
    let _ = std::fs::remove_file(&colors);
}

#[test]
fn store_failure_surfaces_as_unavailable() {
    let db = build_db("mb_it_unavailable", &season());
    let colors = build_colors("mb_it_unavailable_colors");
    let svc = service(&db, &colors);

    // Store opened fine; the file vanishes before the request.
    std::fs::remove_file(&db).unwrap();
    let err = svc.compute_splits("Seiya Suzuki", MetricKind::Woba).unwrap_err();
    assert!(matches!(err, SplitsError::StoreUnavailable(_)), "got {err}");

    let _ = std::fs::remove_file(&colors);
}

#[test]
fn concurrent_reads_share_no_state() {
    let db = build_db("mb_it_concurrent", &season());
    let store = Arc::new(SqliteStore::open(&db, "data22").unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                let name = if i % 2 == 0 { "Seiya Suzuki" } else { "pete alonso" };
                store.records_for_player(name).unwrap().len()
            })
        })
        .collect();

    for (i, h) in handles.into_iter().enumerate() {
        let expected = if i % 2 == 0 { 4 } else { 1 };
        assert_eq!(h.join().unwrap(), expected);
    }

    let _ = std::fs::remove_file(&db);
}
