// Checks that the files shipped at the repository root load with the same
// code the server uses at startup.

use std::path::{Path, PathBuf};

use moneyball_core::config::{load_config_from, CONFIG_FILE};
use moneyball_core::overview::load_page_data;
use moneyball_core::palette::{Palette, PaletteTable};
use moneyball_core::quotes::QuoteBook;

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

#[test]
fn default_config_validates() {
    // load_config_from reads config/, so stage the defaults in a scratch dir.
    let tmp = std::env::temp_dir().join("mb_shipped_config");
    let _ = std::fs::remove_dir_all(&tmp);
    std::fs::create_dir_all(tmp.join("config")).unwrap();
    std::fs::copy(
        repo_root().join("defaults").join(CONFIG_FILE),
        tmp.join("config").join(CONFIG_FILE),
    )
    .unwrap();

    let config = load_config_from(&tmp).expect("defaults should validate");
    assert_eq!(config.data.templates_dir, "templates");

    let _ = std::fs::remove_dir_all(&tmp);
}

#[test]
fn quotes_load() {
    let book = QuoteBook::load(&repo_root().join("static/quotes.csv")).unwrap();
    assert!(book.len() >= 3);
    let quote = book.random().unwrap();
    assert!(quote.link.starts_with("https://"));
}

#[test]
fn every_team_has_two_colors() {
    let fallback = Palette::new(vec!["#000000".into(), "#FFFFFF".into()]);
    let table = PaletteTable::load(&repo_root().join("static/team_colors.csv"), fallback.clone())
        .unwrap();
    assert_eq!(table.len(), 30);
    for team in ["CHC", "NYM", "MIA", "WSH"] {
        assert_ne!(table.resolve(Some(team)), fallback, "{team} should have its own palette");
    }
}

#[test]
fn page_data_files_are_objects() {
    let root = repo_root();
    let results = load_page_data(&root.join("data/query_results.json")).unwrap();
    assert!(results.contains_key("league_leaders_xwoba"));
    load_page_data(&root.join("static/saved_figs.json")).unwrap();
}

#[test]
fn static_pages_exist() {
    for page in ["blog.html", "roster.html", "abs.html", "about.html", "bts.html"] {
        assert!(
            repo_root().join("templates").join(page).is_file(),
            "templates/{page} should exist"
        );
    }
}
