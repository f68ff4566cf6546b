use std::path::{Path, PathBuf};

use songset::utils::*;

#[test]
fn test_generate_state() {
    let state = generate_state();

    // Should be exactly 32 characters
    assert_eq!(state.len(), 32);

    // Should contain only alphanumeric characters
    assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated states should be different
    assert_ne!(state, generate_state());
}

#[test]
fn test_default_categories() {
    let categories = default_categories();

    assert_eq!(categories.len(), 7);
    assert_eq!(categories[0].name, "pop");
    assert_eq!(categories[0].id, "0JQ5DAqbMKFEC4WFtoNRpw");

    // Names are unique
    let mut names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 7);
}

#[test]
fn test_parse_category() {
    let category = parse_category("pop=abc123").unwrap();
    assert_eq!(category.name, "pop");
    assert_eq!(category.id, "abc123");

    // Surrounding whitespace is trimmed
    let category = parse_category(" r&b = xyz ").unwrap();
    assert_eq!(category.name, "r&b");
    assert_eq!(category.id, "xyz");

    // Names may contain slashes
    let category = parse_category("dance/electronic=id1").unwrap();
    assert_eq!(category.name, "dance/electronic");
}

#[test]
fn test_parse_category_invalid() {
    assert!(parse_category("pop").is_err());
    assert!(parse_category("=abc").is_err());
    assert!(parse_category("pop=").is_err());
    assert!(parse_category("").is_err());
}

#[test]
fn test_callback_target() {
    let (addr, path) = callback_target("http://localhost:3000").unwrap();
    assert_eq!(addr, "localhost:3000");
    assert_eq!(path, "/");

    let (addr, path) = callback_target("http://127.0.0.1:8888/callback").unwrap();
    assert_eq!(addr, "127.0.0.1:8888");
    assert_eq!(path, "/callback");

    // Known default port is filled in
    let (addr, _) = callback_target("http://localhost/cb").unwrap();
    assert_eq!(addr, "localhost:80");
}

#[test]
fn test_callback_target_invalid() {
    assert!(callback_target("not a url").is_err());

    // The health route cannot double as the callback
    assert!(callback_target("http://localhost:3000/health").is_err());
}

#[test]
fn test_is_csv() {
    assert!(is_csv(Path::new("data/train.csv")));
    assert!(is_csv(Path::new("TRAIN.CSV")));
    assert!(!is_csv(Path::new("train.parquet")));
    assert!(!is_csv(Path::new("csv")));
    assert!(!is_csv(Path::new("notes.csv.txt")));
}

#[test]
fn test_parquet_destination() {
    let dest = parquet_destination(Path::new("dirty/train.csv"), Path::new("clean"));
    assert_eq!(dest, Some(PathBuf::from("clean/train.parquet")));

    // Only the extension is replaced, even if the stem ends in "csv"
    let dest = parquet_destination(Path::new("dirty/transactions_csv.csv"), Path::new("clean"));
    assert_eq!(dest, Some(PathBuf::from("clean/transactions_csv.parquet")));

    // Inner dots are kept
    let dest = parquet_destination(Path::new("a.b.csv"), Path::new("out"));
    assert_eq!(dest, Some(PathBuf::from("out/a.b.parquet")));
}

#[test]
fn test_progress_helpers() {
    let pb = progress_bar(4, "Fetching metadata...");
    assert_eq!(pb.length(), Some(4));
    pb.inc(1);
    assert_eq!(pb.position(), 1);
    pb.finish_and_clear();

    let spinner = spinner("Working...");
    assert_eq!(spinner.message(), "Working...");
    spinner.finish_and_clear();
}
