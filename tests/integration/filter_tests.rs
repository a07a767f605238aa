use blockdupe::duplicates::{DuplicateFinder, FinderConfig};
use blockdupe::scanner::{ExcludeSet, PatternSet, Walker, WalkerConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn walked(root: &Path, config: WalkerConfig) -> Vec<PathBuf> {
    Walker::new(root, config)
        .walk()
        .filter_map(Result::ok)
        .map(|entry| entry.path)
        .collect()
}

#[test]
fn test_scenario_d_exclude_fragment() {
    let dir = tempdir().unwrap();
    write(dir.path(), "project/build/test/x.txt", b"excluded");
    let kept = write(dir.path(), "project/build/x.txt", b"excluded");

    let config = WalkerConfig::default()
        .with_recursive(true)
        .with_excludes(ExcludeSet::new(["build/test"]));

    assert_eq!(walked(dir.path(), config), vec![kept]);
}

#[test]
fn test_excluded_copy_never_reaches_tree() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/data.bin", b"payload");
    write(dir.path(), "target/data.bin", b"payload");

    let walker = WalkerConfig::default()
        .with_recursive(true)
        .with_excludes(ExcludeSet::new(["target"]));
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker));
    let (tree, summary) = finder.scan(&[dir.path().to_path_buf()]);

    assert_eq!(summary.total_files, 1);
    assert_eq!(tree.groups().count(), 0);
}

#[test]
fn test_exclude_is_relative_to_root() {
    let dir = tempdir().unwrap();
    let inside = write(dir.path(), "build/keep.txt", b"keep");

    // the root itself lives under "build"; only components below it count
    let config = WalkerConfig::default()
        .with_recursive(true)
        .with_excludes(ExcludeSet::new(["build"]));
    assert_eq!(walked(&dir.path().join("build"), config), vec![inside]);
}

#[test]
fn test_exclude_does_not_match_partial_names() {
    let dir = tempdir().unwrap();
    let kept = write(dir.path(), "builder/file.txt", b"data");

    let config = WalkerConfig::default()
        .with_recursive(true)
        .with_excludes(ExcludeSet::new(["build"]));
    assert_eq!(walked(dir.path(), config), vec![kept]);
}

#[test]
fn test_patterns_restrict_candidates() {
    let dir = tempdir().unwrap();
    let jpg = write(dir.path(), "a.JPG", b"image");
    let jpeg = write(dir.path(), "b.jpeg", b"image");
    write(dir.path(), "c.txt", b"image");
    write(dir.path(), "d.jpg.bak", b"image");

    let config = WalkerConfig::default()
        .with_patterns(PatternSet::parse(r".*\.jpe?g;.*\.png").unwrap());

    assert_eq!(walked(dir.path(), config), vec![jpg, jpeg]);
}

#[test]
fn test_patterns_accept_all_separators() {
    let patterns = PatternSet::parse("a.*,b.*;c.*:d.*").unwrap();
    assert_eq!(patterns.len(), 4);
    for name in ["alpha", "beta", "gamma_c", "delta"] {
        let expected = name != "gamma_c";
        assert_eq!(patterns.matches_name(name), expected, "{name}");
    }
}

#[test]
fn test_min_size_filter() {
    let dir = tempdir().unwrap();
    write(dir.path(), "small", b"abc");
    let big = write(dir.path(), "big", b"abcdefgh");

    let config = WalkerConfig::default().with_min_size(5);
    assert_eq!(walked(dir.path(), config), vec![big]);
}
