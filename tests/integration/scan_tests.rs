use blockdupe::duplicates::{DedupTree, DuplicateFinder, FinderConfig};
use blockdupe::scanner::{HashAlgorithm, HashError, WalkerConfig};
use std::fs;
use std::num::NonZeroUsize;
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

fn block_size(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

fn finder(block: usize, walker: WalkerConfig) -> DuplicateFinder {
    DuplicateFinder::new(
        FinderConfig::default()
            .with_block_size(block_size(block))
            .with_walker_config(walker),
    )
}

fn group_paths(tree: &DedupTree) -> Vec<Vec<PathBuf>> {
    tree.groups().map(|g| g.paths.to_vec()).collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (tree, summary) = DuplicateFinder::with_defaults().scan(&[dir.path().to_path_buf()]);

    assert!(tree.is_empty());
    assert_eq!(tree.groups().count(), 0);
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scenario_a_prefix_mismatch() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"0123456789");
    let b = write(dir.path(), "b", b"0123456789");
    write(dir.path(), "c", b"012X456789");

    let (tree, summary) = finder(4, WalkerConfig::default()).scan(&[dir.path().to_path_buf()]);

    assert_eq!(group_paths(&tree), vec![vec![a, b]]);
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 10);
}

#[test]
fn test_scenario_b_last_byte_differs() {
    let dir = tempdir().unwrap();
    let mut content = vec![7u8; 4096];
    write(dir.path(), "first.bin", &content);
    content[4095] = 8;
    write(dir.path(), "second.bin", &content);

    let (tree, summary) = finder(1024, WalkerConfig::default()).scan(&[dir.path().to_path_buf()]);

    assert_eq!(tree.groups().count(), 0);
    // both files read in full, four blocks each
    assert_eq!(summary.blocks_hashed, 8);
    assert_eq!(summary.bytes_read, 8192);
}

#[test]
fn test_scenario_c_empty_files_excluded_by_default() {
    let dir = tempdir().unwrap();
    write(dir.path(), "e1", b"");
    write(dir.path(), "e2", b"");
    write(dir.path(), "e3", b"");

    let (tree, summary) = DuplicateFinder::with_defaults().scan(&[dir.path().to_path_buf()]);

    assert_eq!(summary.total_files, 0);
    assert_eq!(tree.groups().count(), 0);
}

#[test]
fn test_scenario_c_empty_files_grouped_with_min_size_zero() {
    let dir = tempdir().unwrap();
    let e1 = write(dir.path(), "e1", b"");
    let e2 = write(dir.path(), "e2", b"");
    let e3 = write(dir.path(), "e3", b"");

    let (tree, _) =
        finder(1024, WalkerConfig::default().with_min_size(0)).scan(&[dir.path().to_path_buf()]);

    let groups: Vec<_> = tree.groups().collect();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 0);
    assert_eq!(groups[0].paths, &[e1, e2, e3][..]);
}

#[test]
fn test_unique_sizes_are_never_read() {
    let dir = tempdir().unwrap();
    write(dir.path(), "one", b"1");
    write(dir.path(), "two", b"22");
    write(dir.path(), "three", b"333");

    let (_, summary) = DuplicateFinder::with_defaults().scan(&[dir.path().to_path_buf()]);

    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.blocks_hashed, 0);
    assert_eq!(summary.bytes_read, 0);
}

#[test]
fn test_groups_ordered_by_size() {
    let dir = tempdir().unwrap();
    write(dir.path(), "big1", b"larger content");
    write(dir.path(), "big2", b"larger content");
    write(dir.path(), "small1", b"tiny");
    write(dir.path(), "small2", b"tiny");

    let (tree, _) = DuplicateFinder::with_defaults().scan(&[dir.path().to_path_buf()]);

    let sizes: Vec<u64> = tree.groups().map(|g| g.size).collect();
    assert_eq!(sizes, vec![4, 14]);
}

#[test]
fn test_sha256_finds_same_groups() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"same bytes here");
    write(dir.path(), "b", b"same bytes here");
    write(dir.path(), "c", b"diff bytes here");

    let md5 = DuplicateFinder::new(FinderConfig::default().with_block_size(block_size(4)));
    let sha = DuplicateFinder::new(
        FinderConfig::default()
            .with_block_size(block_size(4))
            .with_algorithm(HashAlgorithm::Sha256),
    );

    let roots = [dir.path().to_path_buf()];
    let (md5_tree, _) = md5.scan(&roots);
    let (sha_tree, _) = sha.scan(&roots);

    assert_eq!(sha_tree.algorithm(), HashAlgorithm::Sha256);
    assert_eq!(group_paths(&md5_tree), group_paths(&sha_tree));
}

#[test]
fn test_file_removed_before_comparison_is_isolated() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"abcdef");
    let b = write(dir.path(), "b", b"abcdef");
    let c = write(dir.path(), "c", b"abcdef");

    let mut tree = DedupTree::new(block_size(2), HashAlgorithm::Md5);
    tree.insert(a.clone(), 6).unwrap();
    tree.insert(b.clone(), 6).unwrap();

    fs::remove_file(&c).unwrap();
    let err = tree.insert(c.clone(), 6).unwrap_err();
    assert!(matches!(err, HashError::NotFound(_)));

    assert_eq!(group_paths(&tree), vec![vec![a, b]]);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_does_not_abort_scan() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"duplicate");
    let b = write(dir.path(), "b", b"duplicate");
    let locked = write(dir.path(), "c", b"duplicate");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // root ignores permission bits
    if fs::File::open(&locked).is_ok() {
        return;
    }

    let (tree, summary) = DuplicateFinder::with_defaults().scan(&[dir.path().to_path_buf()]);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(group_paths(&tree), vec![vec![a, b]]);
    assert_eq!(summary.hash_errors.len(), 1);
    assert!(matches!(
        summary.hash_errors[0],
        HashError::PermissionDenied(_)
    ));
}

#[test]
fn test_non_recursive_ignores_subdirectories() {
    let dir = tempdir().unwrap();
    write(dir.path(), "top", b"content");
    write(dir.path(), "sub/nested", b"content");

    let flat = finder(1024, WalkerConfig::default());
    let (tree, _) = flat.scan(&[dir.path().to_path_buf()]);
    assert_eq!(tree.groups().count(), 0);

    let deep = finder(1024, WalkerConfig::default().with_recursive(true));
    let (tree, _) = deep.scan(&[dir.path().to_path_buf()]);
    assert_eq!(tree.groups().count(), 1);
}

#[test]
fn test_many_copies_form_one_group() {
    let dir = tempdir().unwrap();
    let content = vec![42u8; 5000];
    for i in 0..12 {
        write(dir.path(), &format!("copy_{i:02}"), &content);
    }
    let mut odd = content.clone();
    odd[4321] = 0;
    write(dir.path(), "odd", &odd);

    let (tree, summary) = finder(512, WalkerConfig::default()).scan(&[dir.path().to_path_buf()]);

    let groups: Vec<_> = tree.groups().collect();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 12);
    assert!(groups[0]
        .paths
        .iter()
        .all(|p| p.file_name().unwrap() != "odd"));
    assert_eq!(summary.duplicate_files, 11);
}
