// Expansion of files and directories into a video selection

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use vidbatch::engine::{expand_selection, scan};

fn touch(dir: &TempDir, rel: &str) -> PathBuf {
    let path = dir.path().join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, b"").unwrap();
    path
}

#[test]
fn test_scan_is_recursive_and_sorted() {
    let dir = TempDir::new().unwrap();
    let b = touch(&dir, "b.mkv");
    let a = touch(&dir, "a.MP4");
    let nested = touch(&dir, "season/ep1.webm");
    touch(&dir, "notes.txt");
    touch(&dir, "season/cover.jpg");

    assert_eq!(scan(dir.path()), vec![a, b, nested]);
}

#[test]
fn test_selection_keeps_given_order() {
    let dir = TempDir::new().unwrap();
    let clip = touch(&dir, "single/clip.mov");
    let first = touch(&dir, "folder/x.avi");
    let second = touch(&dir, "folder/y.flv");
    let ignored = touch(&dir, "readme.md");

    let selection = expand_selection(&[clip.clone(), ignored, dir.path().join("folder")]);
    assert_eq!(selection, vec![clip, first, second]);
}

#[test]
fn test_missing_paths_are_skipped() {
    let dir = TempDir::new().unwrap();
    assert!(expand_selection(&[dir.path().join("nope")]).is_empty());
}
