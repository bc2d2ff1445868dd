use super::*;

fn touch(dir: &Path, name: &str) -> PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, b"x").unwrap();
    p
}

#[test]
fn lists_files_sorted_by_name() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "c.png");
    touch(dir.path(), "a.png");
    touch(dir.path(), "b.png");

    let names: Vec<_> = enumerate_sources(dir.path())
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
}

#[test]
fn skips_directories_and_dot_files() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "frame.png");
    touch(dir.path(), ".DS_Store");
    std::fs::create_dir(dir.path().join("nested")).unwrap();

    let paths = enumerate_sources(dir.path()).unwrap();
    assert_eq!(paths, vec![dir.path().join("frame.png")]);
}

#[test]
fn empty_directory_yields_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    assert!(enumerate_sources(dir.path()).unwrap().is_empty());
}

#[test]
fn missing_directory_is_enumeration_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = enumerate_sources(&missing).unwrap_err();
    assert!(matches!(err, ConvertError::Enumeration { .. }));
    assert!(err.to_string().contains("nope"));
}

#[test]
fn without_path_drops_existing_output() {
    let dir = tempfile::tempdir().unwrap();
    let a = touch(dir.path(), "a.png");
    let out = touch(dir.path(), "out.gif");

    let kept = without_path(vec![a.clone(), out.clone()], &out);
    assert_eq!(kept, vec![a.clone()]);

    let not_there = dir.path().join("missing.gif");
    assert_eq!(without_path(vec![a.clone()], &not_there), vec![a]);
}
