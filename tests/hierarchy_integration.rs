//! Integration tests for repository discovery, hierarchy mapping and linking.
//!
//! Repositories are simulated with bare `.git` directories.

use std::fs;
use std::path::Path;

use context_bank::config::BankConfig;
use context_bank::hierarchy::link_child_stores;
use context_bank::{HierarchyLink, HierarchyMap, RepositoryLocator, SetupApproach, StoreShape};
use tempfile::TempDir;

fn create_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn create_repo(root: &Path, relative: &str) {
    fs::create_dir_all(root.join(relative).join(".git")).unwrap();
}

/// Root repo with a single-project store, two services, one of them with a
/// multi-project store, and a vendored checkout that is ignored.
fn workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    create_repo(root, ".");
    fs::create_dir_all(root.join(".memory-bank/context")).unwrap();

    create_repo(root, "svc-a");
    fs::create_dir_all(root.join("svc-a/.memory-bank/shared")).unwrap();
    fs::create_dir_all(root.join("svc-a/.memory-bank/api")).unwrap();

    create_repo(root, "svc-b");
    create_repo(root, "svc-a/vendor");

    create_file(root, "memory-bank-ignore", "# third-party code\nvendor/\n");
    temp_dir
}

// ============================================================================
// Locator
// ============================================================================

#[test]
fn test_locate_respects_ignore_file() {
    let temp_dir = workspace();
    let config = BankConfig::default();
    let locator = RepositoryLocator::from_config(temp_dir.path(), &config.locator).unwrap();

    let roots = locator.locate(temp_dir.path()).unwrap();
    let paths: Vec<String> = roots.iter().map(|r| r.display_path()).collect();
    assert_eq!(paths, vec![".", "svc-a", "svc-b"]);
}

#[test]
fn test_locate_depth_limit_from_config() {
    let temp_dir = workspace();
    create_repo(temp_dir.path(), "a/b/c/d");

    let mut config = BankConfig::default();
    let locator = RepositoryLocator::from_config(temp_dir.path(), &config.locator).unwrap();
    assert!(!locator
        .locate(temp_dir.path())
        .unwrap()
        .iter()
        .any(|r| r.display_path() == "a/b/c/d"));

    config.locator.max_depth = 4;
    let locator = RepositoryLocator::from_config(temp_dir.path(), &config.locator).unwrap();
    assert!(locator
        .locate(temp_dir.path())
        .unwrap()
        .iter()
        .any(|r| r.display_path() == "a/b/c/d"));
}

// ============================================================================
// Hierarchy map
// ============================================================================

#[test]
fn test_detect_hierarchy() {
    let temp_dir = workspace();
    let map = HierarchyMap::detect(temp_dir.path(), &BankConfig::default()).unwrap();

    assert_eq!(map.repos.len(), 3);
    let root = map.root_like().unwrap();
    assert_eq!(root.path, ".");
    assert_eq!(root.children, vec!["svc-a".to_string(), "svc-b".to_string()]);
    assert_eq!(root.memory_bank_type, Some(StoreShape::SingleProject));

    let svc_a = map.get("svc-a").unwrap();
    assert_eq!(svc_a.memory_bank_type, Some(StoreShape::MultiProject));
    assert_eq!(svc_a.depth, 1);
    assert_eq!(map.parent_of("svc-a").map(|r| r.path.as_str()), Some("."));

    let svc_b = map.get("svc-b").unwrap();
    assert!(!svc_b.has_memory_bank);
    assert!(svc_b.memory_bank_type.is_none());
}

#[test]
fn test_suggest_setup_for_workspace() {
    let temp_dir = workspace();
    let map = HierarchyMap::detect(temp_dir.path(), &BankConfig::default()).unwrap();

    let suggestion = map.suggest_setup();
    assert_eq!(suggestion.approach, SetupApproach::DistributedHierarchical);
    assert_eq!(
        suggestion.actions,
        vec![
            "Set up a context store in svc-b".to_string(),
            "Consider adding hierarchy links between context stores".to_string(),
        ]
    );
}

#[test]
fn test_save_into_root_store() {
    let temp_dir = workspace();
    let config = BankConfig::default();
    let map = HierarchyMap::detect(temp_dir.path(), &config).unwrap();

    let path = map.save(None, &config.store.dir_names).unwrap();
    assert!(path.ends_with(".memory-bank/hierarchy.json"));

    let loaded: HierarchyMap = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(loaded, map);
}

// ============================================================================
// Links
// ============================================================================

#[test]
fn test_link_child_stores_once() {
    let temp_dir = workspace();
    let config = BankConfig::default();
    let map = HierarchyMap::detect(temp_dir.path(), &config).unwrap();

    let written = link_child_stores(&map, &config.store.dir_names).unwrap();
    assert_eq!(written.len(), 1);
    assert!(written[0].ends_with("svc-a/.memory-bank/hierarchy.json"));

    let link: HierarchyLink = serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
    assert_eq!(link.version, "2.1");
    assert_eq!(link.parent.path, "..");
    assert_eq!(link.parent.memory_bank_path, "../.memory-bank");
    assert_eq!(link.current_project.kind, StoreShape::MultiProject);

    // Second run leaves the existing link alone
    let again = link_child_stores(&map, &config.store.dir_names).unwrap();
    assert!(again.is_empty());
}
