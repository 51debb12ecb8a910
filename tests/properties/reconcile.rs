//! Property tests for planning and deployment against a real directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::Utc;
use proptest::prelude::*;
use tempfile::tempdir;

use ruleforge::application::{Deployer, Deployment};
use ruleforge::domain::entities::{Lockfile, OutputTree};
use ruleforge::domain::value_objects::RelativePath;
use ruleforge::infrastructure::LocalFs;

const PATHS: &[&str] = &[
    "CLAUDE.md",
    ".claude/rules/a.md",
    ".claude/rules/b.md",
    ".cursor/rules/c.mdc",
    "docs/d.md",
];

fn files() -> impl Strategy<Value = BTreeMap<usize, String>> {
    proptest::collection::btree_map(0..PATHS.len(), "[a-z]{1,6}", 0..=PATHS.len())
}

fn tree(files: &BTreeMap<usize, String>) -> OutputTree {
    files
        .iter()
        .map(|(idx, content)| {
            (
                RelativePath::new(PATHS[*idx]).unwrap(),
                content.clone().into_bytes(),
            )
        })
        .collect()
}

fn write_natives(root: &Path, natives: &BTreeMap<usize, String>) {
    for (idx, content) in natives {
        let path = root.join(PATHS[*idx]);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

fn deploy(root: &Path, previous: &Lockfile, output: &OutputTree) -> Deployment {
    let fs = LocalFs::new();
    let deployer = Deployer::new(&fs, root);
    let plan = deployer.plan(previous, output);
    deployer.execute(&plan, previous, Utc::now())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: a native file whose content differs from the output is
    /// never overwritten and never tracked.
    #[test]
    fn property_native_files_survive_sync(output in files(), natives in files()) {
        let dir = tempdir().unwrap();
        write_natives(dir.path(), &natives);

        let deployment = deploy(dir.path(), &Lockfile::new(Utc::now()), &tree(&output));

        for (idx, native) in &natives {
            let on_disk = fs::read_to_string(dir.path().join(PATHS[*idx])).unwrap();
            let rel = RelativePath::new(PATHS[*idx]).unwrap();
            match output.get(idx) {
                Some(desired) if desired != native => {
                    prop_assert_eq!(&on_disk, native);
                    prop_assert!(!deployment.lockfile.contains(&rel));
                }
                Some(_) => prop_assert!(deployment.lockfile.contains(&rel)),
                None => {
                    prop_assert_eq!(&on_disk, native);
                    prop_assert!(!deployment.lockfile.contains(&rel));
                }
            }
        }
    }

    /// PROPERTY: syncing the same output twice leaves nothing to do.
    #[test]
    fn property_sync_is_idempotent(output in files(), natives in files()) {
        let dir = tempdir().unwrap();
        write_natives(dir.path(), &natives);
        let output = tree(&output);

        let first = deploy(dir.path(), &Lockfile::new(Utc::now()), &output);

        let fs = LocalFs::new();
        let deployer = Deployer::new(&fs, dir.path());
        let plan = deployer.plan(&first.lockfile, &output);
        prop_assert!(plan.to_write().is_empty());
        prop_assert!(plan.to_delete().is_empty());
    }

    /// PROPERTY: reconciling against an empty output removes every file the
    /// tool wrote and leaves native files alone.
    #[test]
    fn property_detach_removes_everything_owned(output in files(), natives in files()) {
        let dir = tempdir().unwrap();
        write_natives(dir.path(), &natives);

        let synced = deploy(dir.path(), &Lockfile::new(Utc::now()), &tree(&output));
        let detached = deploy(dir.path(), &synced.lockfile, &OutputTree::new());

        prop_assert!(detached.lockfile.is_empty());
        // Adopted files are owned too, so they go with the rest
        for path in synced.lockfile.paths() {
            prop_assert!(!path.to_path(dir.path()).exists());
        }
        for (idx, native) in &natives {
            let rel = RelativePath::new(PATHS[*idx]).unwrap();
            if !synced.lockfile.contains(&rel) {
                let on_disk = fs::read_to_string(dir.path().join(PATHS[*idx])).unwrap();
                prop_assert_eq!(&on_disk, native);
            }
        }
    }
}
