//! Content tree loader
//!
//! Reads the `shared/` tree and the profile trees of a snapshot into
//! [`ContentEntity`] values. Layout of a source root:
//!
//! ```text
//! shared/                              always considered, tag-filtered
//! profiles/<id>/                       overlay of profile <id>
//! profiles/<id>/subprofiles/<sub>/     overlay of <id>:<sub>
//! ```
//!
//! A directory holding `SKILL.md` is a bundle: one entity covering every
//! file below it.

use std::collections::BTreeMap;
use std::fs::{self, FileType};
use std::path::{Path, PathBuf};

use crate::domain::entities::{ContentEntity, SourceSnapshot, BUNDLE_MARKER};
use crate::domain::services::{LoadedSource, ResolvedProfile};
use crate::domain::value_objects::RelativePath;
use crate::error::{RuleforgeError, RuleforgeResult, Warning, WarningKind};
use crate::infrastructure::sources::ignore_file::IgnorePatterns;
use crate::parser::read_front_matter;

pub const SHARED_DIR: &str = "shared";
pub const PROFILES_DIR: &str = "profiles";
pub const SUBPROFILES_DIR: &str = "subprofiles";

/// Directory holding the content of a resolved profile
pub fn profile_dir(root: &Path, profile: &ResolvedProfile) -> PathBuf {
    let dir = root.join(PROFILES_DIR).join(&profile.profile);
    match &profile.sub {
        Some(sub) => dir.join(SUBPROFILES_DIR).join(sub),
        None => dir,
    }
}

/// Load the shared content and the given profiles of one snapshot.
///
/// Symbolic links are never followed; each one is skipped with a warning.
pub fn load_source<'a>(
    snapshot: &SourceSnapshot,
    profiles: impl IntoIterator<Item = &'a ResolvedProfile>,
) -> RuleforgeResult<(LoadedSource, Vec<Warning>)> {
    let root = snapshot.root();
    let fail = |e: &dyn std::fmt::Display| RuleforgeError::source(snapshot.name(), e);

    let ignore = IgnorePatterns::load(root).map_err(|e| fail(&e))?;
    let mut walker = TreeWalker {
        source_root: root,
        ignore: &ignore,
        links: Vec::new(),
    };

    let shared_root = root.join(SHARED_DIR);
    let shared = walker
        .load_tree(&shared_root, None)
        .map_err(|e| fail(&e))?;
    log::debug!("{}: {} shared entities", snapshot.name(), shared.len());

    let mut loaded = LoadedSource::new(snapshot.name(), &shared_root).with_shared(shared);

    for profile in profiles {
        let dir = profile_dir(root, profile);
        // The parent tree must not pick up its sub-profiles
        let skip = profile.sub.is_none().then_some(SUBPROFILES_DIR);
        let entities = walker.load_tree(&dir, skip).map_err(|e| fail(&e))?;
        log::debug!(
            "{}: profile {} contributes {} entities",
            snapshot.name(),
            profile,
            entities.len()
        );
        loaded = loaded.with_profile(profile.clone(), entities);
    }

    let warnings = walker
        .links
        .into_iter()
        .map(|link| {
            log::warn!("{}: skipping symbolic link {}", snapshot.name(), link.display());
            Warning::new(
                WarningKind::SkippedLink,
                link,
                "symbolic link in source, not followed",
            )
        })
        .collect();

    Ok((loaded, warnings))
}

#[derive(Debug, thiserror::Error)]
enum WalkError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported path {}: {message}", .path.display())]
    BadPath { path: PathBuf, message: String },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> WalkError + '_ {
    move |source| WalkError::Io {
        path: path.to_path_buf(),
        source,
    }
}

struct TreeWalker<'a> {
    source_root: &'a Path,
    ignore: &'a IgnorePatterns,
    /// Symbolic links met so far
    links: Vec<PathBuf>,
}

impl TreeWalker<'_> {
    /// Entities of the tree at `tree_root`, sorted by path. A missing tree is empty.
    fn load_tree(&mut self, tree_root: &Path, skip_top: Option<&str>) -> Result<Vec<ContentEntity>, WalkError> {
        match fs::symlink_metadata(tree_root) {
            Ok(meta) if meta.file_type().is_dir() => {}
            Ok(meta) if meta.file_type().is_symlink() => {
                self.links.push(tree_root.to_path_buf());
                return Ok(Vec::new());
            }
            _ => return Ok(Vec::new()),
        }
        let mut entities = Vec::new();
        self.walk(tree_root, tree_root, skip_top, &mut entities)?;
        entities.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(entities)
    }

    fn walk(
        &mut self,
        tree_root: &Path,
        dir: &Path,
        skip_top: Option<&str>,
        entities: &mut Vec<ContentEntity>,
    ) -> Result<(), WalkError> {
        if dir != tree_root && is_real_file(&dir.join(BUNDLE_MARKER)) {
            entities.push(self.load_bundle(tree_root, dir)?);
            return Ok(());
        }

        for (path, file_type) in self.children(dir)? {
            if dir == tree_root
                && skip_top.is_some_and(|skip| path.file_name().is_some_and(|n| n == skip))
            {
                continue;
            }

            if file_type.is_dir() {
                self.walk(tree_root, &path, None, entities)?;
            } else if file_type.is_file() {
                let rel = relative(tree_root, &path)?;
                let bytes = fs::read(&path).map_err(io_err(&path))?;
                let front_matter = read_front_matter(&path, &bytes);
                entities.push(ContentEntity::file(rel, bytes).with_front_matter(front_matter));
            }
        }
        Ok(())
    }

    fn load_bundle(&mut self, tree_root: &Path, bundle_dir: &Path) -> Result<ContentEntity, WalkError> {
        let mut files = BTreeMap::new();
        let mut pending = vec![bundle_dir.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for (path, file_type) in self.children(&dir)? {
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() {
                    let bytes = fs::read(&path).map_err(io_err(&path))?;
                    files.insert(relative(bundle_dir, &path)?, bytes);
                }
            }
        }

        let marker = bundle_dir.join(BUNDLE_MARKER);
        let marker_bytes = files
            .iter()
            .find(|(rel, _)| rel.as_str() == BUNDLE_MARKER)
            .map(|(_, bytes)| bytes.as_slice())
            .unwrap_or_default();
        let front_matter = read_front_matter(&marker, marker_bytes);

        Ok(ContentEntity::directory(relative(tree_root, bundle_dir)?, files)
            .with_front_matter(front_matter))
    }

    /// Directory entries minus `.git`, ignored paths and symbolic links, in name order
    fn children(&mut self, dir: &Path) -> Result<Vec<(PathBuf, FileType)>, WalkError> {
        let mut children = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err(dir))? {
            let entry = entry.map_err(io_err(dir))?;
            let path = entry.path();
            if path.file_name().is_some_and(|n| n == ".git") {
                continue;
            }
            // DirEntry::file_type does not traverse links
            let file_type = entry.file_type().map_err(io_err(&path))?;
            let rel_to_source = path.strip_prefix(self.source_root).unwrap_or(&path);
            if self.ignore.is_ignored(rel_to_source, file_type.is_dir()) {
                log::trace!("ignored {}", path.display());
                continue;
            }
            if file_type.is_symlink() {
                self.links.push(path);
                continue;
            }
            children.push((path, file_type));
        }
        children.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(children)
    }
}

fn is_real_file(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_file())
}

fn relative(base: &Path, path: &Path) -> Result<RelativePath, WalkError> {
    let stripped = path.strip_prefix(base).unwrap_or(path);
    RelativePath::from_path(stripped).map_err(|e| WalkError::BadPath {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
