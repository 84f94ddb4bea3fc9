//! Bring the output directory in line with a generation run.
//!
//! A run is planned first: every generated file is compared with what is on
//! disk, and files under the output directory that carry the generated
//! header but were not produced this time (a removed entity, a disabled
//! output kind) are marked for removal. The plan is then reported, checked,
//! or applied.

use std::collections::BTreeSet;
use std::fmt;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::emit::{GENERATED_BY, GeneratedFile};

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Report the plan without touching the disk.
    pub dry_run: bool,
    /// Fail if the plan is not empty.
    pub check: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Create,
    Update,
    Remove,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Remove => "remove",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChange {
    pub change: Change,
    pub path: PathBuf,
}

#[derive(Debug, Default)]
pub struct WriteSummary {
    pub changes: Vec<PlannedChange>,
    pub unchanged: usize,
    /// Whether `changes` were applied to disk.
    pub applied: bool,
}

impl WriteSummary {
    pub fn is_clean(&self) -> bool {
        self.changes.is_empty()
    }

    fn count(&self, change: Change) -> usize {
        self.changes.iter().filter(|c| c.change == change).count()
    }
}

/// Compare `files` with the contents of `out`.
pub fn plan(files: &[GeneratedFile], out: &Path) -> anyhow::Result<(Vec<PlannedChange>, usize)> {
    let mut changes = Vec::new();
    let mut unchanged = 0;

    for f in files {
        match std::fs::read_to_string(&f.path) {
            Ok(existing) if existing == f.content => unchanged += 1,
            Ok(_) => changes.push(PlannedChange {
                change: Change::Update,
                path: f.path.clone(),
            }),
            Err(_) => changes.push(PlannedChange {
                change: Change::Create,
                path: f.path.clone(),
            }),
        }
    }

    let produced: BTreeSet<&Path> = files.iter().map(|f| f.path.as_path()).collect();
    for path in generated_files_under(out)? {
        if !produced.contains(path.as_path()) {
            changes.push(PlannedChange {
                change: Change::Remove,
                path,
            });
        }
    }

    changes.sort_by(|a, b| a.path.cmp(&b.path));
    Ok((changes, unchanged))
}

/// Plan, then report (`dry_run`), verify (`check`) or apply the changes.
pub fn apply_generated_files(
    files: &[GeneratedFile],
    out: &Path,
    opts: WriteOptions,
) -> anyhow::Result<WriteSummary> {
    let (changes, unchanged) = plan(files, out)?;
    let mut summary = WriteSummary {
        changes,
        unchanged,
        applied: false,
    };

    if opts.dry_run {
        for c in &summary.changes {
            println!("{:<6} {}", c.change, display_rel(out, &c.path));
        }
        return Ok(summary);
    }

    if opts.check {
        if summary.is_clean() {
            return Ok(summary);
        }
        for c in &summary.changes {
            tracing::warn!(change = %c.change, path = %display_rel(out, &c.path), "out of date");
        }
        anyhow::bail!(
            "generated files are out of date: {} to create, {} to update, {} to remove",
            summary.count(Change::Create),
            summary.count(Change::Update),
            summary.count(Change::Remove),
        );
    }

    for c in &summary.changes {
        match c.change {
            Change::Create | Change::Update => {
                let file = files
                    .iter()
                    .find(|f| f.path == c.path)
                    .with_context(|| format!("no content planned for {}", c.path.display()))?;
                write_atomic(&file.path, &file.content)?;
            }
            Change::Remove => remove_generated(&c.path)?,
        }
        tracing::info!(change = %c.change, path = %display_rel(out, &c.path), "applied");
    }
    summary.applied = true;
    Ok(summary)
}

/// Files below `out` whose first line carries the generated header.
fn generated_files_under(out: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !out.is_dir() {
        return Ok(Vec::new());
    }
    let pattern = out.join("**").join("*");
    let pattern = pattern
        .to_str()
        .with_context(|| format!("invalid output path: {}", out.display()))?;

    let mut found = Vec::new();
    for entry in glob::glob(pattern).with_context(|| format!("invalid glob {pattern}"))? {
        let path = entry?;
        if path.is_file() && has_generated_header(&path) {
            found.push(path);
        }
    }
    Ok(found)
}

fn has_generated_header(path: &Path) -> bool {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|content| content.lines().next().map(|l| l.contains(GENERATED_BY)))
        .unwrap_or(false)
}

fn write_atomic(path: &Path, content: &str) -> anyhow::Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("{} has no parent directory", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create a temp file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.path().display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

/// Remove a stale file, and its directory once nothing else is left in it.
fn remove_generated(path: &Path) -> anyhow::Result<()> {
    std::fs::remove_file(path).with_context(|| format!("failed to remove {}", path.display()))?;
    if let Some(dir) = path.parent() {
        // fails while other files remain
        let _ = std::fs::remove_dir(dir);
    }
    Ok(())
}

fn display_rel(out: &Path, path: &Path) -> String {
    path.strip_prefix(out)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
