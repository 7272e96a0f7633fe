//! Store integrity verification
//!
//! `FsckCommand` answers "is the object store, and the pointer metadata
//! referencing it, self-consistent?". It resolves the requested scan range,
//! runs up to two independent verification passes over it (object contents
//! and pointer canonicality), aggregates the findings, and relocates corrupt
//! objects into quarantine unless running dry.

mod objects;
mod pointers;
mod quarantine;

use anyhow::{Context, Result};
use git2::Repository;
use indicatif::{ProgressBar, ProgressStyle};
use rustc_hash::FxHashSet;
use std::path::PathBuf;

use crate::model::Finding;
use crate::repository::{ByBlobFeed, ByTreeFeed, ObjectStore, PathFilter, resolve_scan_range};

/// Aggregated findings of one verification run.
///
/// The corrupt-oid set is ordered and deduplicated: the store is addressed
/// by content hash, so the same object reported through several pointers
/// collapses to one repair candidate.
#[derive(Debug, Default)]
pub struct VerificationRun {
    findings: Vec<Finding>,
    corrupt_oids: Vec<String>,
    seen_corrupt: FxHashSet<String>,
}

impl VerificationRun {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, finding: Finding) {
        if let Some(oid) = finding.corrupt_oid() {
            if self.seen_corrupt.insert(oid.to_string()) {
                self.corrupt_oids.push(oid.to_string());
            }
        }
        self.findings.push(finding);
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn corrupt_oids(&self) -> &[String] {
        &self.corrupt_oids
    }
}

/// What a finished run did, for callers that need more than the exit code.
#[derive(Debug)]
pub struct FsckSummary {
    pub findings: Vec<Finding>,
    pub corrupt_oids: Vec<String>,
    /// Quarantine directory, when relocation actually ran.
    pub quarantined: Option<PathBuf>,
}

impl FsckSummary {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// 0 for a clean store, 1 when any finding was recorded.
    pub fn exit_code(&self) -> i32 {
        if self.is_clean() { 0 } else { 1 }
    }
}

/// Integrity checker for a repository's object store.
pub struct FsckCommand {
    repo_path: PathBuf,
    dry_run: bool,
    check_objects: bool,
    check_pointers: bool,
    verbose: bool,
}

impl FsckCommand {
    pub fn new(repo_path: &str) -> Self {
        Self {
            repo_path: PathBuf::from(repo_path),
            dry_run: false,
            check_objects: false,
            check_pointers: false,
            verbose: true,
        }
    }

    /// Create a quiet checker (no progress or phase output, used by tests)
    pub fn quiet(repo_path: &str) -> Self {
        Self {
            verbose: false,
            ..Self::new(repo_path)
        }
    }

    /// Report corruption without relocating anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Select the passes to run. Selecting neither runs both.
    pub fn passes(mut self, objects: bool, pointers: bool) -> Self {
        self.check_objects = objects;
        self.check_pointers = pointers;
        self
    }

    /// Run the check over the given revision argument (`None` = current ref
    /// plus working index).
    pub fn run(&self, range_arg: Option<&str>) -> Result<FsckSummary> {
        let repo = Repository::discover(&self.repo_path)
            .context("Failed to open git repository")?;
        let range = resolve_scan_range(&repo, range_arg)?;
        let store = ObjectStore::for_repo(&repo);

        let (check_objects, check_pointers) = if !self.check_objects && !self.check_pointers {
            (true, true)
        } else {
            (self.check_objects, self.check_pointers)
        };

        let mut run = VerificationRun::new();

        if check_objects {
            self.log("Checking object contents...");
            let config = repo.config().context("Failed to read repository config")?;
            let filter = PathFilter::from_config(&config);
            let feed = ByBlobFeed::new(&repo, &filter, &range)?;
            let progress = self.progress_bar();
            objects::verify_objects(feed, &store, &mut run, &progress)?;
            progress.finish_and_clear();
        }

        if check_pointers {
            self.log("Checking pointer canonicality...");
            let feed = ByTreeFeed::new(&repo, &range)?;
            pointers::verify_pointers(feed, &mut run)?;
        }

        if run.is_clean() {
            println!("lode fsck OK");
        }

        let quarantined = if !run.is_clean() && !self.dry_run && !run.corrupt_oids().is_empty() {
            Some(quarantine::relocate_corrupt(&store, run.corrupt_oids())?)
        } else {
            None
        };

        Ok(FsckSummary {
            findings: run.findings,
            corrupt_oids: run.corrupt_oids,
            quarantined,
        })
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.verbose {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} Checking objects: {pos} ({per_sec})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb
    }

    fn log(&self, msg: &str) {
        if self.verbose {
            eprintln!("{}", msg);
        }
    }
}
