use anyhow::{Context, Result, bail};
use git2::{ObjectType, Oid, Repository};

/// The portion of history (and optionally the working index) a run examines.
///
/// `end` is always set. An absent `start` means "from the repository root to
/// `end`". `use_index` adds the working index as an extra virtual endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRange {
    pub start: Option<Oid>,
    pub end: Oid,
    pub use_index: bool,
}

/// Resolve the optional CLI range argument into a concrete `ScanRange`.
///
/// No argument scans everything reachable from the current ref plus the
/// index. `a..b` scans the commits in `b` not reachable from `a`. A single
/// revision scans everything reachable from it. Any revision that fails to
/// resolve is an error, never silently skipped.
pub fn resolve_scan_range(repo: &Repository, arg: Option<&str>) -> Result<ScanRange> {
    match arg {
        None => Ok(ScanRange {
            start: None,
            end: resolve_current_ref(repo)?,
            use_index: true,
        }),
        Some(arg) => {
            let (start, end) = match arg.split_once("..") {
                Some((left, right)) => {
                    let refs = resolve_refs(repo, &[left, right])?;
                    match refs[..] {
                        [start, end] => (Some(start), end),
                        [end] => (None, end),
                        _ => bail!("Unable to resolve revision range {:?}", arg),
                    }
                }
                None => (None, resolve_rev(repo, arg)?),
            };
            Ok(ScanRange {
                start,
                end,
                use_index: false,
            })
        }
    }
}

/// Commit the current HEAD ref points at.
pub fn resolve_current_ref(repo: &Repository) -> Result<Oid> {
    let head = repo.head().context("Failed to resolve current ref")?;
    let commit = head
        .peel_to_commit()
        .context("Current ref does not point at a commit")?;
    Ok(commit.id())
}

/// Resolve each non-empty revision expression to a commit oid.
fn resolve_refs(repo: &Repository, exprs: &[&str]) -> Result<Vec<Oid>> {
    exprs
        .iter()
        .copied()
        .filter(|expr| !expr.is_empty())
        .map(|expr| resolve_rev(repo, expr))
        .collect()
}

fn resolve_rev(repo: &Repository, expr: &str) -> Result<Oid> {
    let object = repo
        .revparse_single(expr)
        .with_context(|| format!("Failed to resolve revision {:?}", expr))?;
    let commit = object
        .peel(ObjectType::Commit)
        .with_context(|| format!("Revision {:?} does not point at a commit", expr))?;
    Ok(commit.id())
}
