//! Naming conflict resolver
//!
//! Turns an ordered batch of rename requests into collision-free final names.
//! Allocation is greedy and first-come-first-served: the first request to ask
//! for a name gets it, later ones get a numbered ` (n)` suffix. Callers that
//! care about priority (e.g. longest original name wins the clean target)
//! sort the batch before submitting it; the resolver preserves the order it
//! is given.
//!
//! The same resolver serves every workflow that pushes entries into a shared
//! directory: folder renames, file-to-folder-name renames, category sorting,
//! flattening, and duplicate relocation.

use crate::core::error::{CleanupError, Result};
use crate::naming::namespace::{normalize, Namespace};
use std::path::{Path, PathBuf};

/// Upper bound on ` (n)` candidates probed per request. A namespace that
/// rejects this many candidates is corrupted input, not a solvable conflict.
const MAX_SUFFIX_ATTEMPTS: u32 = 10_000;

/// What kind of entry a request renames. Files take the numbered suffix
/// before their extension, folders take it at the end of the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    File,
}

/// One proposed rename within a batch.
///
/// `source` is the entry's current full path and serves as its identity: the
/// same entry may be looked at more than once per batch, and its current
/// name alone is not unique once earlier requests start claiming slots.
#[derive(Debug, Clone)]
pub struct RenameRequest {
    pub source: PathBuf,
    pub current_name: String,
    pub proposed_name: String,
    pub kind: EntryKind,
}

/// A conflict-free assignment for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRename {
    pub source: PathBuf,
    pub final_name: String,
    pub changed: bool,
}

/// Insert the numbered disambiguator into a name.
///
/// Folders: `Name (n)`. Files: `Stem (n).ext`, matching how users expect
/// copies to be numbered; extensionless files fall back to the folder form.
pub fn with_disambiguator(name: &str, n: u32, kind: EntryKind) -> String {
    if kind == EntryKind::File {
        let path = Path::new(name);
        if let (Some(stem), Some(ext)) = (path.file_stem(), path.extension()) {
            return format!("{} ({}).{}", stem.to_string_lossy(), n, ext.to_string_lossy());
        }
    }
    format!("{} ({})", name, n)
}

/// Probe the namespace for a free variant of `desired`.
///
/// `exempt` is the normalized form of the requesting entry's own current
/// name: its own slot never counts as a conflict, so a case-only rename can
/// swap into place.
fn find_free(
    namespace: &Namespace,
    desired: &str,
    kind: EntryKind,
    exempt: Option<&str>,
) -> Result<String> {
    let is_taken = |candidate: &str| {
        namespace.contains(candidate) && Some(normalize(candidate).as_str()) != exempt
    };

    if !is_taken(desired) {
        return Ok(desired.to_string());
    }

    for n in 1..=MAX_SUFFIX_ATTEMPTS {
        let candidate = with_disambiguator(desired, n, kind);
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
    }

    Err(CleanupError::DisambiguationOverflow {
        name: desired.to_string(),
        attempts: MAX_SUFFIX_ATTEMPTS,
    })
}

/// Resolve one in-place rename against the namespace, claiming the slot.
pub fn resolve(namespace: &mut Namespace, request: &RenameRequest) -> Result<ResolvedRename> {
    // Unchanged name: no slot movement at all.
    if request.proposed_name == request.current_name {
        return Ok(ResolvedRename {
            source: request.source.clone(),
            final_name: request.current_name.clone(),
            changed: false,
        });
    }

    let own_slot = normalize(&request.current_name);
    let final_name = find_free(
        namespace,
        &request.proposed_name,
        request.kind,
        Some(&own_slot),
    )?;

    let changed = final_name != request.current_name;
    if changed {
        namespace.release(&request.current_name);
        namespace.occupy(&final_name);
    }

    Ok(ResolvedRename {
        source: request.source.clone(),
        final_name,
        changed,
    })
}

/// Resolve an ordered batch of in-place renames.
///
/// The batch aborts only on [`CleanupError::DisambiguationOverflow`], which
/// signals a pathological namespace where every later item would spin the
/// same way. Ordinary conflicts never fail; they suffix.
pub fn resolve_batch(
    namespace: &mut Namespace,
    requests: &[RenameRequest],
) -> Result<Vec<ResolvedRename>> {
    requests.iter().map(|r| resolve(namespace, r)).collect()
}

/// Claim a free name for an entry moving *into* this namespace from
/// elsewhere.
///
/// Unlike [`resolve`], there is no own-slot exemption: an occupant with the
/// same name is a real conflict because it is a different entry. The chosen
/// name is occupied before returning, so successive claims in one batch see
/// each other.
pub fn claim_name(namespace: &mut Namespace, desired: &str, kind: EntryKind) -> Result<String> {
    let name = find_free(namespace, desired, kind, None)?;
    namespace.occupy(&name);
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: &str, current: &str, proposed: &str, kind: EntryKind) -> RenameRequest {
        RenameRequest {
            source: PathBuf::from(id),
            current_name: current.to_string(),
            proposed_name: proposed.to_string(),
            kind,
        }
    }

    #[test]
    fn test_unchanged_batch_is_idempotent() {
        let mut ns = Namespace::from_names(["Alpha", "Beta"]);
        let requests = vec![
            request("/x/Alpha", "Alpha", "Alpha", EntryKind::Folder),
            request("/x/Beta", "Beta", "Beta", EntryKind::Folder),
        ];

        let resolved = resolve_batch(&mut ns, &requests).unwrap();
        assert!(resolved.iter().all(|r| !r.changed));
        assert!(resolved
            .iter()
            .zip(&requests)
            .all(|(r, q)| r.final_name == q.current_name));
        // Namespace untouched
        assert_eq!(ns.len(), 2);
        assert!(ns.contains("Alpha"));
        assert!(ns.contains("Beta"));
    }

    #[test]
    fn test_self_rename_case_change_allowed() {
        let mut ns = Namespace::from_names(["Foo"]);
        let resolved = resolve(
            &mut ns,
            &request("/x/Foo", "Foo", "foo", EntryKind::Folder),
        )
        .unwrap();

        assert_eq!(resolved.final_name, "foo");
        assert!(resolved.changed);
        // Swapped into its own slot, not suffixed
        assert!(ns.contains("foo"));
        assert_eq!(ns.len(), 1);
    }

    #[test]
    fn test_first_come_first_served_disambiguation() {
        let mut ns = Namespace::from_names(["A", "B"]);
        let a = request("/x/A", "A", "Clip", EntryKind::Folder);
        let b = request("/x/B", "B", "Clip", EntryKind::Folder);

        let resolved = resolve_batch(&mut ns, &[a.clone(), b.clone()]).unwrap();
        assert_eq!(resolved[0].final_name, "Clip");
        assert_eq!(resolved[1].final_name, "Clip (1)");

        // Submission order decides who gets the clean name
        let mut ns = Namespace::from_names(["A", "B"]);
        let resolved = resolve_batch(&mut ns, &[b, a]).unwrap();
        assert_eq!(resolved[0].source, PathBuf::from("/x/B"));
        assert_eq!(resolved[0].final_name, "Clip");
        assert_eq!(resolved[1].final_name, "Clip (1)");
    }

    #[test]
    fn test_batch_is_collision_free_case_insensitively() {
        let mut ns = Namespace::from_names(["one", "two", "three"]);
        let requests = vec![
            request("/x/one", "one", "Trip", EntryKind::Folder),
            request("/x/two", "two", "trip", EntryKind::Folder),
            request("/x/three", "three", "TRIP", EntryKind::Folder),
        ];

        let resolved = resolve_batch(&mut ns, &requests).unwrap();
        let mut finals: Vec<String> = resolved
            .iter()
            .map(|r| normalize(&r.final_name))
            .collect();
        finals.sort();
        finals.dedup();
        assert_eq!(finals.len(), 3);
    }

    #[test]
    fn test_file_suffix_goes_before_extension() {
        let mut ns = Namespace::from_names(["Clip.mp4"]);
        let resolved = resolve(
            &mut ns,
            &request("/x/c2.mp4", "c2.mp4", "Clip.mp4", EntryKind::File),
        )
        .unwrap();
        assert_eq!(resolved.final_name, "Clip (1).mp4");
    }

    #[test]
    fn test_extensionless_file_suffix() {
        assert_eq!(with_disambiguator("README", 2, EntryKind::File), "README (2)");
        assert_eq!(with_disambiguator("a.tar", 1, EntryKind::File), "a (1).tar");
        assert_eq!(with_disambiguator("Box", 3, EntryKind::Folder), "Box (3)");
    }

    #[test]
    fn test_claim_name_has_no_self_exemption() {
        // An inbound move to a taken name must suffix even though the
        // desired name equals the mover's current name.
        let mut ns = Namespace::from_names(["photo.jpg"]);
        let name = claim_name(&mut ns, "photo.jpg", EntryKind::File).unwrap();
        assert_eq!(name, "photo (1).jpg");
        // The claim is visible to the next caller
        let name = claim_name(&mut ns, "photo.jpg", EntryKind::File).unwrap();
        assert_eq!(name, "photo (2).jpg");
    }

    #[test]
    fn test_disambiguation_overflow_is_an_error() {
        let mut ns = Namespace::from_names(["Clip"]);
        for n in 1..=MAX_SUFFIX_ATTEMPTS {
            ns.occupy(&format!("Clip ({})", n));
        }

        let err = resolve(
            &mut ns,
            &request("/x/other", "other", "Clip", EntryKind::Folder),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CleanupError::DisambiguationOverflow { attempts, .. } if attempts == MAX_SUFFIX_ATTEMPTS
        ));
    }

    #[test]
    fn test_swap_chain_releases_old_slots() {
        // "B" renames to "C" first, freeing "B" for the second request.
        let mut ns = Namespace::from_names(["B", "A"]);
        let requests = vec![
            request("/x/B", "B", "C", EntryKind::Folder),
            request("/x/A", "A", "B", EntryKind::Folder),
        ];

        let resolved = resolve_batch(&mut ns, &requests).unwrap();
        assert_eq!(resolved[0].final_name, "C");
        assert_eq!(resolved[1].final_name, "B");
        assert!(ns.contains("B"));
        assert!(ns.contains("C"));
        assert!(!ns.contains("A"));
    }
}
