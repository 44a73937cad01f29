//! Permission and ownership resolution.
//!
//! Several sources may want a say in the final mode of a replaced file. They
//! are evaluated as an ordered rule table; the first rule that produces a mode
//! wins:
//!
//! | # | rule       | applies when                                   | umask       |
//! |---|------------|------------------------------------------------|-------------|
//! | 1 | `static`   | a static mode was requested                    | never       |
//! | 2 | `existing` | existing mode requested and destination exists | never       |
//! | 3 | `requested`| a plain mode was requested                     | unless ignored |
//! | 4 | `default`  | always                                         | unless ignored |
//!
//! The kernel masks the mode passed to open(2) with the real process umask,
//! which may differ from the injected one. The resolved mode is therefore
//! always forced with fchmod after creation, so the injected umask alone
//! decides the final bits. Pathological umasks (e.g. stripping all owner
//! bits) are accepted.

use crate::config::{DEFAULT_MODE, Owner};
use crate::platform::MODE_MASK;

/// Permission-related parts of the caller's options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionRequest {
    pub static_mode: Option<u32>,
    pub mode: Option<u32>,
    pub use_existing: bool,
    pub apply_umask: bool,
}

impl Default for PermissionRequest {
    fn default() -> Self {
        Self {
            static_mode: None,
            mode: None,
            use_existing: false,
            apply_umask: true,
        }
    }
}

/// Which rule decided the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSource {
    Static,
    Existing,
    Requested,
    Default,
}

/// Outcome of mode resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModePlan {
    pub source: ModeSource,
    /// Mode handed to open(2); the kernel masks it with the process umask.
    pub creation_mode: u32,
    /// Mode to force with fchmod after creation (and again after chown).
    /// `None` leaves whatever open(2) produced.
    pub post_creation: Option<u32>,
    /// Mode the finished file is expected to carry.
    pub effective_mode: u32,
}

struct ModeInputs {
    request: PermissionRequest,
    umask: u32,
    existing_mode: Option<u32>,
}

/// (mode, applied verbatim)
type Rule = fn(&ModeInputs) -> Option<(u32, bool)>;

const RULES: [(ModeSource, Rule); 4] = [
    (ModeSource::Static, static_rule),
    (ModeSource::Existing, existing_rule),
    (ModeSource::Requested, requested_rule),
    (ModeSource::Default, default_rule),
];

fn static_rule(i: &ModeInputs) -> Option<(u32, bool)> {
    i.request.static_mode.map(|m| (m, true))
}

fn existing_rule(i: &ModeInputs) -> Option<(u32, bool)> {
    if !i.request.use_existing {
        return None;
    }
    i.existing_mode.map(|m| (m, true))
}

fn requested_rule(i: &ModeInputs) -> Option<(u32, bool)> {
    i.request.mode.map(|m| (m, !i.request.apply_umask))
}

fn default_rule(i: &ModeInputs) -> Option<(u32, bool)> {
    Some((DEFAULT_MODE, !i.request.apply_umask))
}

/// Resolve the mode of the replacement file.
///
/// `existing_mode` is the mode of the destination when it is an existing
/// regular file; it is only consulted when `request.use_existing` is set.
pub fn resolve_mode(request: &PermissionRequest, umask: u32, existing_mode: Option<u32>) -> ModePlan {
    let inputs = ModeInputs {
        request: *request,
        umask: umask & 0o777,
        existing_mode,
    };
    let (source, mode, verbatim) = RULES
        .iter()
        .find_map(|(source, rule)| rule(&inputs).map(|(m, v)| (*source, m & MODE_MASK, v)))
        .unwrap_or((ModeSource::Default, DEFAULT_MODE, false));

    if verbatim {
        ModePlan {
            source,
            creation_mode: mode,
            post_creation: Some(mode),
            effective_mode: mode,
        }
    } else {
        let masked = mode & !inputs.umask;
        ModePlan {
            source,
            creation_mode: masked,
            post_creation: Some(masked),
            effective_mode: masked,
        }
    }
}

/// Ownership change to apply, if any. Independent of the mode plan; the
/// caller applies it after the mode is settled and re-asserts the mode
/// afterwards, since chown may clear setuid/setgid bits.
pub fn resolve_owner(owner: Owner) -> Option<Owner> {
    if owner.is_unset() { None } else { Some(owner) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req() -> PermissionRequest {
        PermissionRequest::default()
    }

    #[test]
    fn default_is_0600_masked() {
        let plan = resolve_mode(&req(), 0o022, None);
        assert_eq!(plan.source, ModeSource::Default);
        assert_eq!(plan.effective_mode, 0o600);
        assert_eq!(plan.post_creation, Some(0o600));

        let plan = resolve_mode(&req(), 0o377, None);
        assert_eq!(plan.effective_mode, 0o400);
    }

    #[test]
    fn default_mode_fully_masked_is_accepted() {
        let plan = resolve_mode(&req(), 0o777, None);
        assert_eq!(plan.effective_mode, 0);
        assert_eq!(plan.post_creation, Some(0));
    }

    #[test]
    fn static_wins_over_everything() {
        let r = PermissionRequest {
            static_mode: Some(0o632),
            mode: Some(0o765),
            use_existing: true,
            apply_umask: false,
        };
        let plan = resolve_mode(&r, 0o077, Some(0o644));
        assert_eq!(plan.source, ModeSource::Static);
        assert_eq!(plan.effective_mode, 0o632);
        assert_eq!(plan.post_creation, Some(0o632));
    }

    #[test]
    fn existing_wins_over_requested_and_skips_umask() {
        let r = PermissionRequest {
            mode: Some(0o600),
            use_existing: true,
            ..req()
        };
        let plan = resolve_mode(&r, 0o077, Some(0o754));
        assert_eq!(plan.source, ModeSource::Existing);
        assert_eq!(plan.effective_mode, 0o754);
        assert_eq!(plan.post_creation, Some(0o754));
    }

    #[test]
    fn existing_requested_but_missing_falls_back() {
        let r = PermissionRequest {
            mode: Some(0o633),
            use_existing: true,
            ..req()
        };
        let plan = resolve_mode(&r, 0o012, None);
        assert_eq!(plan.source, ModeSource::Requested);
        assert_eq!(plan.effective_mode, 0o621);

        let r = PermissionRequest {
            use_existing: true,
            ..req()
        };
        let plan = resolve_mode(&r, 0o077, None);
        assert_eq!(plan.source, ModeSource::Default);
        assert_eq!(plan.effective_mode, 0o600);
    }

    #[test]
    fn existing_mode_ignored_unless_requested() {
        let plan = resolve_mode(&req(), 0o022, Some(0o755));
        assert_eq!(plan.source, ModeSource::Default);
    }

    #[test]
    fn requested_mode_masked_or_verbatim() {
        let r = PermissionRequest {
            mode: Some(0o777),
            ..req()
        };
        let plan = resolve_mode(&r, 0o012, None);
        assert_eq!(plan.effective_mode, 0o765);
        assert_eq!(plan.creation_mode, 0o765);
        assert_eq!(plan.post_creation, Some(0o765));

        let r = PermissionRequest {
            mode: Some(0o644),
            apply_umask: false,
            ..req()
        };
        let plan = resolve_mode(&r, 0o077, None);
        assert_eq!(plan.effective_mode, 0o644);
        assert_eq!(plan.post_creation, Some(0o644));
    }

    #[test]
    fn ignore_umask_applies_to_default_too() {
        let r = PermissionRequest {
            apply_umask: false,
            ..req()
        };
        let plan = resolve_mode(&r, 0o377, None);
        assert_eq!(plan.effective_mode, 0o600);
        assert_eq!(plan.post_creation, Some(0o600));
    }

    #[test]
    fn owner_unset_means_no_change() {
        assert_eq!(resolve_owner(Owner::default()), None);
        let o = Owner::new(None, Some(100));
        assert_eq!(resolve_owner(o), Some(o));
    }
}
