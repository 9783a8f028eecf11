//! Repository configuration.

/// Options controlling repository behavior.
///
/// The one knob at present is `best_effort_delete`, which decides what
/// happens when `delete_by_field` fails at the store. The legacy behavior of
/// this API was fire-and-forget: delete failures were swallowed and the
/// caller could not observe them, an inconsistency with every other write
/// operation. Rather than silently replicating or silently fixing that, the
/// choice is surfaced here.
///
/// # Examples
///
/// ```rust,ignore
/// use mongocrud::options::RepositoryOptions;
///
/// // Propagate delete failures like any other write (default)
/// let options = RepositoryOptions::default();
///
/// // Restore the legacy fire-and-forget behavior
/// let options = RepositoryOptions::new(true);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryOptions {
    best_effort_delete: bool,
}

impl RepositoryOptions {
    /// Creates a new `RepositoryOptions` with the specified behavior.
    ///
    /// # Arguments
    ///
    /// * `best_effort_delete` - If true, `delete_by_field` failures are
    ///   logged at warn level and reported as zero deletions instead of
    ///   propagating as errors
    pub fn new(best_effort_delete: bool) -> Self {
        Self { best_effort_delete }
    }

    /// Returns whether `delete_by_field` swallows store failures.
    pub fn is_best_effort_delete(&self) -> bool {
        self.best_effort_delete
    }
}

/// Creates `RepositoryOptions` with fire-and-forget deletes enabled.
pub fn best_effort_delete() -> RepositoryOptions {
    RepositoryOptions::new(true)
}
