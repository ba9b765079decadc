//! Helpers shared by the per-record services.

use pocket_domain::Identifiable;
use uuid::Uuid;

use crate::CoreError;

/// Chooses whether list views include completed records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFilter {
    All,
    #[default]
    Incomplete,
}

impl ListFilter {
    pub fn from_show_all(show_all: bool) -> Self {
        if show_all {
            ListFilter::All
        } else {
            ListFilter::Incomplete
        }
    }

    pub fn admits(&self, completed: bool) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::Incomplete => !completed,
        }
    }
}

/// Resolves a full id or a unique id prefix against a set of records.
pub fn resolve_id<'a, T, I>(records: I, kind: &'static str, needle: &str) -> Result<Uuid, CoreError>
where
    T: Identifiable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let needle = needle.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Err(CoreError::not_found(kind, "<empty>"));
    }
    let matches: Vec<Uuid> = records
        .into_iter()
        .map(Identifiable::id)
        .filter(|id| id.to_string().starts_with(&needle))
        .collect();
    match matches.as_slice() {
        [only] => Ok(*only),
        [] => Err(CoreError::not_found(kind, needle)),
        many => Err(CoreError::AmbiguousId {
            kind,
            prefix: needle,
            matches: many.len(),
        }),
    }
}

/// Makes `ids` the complete set of flagged records.
///
/// Every id is checked before anything changes, so an unknown id leaves the
/// records untouched. The flag is then cleared on all records and set on the
/// given ones.
pub(crate) fn replace_flagged<T, F>(
    records: &mut [T],
    kind: &'static str,
    ids: &[Uuid],
    mut set_flag: F,
) -> Result<usize, CoreError>
where
    T: Identifiable,
    F: FnMut(&mut T, bool),
{
    if let Some(missing) = ids
        .iter()
        .find(|id| !records.iter().any(|record| record.id() == **id))
    {
        return Err(CoreError::not_found(kind, missing));
    }
    for record in records.iter_mut() {
        set_flag(record, false);
    }
    let mut flagged = 0;
    for record in records.iter_mut() {
        if ids.contains(&record.id()) {
            set_flag(record, true);
            flagged += 1;
        }
    }
    Ok(flagged)
}
