use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use super::DetailKind;

/// Optimization hint attached to fetch operations.
///
/// The request machinery forwards a hint verbatim; only engines interpret it,
/// and an engine is free to ignore it entirely. An empty restriction set means
/// "fetch everything".
///
/// Items fetched under a restrictive hint must not be saved back: details the
/// hint excluded are absent from the fetched copy, and saving it would
/// silently erase them. Nothing enforces this; it is a caller obligation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchHint {
    detail_kinds: BTreeSet<DetailKind>,
}

impl FetchHint {
    /// A hint that restricts nothing.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Restricts fetching to the given detail categories. Duplicates collapse.
    pub fn with_detail_kinds(kinds: impl IntoIterator<Item = DetailKind>) -> Self {
        Self {
            detail_kinds: kinds.into_iter().collect(),
        }
    }

    /// The restriction set; empty means unrestricted.
    pub fn detail_kinds(&self) -> &BTreeSet<DetailKind> {
        &self.detail_kinds
    }

    pub fn is_unrestricted(&self) -> bool {
        self.detail_kinds.is_empty()
    }
}
