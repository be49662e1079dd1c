//! Stable row addresses.
//!
//! A row is addressed either by its request (a single-item request's leaf, or
//! a multi-item request's parent row) or by one item of a multi-item request.
//! The string form `requestId ["." position]` with a 1-based position is only
//! produced at the display boundary:
//!
//! ```
//! use access_requests::row_id::RowId;
//! use access_requests::types::RequestId;
//!
//! let row = RowId::item(RequestId::new("req-10001"), 1);
//! assert_eq!(row.to_string(), "req-10001.2");
//! assert_eq!(RowId::parse("req-10001.2"), Some(row));
//! ```

use crate::types::RequestId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::IntErrorKind;

/// Separator between the request id and the 1-based item position
pub const ITEM_SEPARATOR: char = '.';

/// Address of a display row
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowId {
    /// The request itself; targets item 0 when used for an item update
    Request(RequestId),
    /// One item of a request, by 0-based index
    Item {
        /// Owning request
        request_id: RequestId,
        /// 0-based item index
        index: usize,
    },
}

impl RowId {
    /// Row of a whole request
    #[must_use]
    pub const fn request(request_id: RequestId) -> Self {
        Self::Request(request_id)
    }

    /// Row of the item at 0-based `index`
    #[must_use]
    pub const fn item(request_id: RequestId, index: usize) -> Self {
        Self::Item { request_id, index }
    }

    /// Parse the string form
    ///
    /// Splits on the first `.`. A suffix that is not a positive base-10
    /// integer falls back to index 0; a suffix too large to represent maps to
    /// an index no request can have. Returns `None` only when there is no
    /// request id to the left of the separator.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (left, right) = match raw.split_once(ITEM_SEPARATOR) {
            Some((left, right)) => (left, Some(right)),
            None => (raw, None),
        };
        if left.is_empty() {
            return None;
        }
        let request_id = RequestId::new(left);

        Some(match right {
            None => Self::Request(request_id),
            Some(position) => Self::Item {
                request_id,
                index: position_to_index(position),
            },
        })
    }

    /// Owning request
    #[must_use]
    pub const fn request_id(&self) -> &RequestId {
        match self {
            Self::Request(request_id) | Self::Item { request_id, .. } => request_id,
        }
    }

    /// 0-based item index this row targets
    #[must_use]
    pub const fn item_index(&self) -> usize {
        match self {
            Self::Request(_) => 0,
            Self::Item { index, .. } => *index,
        }
    }
}

fn position_to_index(position: &str) -> usize {
    match position.parse::<usize>() {
        Ok(n) if n > 0 => n - 1,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => usize::MAX,
        _ => 0,
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(request_id) => write!(f, "{request_id}"),
            Self::Item { request_id, index } => {
                write!(f, "{request_id}{ITEM_SEPARATOR}{}", index.saturating_add(1))
            },
        }
    }
}

impl From<RequestId> for RowId {
    fn from(request_id: RequestId) -> Self {
        Self::Request(request_id)
    }
}

impl Serialize for RowId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RowId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid row id: {raw:?}")))
    }
}
