//! Interned identifiers for diagram nodes and edges, plus the per-store
//! node id generator.
//!
//! Ids are interned in one process-wide table so they are 4-byte `Copy`
//! handles with O(1) comparison. *Generation* is not global: every store
//! owns its own [`NodeIdGenerator`], so independent stores never interfere.

use chrono::Utc;
use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use uuid::Uuid;
use winnow::ascii::digit1;
use winnow::combinator::preceded;
use winnow::prelude::*;

/// Global string interner shared by node and edge ids.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string as an id, or return the existing handle.
            pub fn intern(s: &str) -> Self {
                $name(INTERNER.get_or_intern(s))
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok($name::intern(&s))
            }
        }
    };
}

interned_id! {
    /// Identifier of a diagram node (`node_<n>` when generated).
    NodeId
}

interned_id! {
    /// Identifier of a diagram edge.
    EdgeId
}

impl EdgeId {
    /// Generate a fresh edge id from the wall clock plus a random suffix:
    /// `edge_<unix-millis>_<9 hex chars>`.
    ///
    /// The id is interned on creation and the interner never frees, so
    /// every call grows the process-wide table by one string.
    ///
    /// Uniqueness against the live edge set is the caller's job; see
    /// `Graph::fresh_edge_id`.
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let random = Uuid::new_v4().simple().to_string();
        Self::intern(&format!("edge_{millis}_{}", &random[..9]))
    }
}

const NODE_PREFIX: &str = "node_";

/// Monotonic `node_<n>` generator owned by a single store.
#[derive(Debug, Clone, Default)]
pub struct NodeIdGenerator {
    last: u64,
}

impl NodeIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The numeric suffix of the most recently issued id (0 = none yet).
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Issue the next id. Past `u64::MAX` the counter wraps to 1, so callers
    /// holding a loaded node set should go through [`Self::next_free_id`].
    pub fn next_id(&mut self) -> NodeId {
        self.last = self.last.checked_add(1).unwrap_or(1);
        NodeId::intern(&format!("{NODE_PREFIX}{}", self.last))
    }

    /// Issue the next id for which `is_live` is false.
    pub fn next_free_id(&mut self, is_live: impl Fn(NodeId) -> bool) -> NodeId {
        loop {
            let id = self.next_id();
            if !is_live(id) {
                return id;
            }
        }
    }

    /// Start over from `node_1`. Only valid together with a full reset of
    /// the node set.
    pub fn reset(&mut self) {
        self.last = 0;
    }

    /// Fast-forward past a freshly loaded node set: the counter becomes the
    /// largest numeric suffix found among `ids` (0 if none match), so the
    /// next generated id cannot collide with a loaded one.
    pub fn resume_after<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.last = ids
            .into_iter()
            .filter_map(|id| numeric_suffix(id.as_str()))
            .max()
            .unwrap_or(0);
    }
}

/// Extract `n` from the first `node_<digits>` occurrence anywhere in `id`.
pub fn numeric_suffix(id: &str) -> Option<u64> {
    id.match_indices(NODE_PREFIX).find_map(|(start, _)| {
        let mut rest = &id[start..];
        parse_node_suffix.parse_next(&mut rest).ok()
    })
}

fn parse_node_suffix(input: &mut &str) -> ModalResult<u64> {
    preceded(NODE_PREFIX, digit1.parse_to()).parse_next(input)
}
