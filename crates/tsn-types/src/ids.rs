//! Instance-id newtypes.
//!
//! Instance ids are small unsigned integers assigned by the management
//! plane. The valid range of each kind depends on the platform and is only
//! known at runtime (see the orchestrator's capability snapshot), so the
//! newtypes carry no range validation of their own. "No id" is expressed
//! as `Option<Id>` rather than a sentinel value.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! instance_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates an id from its raw value.
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Returns the raw id value.
            pub const fn as_u32(&self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> u32 {
                id.0
            }
        }
    };
}

instance_id!(
    /// Flow meter instance id, numbered `[0; max_flow_meters[`.
    FlowMeterId
);

instance_id!(
    /// Stream gate instance id, numbered `[0; max_gates[`.
    GateId
);

instance_id!(
    /// Stream filter instance id, numbered `[0; max_filters[`.
    FilterId
);

instance_id!(
    /// Stream id, numbered `[1; stream_id_max]`. Owned by the external
    /// stream module; this subsystem only references streams by id.
    StreamId
);

instance_id!(
    /// Stream collection id, numbered `[1; stream_collection_id_max]`.
    StreamCollectionId
);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_roundtrip() {
        let id = GateId::new(7);
        assert_eq!(id.as_u32(), 7);
        assert_eq!(u32::from(id), 7);
        assert_eq!(GateId::from(7), id);
    }

    #[test]
    fn test_ordering() {
        assert!(FilterId::new(1) < FilterId::new(2));
        assert_eq!(StreamId::new(5), StreamId::new(5));
    }

    #[test]
    fn test_display() {
        assert_eq!(FlowMeterId::new(3).to_string(), "3");
        assert_eq!(StreamCollectionId::new(42).to_string(), "42");
    }
}
