use core::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a world object (unit, player, game object).
///
/// Events carry this instead of a live reference so that a despawned
/// object can never be dereferenced from a stale proposal.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ObjectGuid(pub u64);

impl ObjectGuid {
    pub const EMPTY: Self = Self(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Little-endian wire form used inside event blobs.
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    /// Decodes a blob written by [`ObjectGuid::to_bytes`]; anything that is
    /// not exactly eight bytes yields `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; 8] = bytes.try_into().ok()?;
        Some(Self(u64::from_le_bytes(raw)))
    }
}

impl fmt::Display for ObjectGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_decoding_rejects_wrong_length() {
        let guid = ObjectGuid::new(0xdead_beef);
        assert_eq!(ObjectGuid::from_bytes(&guid.to_bytes()), Some(guid));
        assert_eq!(ObjectGuid::from_bytes(&[1, 2, 3]), None);
        assert!(ObjectGuid::EMPTY.is_empty());
    }
}
