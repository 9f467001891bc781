use uuid::Uuid;

/// Per-chain correlation identifier.
///
/// Assigned once, at the deepest classified wrap of a chain, and copied
/// verbatim into every node built by re-wrapping that chain. Two chains
/// started independently never share an id.
///
/// This is a process-local label for grepping logs. It is not propagated
/// over the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Sentinel for "no chain". Never produced by a wrap.
    pub const NIL: CorrelationId = CorrelationId(Uuid::nil());

    /// Generate a fresh random (v4) id.
    #[inline]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[inline]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// True for [`CorrelationId::NIL`].
    #[inline]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CorrelationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl core::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl core::fmt::Debug for CorrelationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CorrelationId({})", self.0.hyphenated())
    }
}
