use crate::domain_model::{CredentialKind, MemberId};
use crate::domain_port::{IdentityError, IdentityResolver};
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// Lookup table of known accounts; everything else resolves to id 0 unless
/// the resolver was built with [`FakeIdentityResolver::accepting_any`].
#[derive(Debug, Default)]
pub struct FakeIdentityResolver {
    members: DashMap<(CredentialKind, String), MemberId>,
    // 0 means unknown accounts stay unknown
    next_id: AtomicI64,
}

impl FakeIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every new account is enrolled on first lookup, starting at id 1.
    pub fn accepting_any() -> Self {
        Self {
            members: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn with_member(self, kind: CredentialKind, account: &str, member_id: MemberId) -> Self {
        self.members.insert((kind, account.to_owned()), member_id);
        self
    }
}

#[async_trait::async_trait]
impl IdentityResolver for FakeIdentityResolver {
    async fn resolve_member_id(
        &self,
        kind: CredentialKind,
        account: &str,
    ) -> Result<MemberId, IdentityError> {
        let key = (kind, account.to_owned());
        if let Some(member_id) = self.members.get(&key) {
            return Ok(*member_id);
        }
        if self.next_id.load(Ordering::Relaxed) == 0 {
            return Ok(MemberId(0));
        }
        let member_id = *self
            .members
            .entry(key)
            .or_insert_with(|| MemberId(self.next_id.fetch_add(1, Ordering::Relaxed)));
        Ok(member_id)
    }
}
