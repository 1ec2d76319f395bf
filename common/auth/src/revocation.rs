use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Shared revocation state, injectable wherever tokens are validated.
///
/// Tracks two kinds of entries: individual token fingerprints (logout) and
/// subject-wide cutoffs (user deletion, which must invalidate every token the
/// user still holds). Entries carry the instant validation stops accepting
/// the revoked token, so the registry never outgrows the set of tokens that
/// could still authenticate; dead entries are purged opportunistically on
/// writes and via [`purge_expired`].
///
/// [`purge_expired`]: RevocationRegistry::purge_expired
#[derive(Clone, Default)]
pub struct RevocationRegistry {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    tokens: HashMap<String, DateTime<Utc>>,
    subjects: HashMap<Uuid, SubjectCutoff>,
}

struct SubjectCutoff {
    cutoff: DateTime<Utc>,
    retain_until: DateTime<Utc>,
}

impl Inner {
    fn purge(&mut self, now: DateTime<Utc>) {
        self.tokens.retain(|_, expires_at| *expires_at > now);
        self.subjects.retain(|_, entry| entry.retain_until > now);
    }
}

impl RevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a token fingerprint revoked until `expires_at`, the instant past
    /// which validation would reject the token on its own (natural expiry
    /// plus any accepted clock skew). Idempotent; an entry whose deadline has
    /// already passed is a no-op.
    pub fn revoke(&self, fingerprint: impl Into<String>, expires_at: DateTime<Utc>) {
        let now = Utc::now();
        if expires_at <= now {
            return;
        }
        let mut guard = self.inner.write().expect("rwlock poisoned");
        guard.purge(now);
        guard.tokens.entry(fingerprint.into()).or_insert(expires_at);
    }

    pub fn is_revoked(&self, fingerprint: &str) -> bool {
        let now = Utc::now();
        let guard = self.inner.read().expect("rwlock poisoned");
        guard
            .tokens
            .get(fingerprint)
            .is_some_and(|expires_at| *expires_at > now)
    }

    /// Revoke every token issued to `subject` up to now. `retain_for` bounds
    /// how long the cutoff is kept and must cover the maximum token lifetime.
    pub fn revoke_subject(&self, subject: Uuid, retain_for: Duration) {
        let now = Utc::now();
        let mut guard = self.inner.write().expect("rwlock poisoned");
        guard.purge(now);
        let entry = guard.subjects.entry(subject).or_insert(SubjectCutoff {
            cutoff: now,
            retain_until: now + retain_for,
        });
        if entry.cutoff < now {
            entry.cutoff = now;
            entry.retain_until = now + retain_for;
        }
    }

    pub fn is_subject_revoked(&self, subject: Uuid, issued_at: DateTime<Utc>) -> bool {
        let guard = self.inner.read().expect("rwlock poisoned");
        guard
            .subjects
            .get(&subject)
            .is_some_and(|entry| issued_at <= entry.cutoff)
    }

    /// Drop entries whose tokens have expired on their own. Returns how many
    /// entries were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut guard = self.inner.write().expect("rwlock poisoned");
        let before = guard.tokens.len() + guard.subjects.len();
        guard.purge(now);
        before - (guard.tokens.len() + guard.subjects.len())
    }

    pub fn len(&self) -> usize {
        let guard = self.inner.read().expect("rwlock poisoned");
        guard.tokens.len() + guard.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
