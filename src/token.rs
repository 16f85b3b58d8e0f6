use std::sync::atomic::{AtomicU64, Ordering};

/// Tags one load or submission so late replies can be recognized as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Issues monotonically increasing tokens. Shared by reference so a request
/// still in flight can be superseded by a newer one.
#[derive(Debug, Default)]
pub struct TokenCounter {
    latest: AtomicU64,
}

impl TokenCounter {
    /// Issues a new token; every earlier token becomes stale.
    pub fn next(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn latest(&self) -> Option<RequestToken> {
        let latest = self.latest.load(Ordering::SeqCst);
        (latest > 0).then_some(RequestToken(latest))
    }

    pub fn is_latest(&self, token: RequestToken) -> bool {
        token.0 == self.latest.load(Ordering::SeqCst)
    }
}
