//! Resolution cache.
//!
//! Successful member resolutions are memoized under a [`CacheKey`] that fingerprints the
//! request: declaring type, member name, requested parameter types, match policy and any
//! non-default [`ResolverConfig`] of the resolver. The cache is append-only. An entry, once
//! present, is never replaced or evicted, so every later resolution of the same key returns the
//! identical member.
//!
//! [`ResolutionCache`] is the default implementation. Its
//! [`MemberCache::get_or_try_insert_with`] serializes first resolutions of one key on a per-key
//! slot: concurrent callers perform the search exactly once. The search itself runs without any
//! map lock held, so it may use the same cache for other keys (for example through a
//! [`crate::metadata::typesystem::TypeLoader`] that resolves members while loading a type).
//! Resolving a key from inside its own search blocks forever.
//!
//! # Examples
//!
//! ```rust
//! use reflectscope::{metadata::member::MemberKind, resolve::CacheKey, MatchPolicy, TypeSignature};
//!
//! let key = CacheKey::new(MemberKind::Method, "a.B", Some("f"), None, MatchPolicy::Best);
//! assert_eq!(key.as_str(), "a.B.f[]#B");
//! let same = CacheKey::new(
//!     MemberKind::Method,
//!     "a.B",
//!     Some("f"),
//!     Some(&TypeSignature::new()),
//!     MatchPolicy::Best,
//! );
//! assert_eq!(key, same);
//! ```

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, OnceLock, PoisonError,
    },
};

use dashmap::DashMap;

use crate::{
    metadata::{
        member::{MemberKind, MemberRc},
        typesystem::TypeSignature,
    },
    resolve::{MatchPolicy, ResolverConfig},
    Result,
};

/// String fingerprint of a resolution request.
///
/// Formats:
/// - method: `pkg.Type.name[p1,p2]#B`
/// - constructor: `pkg.Type[p1,p2]#B`
/// - field: `pkg.Type.name#B`
///
/// Parameter types are written by qualified name, unknown (null) entries as `NULL`. A missing
/// parameter list and an empty one produce the same key.
///
/// Resolvers with a non-default [`ResolverConfig`] extend the key through
/// [`CacheKey::with_config`]: `!` when boxing is disabled, then `/h<n>` and `/e<n>` for changed
/// walk limits, e.g. `pkg.Type.name[int]#B!`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build the key for a resolution request
    #[must_use]
    pub fn new(
        kind: MemberKind,
        declaring: &str,
        name: Option<&str>,
        parameters: Option<&TypeSignature>,
        policy: MatchPolicy,
    ) -> Self {
        let params = parameters.map(|sig| sig.names().join(",")).unwrap_or_default();
        let tag = policy.tag();

        let key = match (kind, name) {
            (MemberKind::Field, Some(name)) => format!("{declaring}.{name}#{tag}"),
            (MemberKind::Field, None) => format!("{declaring}.#{tag}"),
            (MemberKind::Constructor, _) => format!("{declaring}[{params}]#{tag}"),
            (MemberKind::Method, Some(name)) => format!("{declaring}.{name}[{params}]#{tag}"),
            (MemberKind::Method, None) => format!("{declaring}.[{params}]#{tag}"),
        };
        CacheKey(key)
    }

    /// Extend the key with the parts of `config` that differ from the default.
    ///
    /// Results found under different configurations can differ, so resolvers sharing a cache
    /// must not share their keys. The default configuration leaves the key unchanged.
    #[must_use]
    pub fn with_config(mut self, config: &ResolverConfig) -> Self {
        let default = ResolverConfig::default();
        if !config.allow_autoboxing {
            self.0.push('!');
        }
        if config.max_hierarchy_depth != default.max_hierarchy_depth {
            self.0.push_str(&format!("/h{}", config.max_hierarchy_depth));
        }
        if config.max_enclosing_depth != default.max_enclosing_depth {
            self.0.push_str(&format!("/e{}", config.max_enclosing_depth));
        }
        self
    }

    /// The key as a string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({})", self.0)
    }
}

/// Storage for resolved members.
///
/// Implementations must be append-only: [`MemberCache::put`] never replaces an existing entry.
pub trait MemberCache: Send + Sync {
    /// The member stored under `key`
    fn get(&self, key: &CacheKey) -> Option<MemberRc>;

    /// Store `member` under `key` unless the key is already present.
    ///
    /// Returns the member that is stored after the call, which is the existing one if the key
    /// was taken.
    fn put(&self, key: CacheKey, member: MemberRc) -> MemberRc;

    /// Return the member under `key`, or run `resolve` and store its result.
    ///
    /// Errors from `resolve` are returned and nothing is stored. The provided implementation is
    /// not atomic; implementations that can lock a key should override it.
    ///
    /// # Errors
    /// Returns whatever `resolve` returns.
    fn get_or_try_insert_with(
        &self,
        key: &CacheKey,
        resolve: &mut dyn FnMut() -> Result<MemberRc>,
    ) -> Result<MemberRc> {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        let member = resolve()?;
        Ok(self.put(key.clone(), member))
    }

    /// Number of stored entries
    fn len(&self) -> usize;

    /// Returns true if nothing is stored
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hit and miss counters of a [`ResolutionCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Requests answered from the cache
    pub hits: u64,
    /// Requests that had to run a search
    pub misses: u64,
}

/// Concurrent, append-only [`MemberCache`] backed by a [`DashMap`].
#[derive(Default)]
pub struct ResolutionCache {
    entries: DashMap<CacheKey, MemberRc>,
    /// Per-key locks of first resolutions still in flight (or failed)
    pending: DashMap<CacheKey, Arc<Mutex<()>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache instance.
    ///
    /// Resolvers use a private cache unless this one (or another) is injected with
    /// [`crate::MemberResolver::with_cache`].
    pub fn global() -> Arc<ResolutionCache> {
        static GLOBAL: OnceLock<Arc<ResolutionCache>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(ResolutionCache::new()))
            .clone()
    }

    /// Current hit and miss counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl MemberCache for ResolutionCache {
    fn get(&self, key: &CacheKey) -> Option<MemberRc> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: CacheKey, member: MemberRc) -> MemberRc {
        self.entries.entry(key).or_insert(member).value().clone()
    }

    fn get_or_try_insert_with(
        &self,
        key: &CacheKey,
        resolve: &mut dyn FnMut() -> Result<MemberRc>,
    ) -> Result<MemberRc> {
        if let Some(hit) = self.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }

        // No shard lock may be held while waiting or searching
        let slot = self.pending.entry(key.clone()).or_default().value().clone();
        // Guards no data
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(hit) = self.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let member = self.put(key.clone(), resolve()?);
        self.pending.remove(key);
        Ok(member)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
