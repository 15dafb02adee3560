//! Member resolution.
//!
//! [`MemberResolver`] finds the member a request should bind to. For each scope, starting at
//! the declaring type of the request:
//!
//! 1. an exact declared lookup (identical name and parameter types)
//! 2. unless the policy is [`MatchPolicy::Exact`], the cheapest declared overload whose
//!    parameters accept the requested types, ranked by [`crate::resolve::compare_signatures`]
//! 3. unless the policy is `Exact`, the same on the superclass, up to the root of the hierarchy.
//!    Constructors are not inherited and only searched on the scope type itself
//!
//! With [`MatchPolicy::Deep`], the whole procedure is repeated on every enclosing type,
//! innermost first. Constructor lookups never leave the requested type. Field lookups follow
//! the same walk without the overload step.
//!
//! Successful resolutions are made accessible and stored in the resolver's
//! [`MemberCache`]; the cache is consulted before any search. A failed resolution reports
//! [`Error::MemberNotFound`] with the first lookup failure as its source.

use std::{cmp::Ordering, collections::HashSet, fmt, sync::Arc};

use rayon::prelude::*;

use crate::{
    metadata::{
        member::{describe_lookup, MemberKind, MemberRc},
        reflection::Reflection,
        token::Token,
        typesystem::{RuntimeType, RuntimeTypeRc, TypeSignature},
    },
    resolve::{
        assignability::is_signature_assignable,
        cache::{CacheKey, MemberCache, ResolutionCache},
        cost::compare_signatures,
        EnclosingWalker, MatchPolicy, NestingConvention, ResolverConfig,
    },
    runtime::Value,
    Error, Result,
};

/// A single member resolution request
#[derive(Clone)]
pub struct MemberQuery {
    /// The kind of member to find
    pub kind: MemberKind,
    /// The type to start searching at
    pub declaring: RuntimeTypeRc,
    /// Member name; required for methods and fields, ignored for constructors
    pub name: Option<String>,
    /// Match strictness and search range
    pub policy: MatchPolicy,
    /// Requested parameter types; `None` is the same as an empty list
    pub parameters: Option<TypeSignature>,
}

impl MemberQuery {
    fn new(kind: MemberKind, declaring: &RuntimeTypeRc, name: Option<&str>) -> Self {
        MemberQuery {
            kind,
            declaring: declaring.clone(),
            name: name.map(str::to_string),
            policy: MatchPolicy::default(),
            parameters: None,
        }
    }

    /// Query for a method named `name` on `declaring`
    #[must_use]
    pub fn method(declaring: &RuntimeTypeRc, name: &str) -> Self {
        Self::new(MemberKind::Method, declaring, Some(name))
    }

    /// Query for a constructor of `declaring`
    #[must_use]
    pub fn constructor(declaring: &RuntimeTypeRc) -> Self {
        Self::new(MemberKind::Constructor, declaring, None)
    }

    /// Query for a field named `name` on `declaring`
    #[must_use]
    pub fn field(declaring: &RuntimeTypeRc, name: &str) -> Self {
        Self::new(MemberKind::Field, declaring, Some(name))
    }

    /// Set the match policy (default: [`MatchPolicy::Best`])
    #[must_use]
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the requested parameter types
    #[must_use]
    pub fn with_parameters(mut self, parameters: TypeSignature) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// The cache key of this request under the default [`ResolverConfig`]
    ///
    /// Resolvers extend it with [`CacheKey::with_config`].
    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        let name = match self.kind {
            MemberKind::Constructor => None,
            MemberKind::Method | MemberKind::Field => self.name.as_deref(),
        };
        CacheKey::new(
            self.kind,
            &self.declaring.name,
            name,
            self.parameters.as_ref(),
            self.policy,
        )
    }

    fn validate(&self) -> Result<()> {
        match (self.kind, self.name.as_deref()) {
            (MemberKind::Method | MemberKind::Field, None | Some("")) => Err(Error::InvalidQuery(
                format!("{} lookup on {} requires a name", self.kind, self.declaring.name),
            )),
            _ => Ok(()),
        }
    }

    fn describe(&self, parameters: &TypeSignature) -> String {
        describe_lookup(
            self.kind,
            &self.declaring.name,
            self.name.as_deref(),
            parameters,
        )
    }
}

impl fmt::Display for MemberQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let empty = TypeSignature::new();
        let parameters = self.parameters.as_ref().unwrap_or(&empty);
        write!(f, "{} {} ({})", self.kind, self.describe(parameters), self.policy)
    }
}

/// Resolves members by name, parameter types and [`MatchPolicy`].
///
/// Cloning a resolver is cheap; clones share the reflective facility and the cache.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use reflectscope::prelude::*;
///
/// let registry = Arc::new(TypeRegistry::new()?);
/// let object = registry.find_type("java.lang.Object", None)?;
/// let outer = TypeBuilder::class("app.Outer")
///     .method(MemberBuilder::method("log").param(&object))
///     .build(&registry)?;
/// let inner = TypeBuilder::inner_class(&outer, "Inner").build(&registry)?;
///
/// let resolver = MemberResolver::new(registry.clone());
/// let string = registry.find_type("java.lang.String", None)?;
/// let args = TypeSignature::from_types([&string]);
///
/// assert!(resolver.find_method(&inner, "log", MatchPolicy::Best, Some(&args)).is_err());
/// let log = resolver.find_method(&inner, "log", MatchPolicy::Deep, Some(&args))?;
/// assert_eq!(log.to_string(), "app.Outer.log(java.lang.Object)");
/// # Ok::<(), reflectscope::Error>(())
/// ```
#[derive(Clone)]
pub struct MemberResolver {
    reflection: Arc<dyn Reflection>,
    cache: Arc<dyn MemberCache>,
    walker: EnclosingWalker,
    config: ResolverConfig,
}

impl MemberResolver {
    /// Create a resolver with a private cache and the default configuration
    ///
    /// ## Arguments
    /// * 'reflection' - The reflective facility to query
    pub fn new(reflection: Arc<dyn Reflection>) -> Self {
        MemberResolver {
            walker: EnclosingWalker::new(reflection.clone()),
            reflection,
            cache: Arc::new(ResolutionCache::new()),
            config: ResolverConfig::default(),
        }
    }

    /// Use `cache` instead of the private one, e.g. [`ResolutionCache::global`]
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn MemberCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the nesting convention used by deep lookups
    #[must_use]
    pub fn with_convention(mut self, convention: NestingConvention) -> Self {
        self.walker = self.walker.with_convention(convention);
        self
    }

    /// The reflective facility
    #[must_use]
    pub fn reflection(&self) -> &Arc<dyn Reflection> {
        &self.reflection
    }

    /// The resolution cache
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn MemberCache> {
        &self.cache
    }

    /// The enclosing type walker
    #[must_use]
    pub fn walker(&self) -> &EnclosingWalker {
        &self.walker
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a request.
    ///
    /// # Errors
    /// Returns [`Error::InvalidQuery`] for a method or field request without a name, and
    /// [`Error::MemberNotFound`] if no scope holds a matching member.
    pub fn resolve(&self, query: &MemberQuery) -> Result<MemberRc> {
        query.validate()?;

        let key = query.cache_key().with_config(&self.config);
        self.cache.get_or_try_insert_with(&key, &mut || {
            log::debug!("Cache miss for {}", key);
            let member = self.search(query)?;
            self.reflection.make_accessible(&member);
            Ok(member)
        })
    }

    /// Find a method
    ///
    /// # Errors
    /// See [`MemberResolver::resolve`].
    pub fn find_method(
        &self,
        declaring: &RuntimeTypeRc,
        name: &str,
        policy: MatchPolicy,
        parameters: Option<&TypeSignature>,
    ) -> Result<MemberRc> {
        let mut query = MemberQuery::method(declaring, name).with_policy(policy);
        query.parameters = parameters.cloned();
        self.resolve(&query)
    }

    /// Find a constructor
    ///
    /// # Errors
    /// See [`MemberResolver::resolve`].
    pub fn find_constructor(
        &self,
        declaring: &RuntimeTypeRc,
        policy: MatchPolicy,
        parameters: Option<&TypeSignature>,
    ) -> Result<MemberRc> {
        let mut query = MemberQuery::constructor(declaring).with_policy(policy);
        query.parameters = parameters.cloned();
        self.resolve(&query)
    }

    /// Find a field
    ///
    /// # Errors
    /// See [`MemberResolver::resolve`].
    pub fn find_field(
        &self,
        declaring: &RuntimeTypeRc,
        name: &str,
        policy: MatchPolicy,
    ) -> Result<MemberRc> {
        self.resolve(&MemberQuery::field(declaring, name).with_policy(policy))
    }

    /// Find the method that a call with `args` binds to, using the runtime types of the values
    ///
    /// # Errors
    /// Returns an error if an argument's runtime type is unknown, otherwise see
    /// [`MemberResolver::resolve`].
    pub fn find_method_for_args(
        &self,
        declaring: &RuntimeTypeRc,
        name: &str,
        policy: MatchPolicy,
        args: &[Value],
    ) -> Result<MemberRc> {
        let parameters = Value::signature_of(self.reflection.as_ref(), args)?;
        self.find_method(declaring, name, policy, Some(&parameters))
    }

    /// Resolve many requests in parallel.
    ///
    /// Results are returned in request order. All requests share this resolver's cache.
    pub fn resolve_all(&self, queries: &[MemberQuery]) -> Vec<Result<MemberRc>> {
        queries.par_iter().map(|query| self.resolve(query)).collect()
    }

    fn search(&self, query: &MemberQuery) -> Result<MemberRc> {
        let empty = TypeSignature::new();
        let parameters = query.parameters.as_ref().unwrap_or(&empty);

        let mut first_failure = None;
        let mut enclosing_depth = 0;
        let mut scope = Some(query.declaring.clone());
        while let Some(current) = scope {
            if let Some(found) =
                self.search_hierarchy(&current, query, parameters, &mut first_failure)
            {
                log::debug!("Resolved {} to {}", query, found);
                return Ok(found);
            }

            if !query.policy.walks_enclosing() || query.kind == MemberKind::Constructor {
                break;
            }
            if enclosing_depth >= self.config.max_enclosing_depth {
                log::warn!(
                    "Stopped enclosing walk for {} at {} (limit {})",
                    query,
                    current.name,
                    self.config.max_enclosing_depth
                );
                break;
            }
            enclosing_depth += 1;
            scope = self.walker.enclosing_type(&current);
        }

        let signature = query.describe(parameters);
        let source = first_failure.unwrap_or_else(|| Error::NoSuchMember {
            signature: signature.clone(),
        });
        Err(Error::MemberNotFound {
            signature,
            source: Box::new(source),
        })
    }

    fn search_hierarchy(
        &self,
        scope: &RuntimeTypeRc,
        query: &MemberQuery,
        parameters: &TypeSignature,
        first_failure: &mut Option<Error>,
    ) -> Option<MemberRc> {
        let mut visited: HashSet<Token> = HashSet::new();
        let mut current = Some(scope.clone());
        while let Some(ty) = current {
            if !visited.insert(ty.token) {
                log::warn!("Hierarchy of {} loops back to {}", scope.name, ty.name);
                break;
            }
            if visited.len() > self.config.max_hierarchy_depth {
                log::warn!(
                    "Stopped superclass walk of {} at {} (limit {})",
                    scope.name,
                    ty.name,
                    self.config.max_hierarchy_depth
                );
                break;
            }

            log::trace!("Looking for {} on {}", query, ty.name);
            match self.reflection.declared_member(
                &ty,
                query.kind,
                query.name.as_deref(),
                parameters,
            ) {
                Ok(found) => return Some(found),
                Err(error) => {
                    if first_failure.is_none() {
                        *first_failure = Some(error);
                    }
                }
            }

            if query.policy.allows_assignable() && query.kind.has_parameters() {
                if let Some(found) = self.best_candidate(&ty, query, parameters) {
                    return Some(found);
                }
            }

            if !query.policy.walks_superclasses() || query.kind == MemberKind::Constructor {
                break;
            }
            current = self.reflection.superclass_of(&ty);
        }

        None
    }

    fn best_candidate(
        &self,
        ty: &RuntimeType,
        query: &MemberQuery,
        parameters: &TypeSignature,
    ) -> Option<MemberRc> {
        let reflection = self.reflection.as_ref();
        let mut best: Option<(MemberRc, TypeSignature)> = None;

        for candidate in reflection.list_members(ty, query.kind) {
            if query.kind == MemberKind::Method
                && Some(candidate.name.as_str()) != query.name.as_deref()
            {
                continue;
            }
            let Ok(declared) = candidate.signature() else {
                continue;
            };
            if !is_signature_assignable(
                reflection,
                parameters,
                &declared,
                self.config.allow_autoboxing,
            ) {
                continue;
            }

            let better = match &best {
                Some((_, current)) => {
                    compare_signatures(reflection, &declared, current, parameters) == Ordering::Less
                }
                None => true,
            };
            if better {
                best = Some((candidate, declared));
            }
        }

        best.map(|(member, _)| member)
    }
}
