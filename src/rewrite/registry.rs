//! Paginator registry
//!
//! Process-wide, initialize-once table of the pagination capabilities available on
//! every `ModelQuery`, plus the configuration and current-page resolver they use.
//! Installing twice is a no-op; there is no teardown.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::config::PaginationConfig;
use crate::connection::Connection;
use crate::model::{Entity, ModelMeta, ModelQuery};
use crate::observability::Logger;
use crate::pagination::{
    LengthAware, Paginated, PaginationError, PaginationMode, PaginationRequest,
    PaginationResult, ResolvedRequest, Simple,
};

use super::guard;

/// Capability name of rewritten length-aware pagination
pub const FAST_PAGINATE: &str = "fast_paginate";

/// Capability name of rewritten simple pagination
pub const SIMPLE_FAST_PAGINATE: &str = "simple_fast_paginate";

/// Supplies the current page when a request does not name one
pub trait PageResolver: Send + Sync {
    fn current_page(&self, page_name: &str) -> u64;
}

/// Always page 1
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstPage;

impl PageResolver for FirstPage {
    fn current_page(&self, _page_name: &str) -> u64 {
        1
    }
}

impl<F> PageResolver for F
where
    F: Fn(&str) -> u64 + Send + Sync,
{
    fn current_page(&self, page_name: &str) -> u64 {
        self(page_name)
    }
}

/// Registered capabilities and their shared settings
pub struct PaginatorRegistry {
    config: PaginationConfig,
    resolver: Box<dyn PageResolver>,
    capabilities: BTreeMap<&'static str, PaginationMode>,
}

impl PaginatorRegistry {
    fn new(config: PaginationConfig, resolver: Box<dyn PageResolver>) -> Self {
        let mut capabilities = BTreeMap::new();
        capabilities.insert(FAST_PAGINATE, PaginationMode::LengthAware);
        capabilities.insert(SIMPLE_FAST_PAGINATE, PaginationMode::Simple);
        Self {
            config,
            resolver,
            capabilities,
        }
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Mode registered under `name`
    pub fn lookup(&self, name: &str) -> Option<PaginationMode> {
        self.capabilities.get(name).copied()
    }

    /// Registered capability names, sorted
    pub fn capabilities(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.capabilities.keys().copied()
    }

    /// Fills request defaults from the model and this registry
    pub fn resolve(&self, request: &PaginationRequest, meta: &ModelMeta) -> ResolvedRequest {
        request.resolve(meta, &self.config.page_name, |page_name| {
            self.resolver.current_page(page_name)
        })
    }
}

impl fmt::Debug for PaginatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatorRegistry")
            .field("config", &self.config)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

static REGISTRY: OnceLock<PaginatorRegistry> = OnceLock::new();

/// Installs the registry with `config`. Later calls return the existing registry.
pub fn install(config: PaginationConfig) -> &'static PaginatorRegistry {
    install_with_resolver(config, FirstPage)
}

/// Installs the registry with `config` and a current-page resolver
pub fn install_with_resolver(
    config: PaginationConfig,
    resolver: impl PageResolver + 'static,
) -> &'static PaginatorRegistry {
    REGISTRY.get_or_init(|| {
        Logger::set_min_severity(config.log_level);
        let registry = PaginatorRegistry::new(config, Box::new(resolver));
        let names: Vec<&str> = registry.capabilities().collect();
        Logger::trace(
            "PAGINATORS_INSTALLED",
            &[
                ("capabilities", names.join(",").as_str()),
                (
                    "strict_grouping",
                    if registry.config.strict_grouping { "true" } else { "false" },
                ),
            ],
        );
        registry
    })
}

/// The installed registry, installing defaults on first use
pub fn registry() -> &'static PaginatorRegistry {
    REGISTRY.get_or_init(|| PaginatorRegistry::new(PaginationConfig::default(), Box::new(FirstPage)))
}

impl<E: Entity> ModelQuery<E> {
    /// Calls the paginator registered under `name`
    pub fn call_paginator(
        &self,
        name: &str,
        conn: &mut dyn Connection,
        request: &PaginationRequest,
    ) -> PaginationResult<Paginated<E>> {
        let registry = registry();
        let mode = registry
            .lookup(name)
            .ok_or_else(|| PaginationError::UnknownCapability(name.to_string()))?;
        let resolved = registry.resolve(request, self.meta());

        match mode {
            PaginationMode::LengthAware => {
                guard::run::<LengthAware, E>(self, conn, &resolved, registry.config())
                    .map(Paginated::from)
            }
            PaginationMode::Simple => {
                guard::run::<Simple, E>(self, conn, &resolved, registry.config())
                    .map(Paginated::from)
            }
        }
    }
}
