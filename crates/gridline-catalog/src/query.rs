// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use gridline_app::page::{paginate, total_pages};
use std::collections::BTreeSet;

use crate::{Catalog, Endpoint, Method, Repository};

pub const OPERATIONS_PER_PAGE: usize = 10;

/// Repositories where the id, or any service name, endpoint path, method or
/// operation, contains `query` case-insensitively.
pub fn search_repositories<'a>(catalog: &'a Catalog, query: &str) -> Vec<&'a Repository> {
    if query.is_empty() {
        return catalog.repositories.iter().collect();
    }
    let needle = query.to_lowercase();
    let hit = |text: &str| text.to_lowercase().contains(&needle);
    catalog
        .repositories
        .iter()
        .filter(|repo| {
            hit(repo.id.as_str())
                || repo.services.iter().any(|service| {
                    hit(service.name.as_str())
                        || service.endpoints.iter().any(|endpoint| endpoint_hit(endpoint, &hit))
                })
        })
        .collect()
}

fn endpoint_hit(endpoint: &Endpoint, hit: &impl Fn(&str) -> bool) -> bool {
    hit(endpoint.path.as_str())
        || hit(endpoint.method.as_str())
        || endpoint.operations.iter().any(|operation| hit(operation.as_str()))
}

/// Shortens `text` to `max` characters followed by `...`.
pub fn truncate_label(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let mut out = text.chars().take(max).collect::<String>();
    out.push_str("...");
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRef {
    pub operation: String,
    pub endpoint_path: String,
    pub method: Method,
}

/// The operations panel: one active service, the endpoints picked under it,
/// and the SOAP operations picked individually.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OperationQuery {
    pub service: String,
    pub endpoints: BTreeSet<String>,
    pub soap_operations: BTreeSet<String>,
}

impl OperationQuery {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    pub fn endpoint(mut self, path: impl Into<String>) -> Self {
        self.endpoints.insert(path.into());
        self
    }

    pub fn soap_operation(mut self, operation: impl Into<String>) -> Self {
        self.soap_operations.insert(operation.into());
        self
    }

    /// REST endpoints contribute every operation; SOAP endpoints only the
    /// operations picked individually. Endpoint order follows the catalog.
    pub fn operations(&self, catalog: &Catalog) -> Vec<OperationRef> {
        let Some(service) = catalog.service(&self.service) else {
            return Vec::new();
        };
        service
            .endpoints
            .iter()
            .filter(|endpoint| self.endpoints.contains(&endpoint.path))
            .flat_map(|endpoint| {
                endpoint
                    .operations
                    .iter()
                    .filter(|operation| {
                        !endpoint.method.is_soap() || self.soap_operations.contains(*operation)
                    })
                    .map(|operation| OperationRef {
                        operation: operation.clone(),
                        endpoint_path: endpoint.path.clone(),
                        method: endpoint.method,
                    })
            })
            .collect()
    }

    pub fn page<'a>(&self, operations: &'a [OperationRef], page: usize) -> &'a [OperationRef] {
        paginate(operations, page, OPERATIONS_PER_PAGE)
    }

    pub fn total_pages(&self, operations: &[OperationRef]) -> usize {
        total_pages(operations.len(), OPERATIONS_PER_PAGE)
    }
}
