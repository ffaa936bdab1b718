// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Line format for catalogs:
//!
//! ```text
//! # repository, service, METHOD path[, operation]
//! customer-api, CustomerManagement, GET /api/v1/customers
//! order-api, SOAP Order Service, SOAP http://example.com/soap/OrderService, CreateOrder
//! ```
//!
//! Repositories, services and endpoints keep first-seen order. Repeating a
//! line with a different operation adds that operation to the endpoint.

use log::debug;

use crate::{Catalog, Endpoint, Method, Repository, Service};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },
}

fn malformed(line: usize, reason: impl Into<String>) -> CatalogError {
    CatalogError::MalformedLine {
        line,
        reason: reason.into(),
    }
}

pub fn parse_catalog_lines<I, S>(lines: I) -> Result<Catalog, CatalogError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut catalog = Catalog::default();
    for (position, raw) in lines.into_iter().enumerate() {
        let line = position + 1;
        let text = raw.as_ref().trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let fields = text.split(',').map(str::trim).collect::<Vec<_>>();
        let [id, service_name, method_path, rest @ ..] = fields.as_slice() else {
            return Err(malformed(
                line,
                format!("expected at least 3 fields, found {}", fields.len()),
            ));
        };
        if rest.len() > 1 {
            return Err(malformed(
                line,
                format!("expected at most 4 fields, found {}", fields.len()),
            ));
        }
        if id.is_empty() {
            return Err(malformed(line, "repository id is empty"));
        }
        if service_name.is_empty() {
            return Err(malformed(line, "service name is empty"));
        }
        let Some((method, path)) = method_path.split_once(char::is_whitespace) else {
            return Err(malformed(
                line,
                format!("expected \"METHOD path\", found {method_path:?}"),
            ));
        };
        let path = path.trim();
        if path.is_empty() {
            return Err(malformed(line, "endpoint path is empty"));
        }
        let Some(method) = Method::parse(method) else {
            return Err(malformed(line, format!("unknown method {method:?}")));
        };
        let operation = rest.first().copied().filter(|operation| !operation.is_empty());

        insert(&mut catalog, id, service_name, method, path, operation);
    }
    debug!(
        "parsed catalog: {} repositories, {} endpoints",
        catalog.repositories.len(),
        catalog.endpoint_count()
    );
    Ok(catalog)
}

fn insert(
    catalog: &mut Catalog,
    id: &str,
    service_name: &str,
    method: Method,
    path: &str,
    operation: Option<&str>,
) {
    let repo_index = match catalog.repositories.iter().position(|repo| repo.id == id) {
        Some(index) => index,
        None => {
            catalog.repositories.push(Repository::new(id, Vec::new()));
            catalog.repositories.len() - 1
        }
    };
    let services = &mut catalog.repositories[repo_index].services;

    let service_index = match services.iter().position(|service| service.name == service_name) {
        Some(index) => index,
        None => {
            services.push(Service::new(service_name, Vec::new()));
            services.len() - 1
        }
    };
    let endpoints = &mut services[service_index].endpoints;

    let endpoint_index = match endpoints
        .iter()
        .position(|endpoint| endpoint.method == method && endpoint.path == path)
    {
        Some(index) => index,
        None => {
            endpoints.push(Endpoint::new(method, path));
            endpoints.len() - 1
        }
    };

    if let Some(operation) = operation {
        let operations = &mut endpoints[endpoint_index].operations;
        if !operations.iter().any(|existing| existing == operation) {
            operations.push(operation.to_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogError, parse_catalog_lines};
    use crate::Method;

    #[test]
    fn lines_fold_into_nested_catalog() {
        let catalog = parse_catalog_lines([
            "customer-api, CustomerManagement, GET /api/v1/customers",
            "customer-api, CustomerManagement, POST /api/v1/customers",
            "order-api, SOAP Order Service, SOAP http://example.com/soap/OrderService, CreateOrder",
            "order-api, SOAP Order Service, SOAP http://example.com/soap/OrderService, CancelOrder",
            "customer-api, CustomerPreferences, PUT /api/v1/preferences",
        ])
        .expect("valid catalog");

        assert_eq!(catalog.repositories.len(), 2);
        let customers = catalog.repository("customer-api").expect("customer repo");
        assert_eq!(customers.services.len(), 2);
        assert_eq!(customers.services[0].endpoints.len(), 2);
        assert_eq!(customers.services[0].endpoints[1].method, Method::Post);

        let soap = catalog
            .service("SOAP Order Service")
            .expect("soap service");
        assert_eq!(soap.endpoints.len(), 1);
        assert_eq!(soap.endpoints[0].operations, vec!["CreateOrder", "CancelOrder"]);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let catalog = parse_catalog_lines(["# header", "", "  ", "a, b, get /x"])
            .expect("valid catalog");
        assert_eq!(catalog.endpoint_count(), 1);
    }

    #[test]
    fn malformed_lines_report_their_line_number() {
        let error = parse_catalog_lines(["a, b, GET /x", "a, b"]).expect_err("too few fields");
        assert!(matches!(error, CatalogError::MalformedLine { line: 2, .. }));

        let error = parse_catalog_lines(["a, b, /x"]).expect_err("missing method");
        assert!(error.to_string().starts_with("line 1:"));

        let error = parse_catalog_lines(["a, b, FETCH /x"]).expect_err("unknown method");
        assert!(error.to_string().contains("FETCH"));

        let error = parse_catalog_lines(["a, b, GET /x, op, extra"]).expect_err("too many");
        assert!(error.to_string().contains("at most 4"));
    }

    #[test]
    fn duplicate_operations_are_kept_once() {
        let catalog = parse_catalog_lines([
            "r, s, SOAP http://svc, Op",
            "r, s, SOAP http://svc, Op",
        ])
        .expect("valid catalog");
        assert_eq!(catalog.repositories[0].services[0].endpoints[0].operations, vec!["Op"]);
    }
}
