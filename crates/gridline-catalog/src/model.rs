// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Soap,
}

impl Method {
    pub const ALL: [Self; 6] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Patch,
        Self::Soap,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Patch => "patch",
            Self::Soap => "soap",
        }
    }

    /// Case-insensitive; `GET` and `get` both parse.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(value))
    }

    pub const fn is_soap(self) -> bool {
        matches!(self, Self::Soap)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub path: String,
    pub method: Method,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<String>,
}

impl Endpoint {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            operations: Vec::new(),
        }
    }

    pub fn with_operations<I, S>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operations = operations.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    #[serde(rename = "serviceName")]
    pub name: String,
    pub endpoints: Vec<Endpoint>,
}

impl Service {
    pub fn new(name: impl Into<String>, endpoints: Vec<Endpoint>) -> Self {
        Self {
            name: name.into(),
            endpoints,
        }
    }

    pub fn endpoint(&self, method: Method, path: &str) -> Option<&Endpoint> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.method == method && endpoint.path == path)
    }
}

/// A repository (or client) owning a set of services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub services: Vec<Service>,
}

impl Repository {
    pub fn new(id: impl Into<String>, services: Vec<Service>) -> Self {
        Self {
            id: id.into(),
            services,
        }
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|service| service.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub repositories: Vec<Repository>,
}

impl Catalog {
    pub fn new(repositories: Vec<Repository>) -> Self {
        Self { repositories }
    }

    pub fn repository(&self, id: &str) -> Option<&Repository> {
        self.repositories.iter().find(|repo| repo.id == id)
    }

    /// First service with this name across all repositories.
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.repositories
            .iter()
            .find_map(|repo| repo.service(name))
    }

    pub fn endpoint_count(&self) -> usize {
        self.repositories
            .iter()
            .flat_map(|repo| &repo.services)
            .map(|service| service.endpoints.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}
