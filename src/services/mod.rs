//! Business logic services

pub mod catalog;
pub mod classify;
pub mod users;

use crate::{config::ClassifyConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub classify: classify::ClassifyService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, classify_config: &ClassifyConfig) -> AppResult<Self> {
        let classify = classify::ClassifyService::new(classify_config)?;

        Ok(Self {
            users: users::UsersService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository.clone(), classify.clone()),
            classify,
            repository,
        })
    }
}
