//! Business logic services

pub mod visitors;

use crate::{config::VisitorsConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub visitors: visitors::VisitorsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, visitors_config: VisitorsConfig) -> Self {
        Self {
            visitors: visitors::VisitorsService::new(repository.visitors, visitors_config),
        }
    }
}
