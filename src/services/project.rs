use diesel::prelude::*;

use crate::db::PgPool;
use crate::domain::project_config::ProjectConfig;
use crate::error::{AppError, AppResult};
use crate::models::{NewProject, Project};
use crate::schema::projects;

use super::{ListParams, Order, OrderBy};

pub struct ProjectService {
    pool: PgPool,
}

impl ProjectService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn create(&self, name: &str, config: &ProjectConfig) -> AppResult<Project> {
        if name.chars().count() < 3 || name.chars().count() > 50 {
            return Err(AppError::bad_request(
                "project name must be between 3 and 50 characters",
            ));
        }
        config.validate()?;
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;
        let config_value = serde_json::to_value(config)?;
        let new_project = NewProject {
            name: name.to_string(),
            config: config_value,
        };
        let project = diesel::insert_into(projects::table)
            .values(&new_project)
            .get_result(&mut conn)?;
        Ok(project)
    }

    pub fn get(&self, id: i32) -> AppResult<Project> {
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;
        projects::table.find(id).first(&mut conn).map_err(AppError::from)
    }

    pub fn list(&self, params: &ListParams) -> AppResult<Vec<Project>> {
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;

        let mut query = projects::table.into_boxed();

        if let Some(filter) = params.filter.as_ref().filter(|f| !f.is_empty()) {
            query = query.filter(projects::name.ilike(format!("%{filter}%")));
        }

        query = match (params.order_by, params.order) {
            (OrderBy::Id, Order::Asc) => query.order(projects::id.asc()),
            (OrderBy::Id, Order::Desc) => query.order(projects::id.desc()),
            (OrderBy::Created, Order::Asc) => query.order(projects::created.asc()),
            (OrderBy::Created, Order::Desc) => query.order(projects::created.desc()),
            (OrderBy::Updated, Order::Asc) => query.order(projects::updated.asc()),
            (OrderBy::Updated, Order::Desc) => query.order(projects::updated.desc()),
        };

        Ok(query.limit(params.limit).offset(params.offset).load(&mut conn)?)
    }

    pub fn config(&self, project: &Project) -> AppResult<ProjectConfig> {
        ProjectConfig::from_json(&project.config)
    }
}
