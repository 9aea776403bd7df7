use diesel::prelude::*;

use crate::db::PgPool;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User};
use crate::schema::users;

/// Password hashing is a named collaborator, not this service's concern:
/// callers pass an already-computed hash and it is stored verbatim.
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn create(&self, username: &str, email: &str, password_hash: &str) -> AppResult<User> {
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;
        let new_user = NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        let user = diesel::insert_into(users::table)
            .values(&new_user)
            .get_result(&mut conn)?;
        Ok(user)
    }

    pub fn get(&self, id: i32) -> AppResult<User> {
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;
        users::table.find(id).first(&mut conn).map_err(AppError::from)
    }

    pub fn list(&self) -> AppResult<Vec<User>> {
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;
        Ok(users::table.order(users::id.asc()).load(&mut conn)?)
    }
}
