//! # Accounts
//!
//! Stations, users and the credential store. Passwords are stored as salted
//! argon2 hashes; the plain password never reaches the database.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::config::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use crate::repository::{station, user, StationRepository, UserRepository};
use petro_core::validation::{validate_employee_id, validate_name, validate_password};
use petro_core::{CoreError, Role, Station, User, ValidationError};

/// Registration input for a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub employee_id: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    pub station_id: Option<String>,
    pub area_manager_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AccountService {
    ctx: ServiceContext,
}

impl AccountService {
    pub fn new(ctx: ServiceContext) -> Self {
        AccountService { ctx }
    }

    pub async fn create_station(&self, name: &str, address: Option<&str>) -> ServiceResult<Station> {
        validate_name("name", name)?;

        let created = Station {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            address: address.map(str::to_string),
            created_at: self.ctx.now(),
        };

        let mut conn = self.ctx.pool.acquire().await?;
        station::insert(&mut conn, &created).await?;

        info!(station_id = %created.id, name = %created.name, "Station created");
        Ok(created)
    }

    pub async fn list_stations(&self) -> ServiceResult<Vec<Station>> {
        Ok(StationRepository::new(self.ctx.pool.clone()).list().await?)
    }

    /// Creates a user with a hashed password.
    ///
    /// ## Errors
    /// - `Validation` for bad fields, or an area manager reference that is not an AM
    /// - `NotFound` for an unknown station or area manager
    /// - `Db(UniqueViolation)` for a duplicate employee id
    pub async fn register_user(&self, input: NewUser) -> ServiceResult<User> {
        validate_employee_id(&input.employee_id)?;
        validate_name("name", &input.name)?;
        validate_password(&input.password)?;

        let password_hash = hash_password(&input.password)?;
        let mut tx = self.ctx.begin_write().await?;

        if let Some(station_id) = &input.station_id {
            station::get(&mut tx, station_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Station", station_id.as_str()))?;
        }
        if let Some(manager_id) = &input.area_manager_id {
            let manager = user::get(&mut tx, manager_id)
                .await?
                .ok_or_else(|| CoreError::not_found("User", manager_id.as_str()))?;
            if manager.role != Role::AreaManager {
                return Err(ValidationError::InvalidFormat {
                    field: "area_manager_id".to_string(),
                    reason: format!("{manager_id} has role {}", manager.role),
                }
                .into());
            }
        }

        let created = User {
            id: Uuid::new_v4().to_string(),
            employee_id: input.employee_id.trim().to_string(),
            name: input.name.trim().to_string(),
            role: input.role,
            station_id: input.station_id,
            area_manager_id: input.area_manager_id,
            created_at: self.ctx.now(),
        };
        user::insert(&mut tx, &created, &password_hash).await?;

        tx.commit().await?;
        info!(user_id = %created.id, employee_id = %created.employee_id, role = %created.role, "User registered");
        Ok(created)
    }

    /// Checks a name and password against the credential store.
    ///
    /// Names are not unique; the first user whose hash matches wins.
    pub async fn login(&self, name: &str, password: &str) -> ServiceResult<User> {
        let mut conn = self.ctx.pool.acquire().await?;
        let candidates = user::find_credentials_by_name(&mut conn, name.trim()).await?;

        for candidate in candidates {
            if verify_password(password, &candidate.password_hash) {
                debug!(user_id = %candidate.user.id, "Login accepted");
                return Ok(candidate.user);
            }
        }

        Err(CoreError::InvalidCredentials.into())
    }

    pub async fn get_user(&self, user_id: &str) -> ServiceResult<User> {
        UserRepository::new(self.ctx.pool.clone())
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", user_id).into())
    }

    pub async fn list_users(&self, role: Option<Role>) -> ServiceResult<Vec<User>> {
        Ok(UserRepository::new(self.ctx.pool.clone()).list(role).await?)
    }
}

fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
