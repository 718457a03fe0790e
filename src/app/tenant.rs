//! Tenant scope identifiers taken from request paths.
//!
//! An id that does not parse is reported as `NotFound`, the same as an id
//! that parses but names nothing, so malformed and unknown ids are indistinguishable.

use crate::app::{
    domain::{OrganizationId, ProjectId, UserId},
    error::AppError,
};

pub fn organization_id(raw: &str) -> Result<OrganizationId, AppError> {
    OrganizationId::from_string(raw).map_err(|_| AppError::NotFound("organization not found".to_string()))
}

pub fn project_id(raw: &str) -> Result<ProjectId, AppError> {
    ProjectId::from_string(raw).map_err(|_| AppError::NotFound("project not found".to_string()))
}

pub fn user_id(raw: &str) -> Result<UserId, AppError> {
    UserId::from_string(raw).map_err(|_| AppError::NotFound("user not found".to_string()))
}
