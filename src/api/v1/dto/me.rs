use serde::Serialize;

use crate::services::auth::Principal;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub application: String,
    pub roles: Vec<String>,
}

impl From<&Principal> for MeResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            username: principal.username().to_string(),
            application: principal.application().to_string(),
            roles: principal.roles().to_vec(),
        }
    }
}
