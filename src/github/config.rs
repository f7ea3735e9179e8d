//! Github configuration
use super::platform::GithubPlatform;
use serde::{Deserialize, Serialize};

use crate::{
    config::OrgMoverConfig, config_password_wrap, config_value_wrap, errors::OrgMoverError,
};

/// Github configuration
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct GithubConfig {
    /// Github username
    pub username: Option<String>,

    /// Github token
    pub token: Option<String>,
}

impl GithubConfig {
    /// Get the github platform
    /// # Errors
    /// Error if the credentials can't be read or saved
    pub fn get_platform(config: &mut OrgMoverConfig) -> Result<GithubPlatform, OrgMoverError> {
        let username = config_value_wrap!(
            config,
            github,
            GithubConfig,
            username,
            "your github username"
        );
        let token = config_password_wrap!(
            config,
            github,
            GithubConfig,
            token,
            "your github token (https://github.com/settings/personal-access-tokens)"
        );
        Ok(GithubPlatform::new(username, token))
    }
}
