//! Extension pour intégrer la configuration de l'API dans pmoconfig
//!
//! Ce module fournit le trait `VirtConfigExt` qui ajoute à
//! `pmoconfig::Config` la lecture des paramètres de connexion.

use std::time::Duration;

use anyhow::Result;
use pmoconfig::Config;

use crate::rest_service::RestSettings;

/// Trait d'extension pour lire les paramètres de l'API depuis pmoconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use pmoconfig::get_config;
/// use pmovirt::{RestService, VirtConfigExt};
///
/// let settings = get_config().get_rest_settings()?;
/// let service = RestService::new(settings)?;
/// ```
pub trait VirtConfigExt {
    /// Paramètres de connexion (URL de l'API et timeout)
    fn get_rest_settings(&self) -> Result<RestSettings>;
}

impl VirtConfigExt for Config {
    fn get_rest_settings(&self) -> Result<RestSettings> {
        let api_url = self.get_api_url()?;
        let timeout = Duration::from_secs(self.get_api_timeout_secs()?);
        Ok(RestSettings::new(api_url).with_timeout(timeout))
    }
}
