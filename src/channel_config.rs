use std::{
    collections::HashSet,
    io,
    path::{Path, PathBuf},
};

use anyhow::bail;
use serde::{Deserialize, Serialize};
use tv_grab_utils::fs_util::write_toml;
use url::Url;

use crate::{
    grabber_trait::Grabber,
    schema::{Channel, ChannelId, SiteChannelId},
};

/// The channels a user chose to grab, persisted as TOML.
#[derive(Clone, Default, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Overrides the grabber's default site address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<Url>,
    #[serde(default, rename = "channel")]
    pub channels: Vec<ConfiguredChannel>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ConfiguredChannel {
    pub id: ChannelId,
    pub site_id: SiteChannelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcaster: Option<String>,
}

impl From<&Channel> for ConfiguredChannel {
    fn from(channel: &Channel) -> Self {
        Self {
            id: channel.id.clone(),
            site_id: channel.site_id.clone(),
            name: Some(channel.display_name.clone()),
            broadcaster: channel.broadcaster.clone(),
        }
    }
}

impl From<&ConfiguredChannel> for Channel {
    fn from(channel: &ConfiguredChannel) -> Self {
        Channel {
            id: channel.id.clone(),
            site_id: channel.site_id.clone(),
            display_name: channel
                .name
                .clone()
                .unwrap_or_else(|| channel.id.to_string()),
            broadcaster: channel.broadcaster.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Config file was not found.  Run with --configure first.")]
    NotFound,
    #[error("An I/O error occurred when loading the config file: {0:?}")]
    IOError(io::Error),
    #[error("The config file is malformed: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Channel {0} is configured twice")]
    DuplicateChannel(ChannelId),
}
impl From<io::Error> for ConfigLoadError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            _ => Self::IOError(e),
        }
    }
}

impl ChannelConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let config: Self = toml::from_str(&fs_err::read_to_string(path.as_ref())?)?;
        if let Some(id) = config.first_duplicate() {
            return Err(ConfigLoadError::DuplicateChannel(id.clone()));
        }
        Ok(config)
    }

    pub fn save(&self, path: impl Into<PathBuf>) -> anyhow::Result<()> {
        if let Some(id) = self.first_duplicate() {
            bail!("Refusing to save: channel {id} is configured twice");
        }
        write_toml(path, self)
    }

    pub fn base_url<T: Grabber>(&self) -> anyhow::Result<Url> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => Ok(Url::parse(T::DEFAULT_BASE_URL)?),
        }
    }

    pub fn contains(&self, id: &ChannelId) -> bool {
        self.channels.iter().any(|c| &c.id == id)
    }

    fn first_duplicate(&self) -> Option<&ChannelId> {
        let mut seen = HashSet::new();
        self.channels.iter().map(|c| &c.id).find(|id| !seen.insert(*id))
    }
}

/// `$HOME/.xmltv/<name>.toml`, the customary place for grabber configuration.
pub fn default_config_path<T: Grabber>() -> PathBuf {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".xmltv").join(format!("{}.toml", T::NAME))
}
