//! INI file configuration adapter.

use crate::domain::error::StockfolioError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(|e| std::io::Error::other(e))?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, StockfolioError> {
        match self.config.getint(section, key) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Ok(default),
            Err(reason) => Err(StockfolioError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason,
            }),
        }
    }
}
