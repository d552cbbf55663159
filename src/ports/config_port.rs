//! Configuration access port trait.

use crate::domain::error::StockfolioError;

pub trait ConfigPort {
    /// String value, or None when the section or key is absent.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Integer value. An absent key yields the default; a present but
    /// unparseable value is an error, never silently defaulted.
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, StockfolioError>;
}
