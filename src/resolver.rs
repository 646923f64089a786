use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::models::{StockStatus, Watch};
use crate::utils::error::{AppError, Result};

pub const DEFAULT_COUNT_REGEX: &str = r"(\d+)\s+Available";
pub const DEFAULT_OOS_REGEX: &str = r"Out of stock|Sold out|0\s+Available";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resolution {
    pub status: StockStatus,
    pub count: Option<i64>,
}

impl Resolution {
    fn keyword(status: StockStatus) -> Self {
        Self { status, count: None }
    }
}

/// Three-tier rule chain: quantity, then out-of-stock, then in-stock.
///
/// Blank count and out-of-stock patterns fall back to the defaults above. A
/// blank in-stock pattern disables that tier instead; existing watches rely
/// on the difference.
#[derive(Debug, Clone)]
pub struct StatusResolver {
    count: Regex,
    oos: Regex,
    instock: Option<Regex>,
}

impl StatusResolver {
    pub fn new(count_pattern: &str, oos_pattern: &str, instock_pattern: &str) -> Result<Self> {
        let count = compile(non_blank(count_pattern).unwrap_or(DEFAULT_COUNT_REGEX))?;
        let oos = compile(non_blank(oos_pattern).unwrap_or(DEFAULT_OOS_REGEX))?;
        let instock = non_blank(instock_pattern).map(compile).transpose()?;

        Ok(Self { count, oos, instock })
    }

    pub fn for_watch(watch: &Watch) -> Result<Self> {
        Self::new(&watch.count_regex, &watch.oos_regex, &watch.instock_regex)
    }

    pub fn resolve(&self, fragment: &str) -> Resolution {
        if let Some(count) = self.parse_count(fragment) {
            let status = if count > 0 {
                StockStatus::InStock
            } else {
                StockStatus::OutOfStock
            };
            return Resolution {
                status,
                count: Some(count),
            };
        }

        if self.oos.is_match(fragment) {
            return Resolution::keyword(StockStatus::OutOfStock);
        }

        if self.instock.as_ref().is_some_and(|re| re.is_match(fragment)) {
            return Resolution::keyword(StockStatus::InStock);
        }

        Resolution::keyword(StockStatus::Unknown)
    }

    /// First capture group of the first count match, if it is an integer.
    /// Anything else counts as no match and lets the keyword tiers decide.
    fn parse_count(&self, fragment: &str) -> Option<i64> {
        let captures = self.count.captures(fragment)?;
        let raw = captures.get(1)?.as_str().trim();
        match raw.parse::<i64>() {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::debug!("Ignoring unparseable count capture {:?}: {}", raw, e);
                None
            }
        }
    }
}

/// Resolve a fragment against raw pattern strings in one call.
pub fn resolve(
    fragment: &str,
    count_pattern: &str,
    oos_pattern: &str,
    instock_pattern: &str,
) -> Result<Resolution> {
    Ok(StatusResolver::new(count_pattern, oos_pattern, instock_pattern)?.resolve(fragment))
}

fn non_blank(pattern: &str) -> Option<&str> {
    let trimmed = pattern.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| AppError::Parse {
            message: format!("invalid pattern {:?}: {}", pattern, e),
        })
}
