//! Tree configuration.
//!
//! An [`RTreeConfig`] fixes everything about a tree that cannot change after
//! construction: dimensionality, fanout bounds, the split strategy and the
//! working coordinate system.

use std::fmt;
use std::sync::Arc;

use crate::errors::{IndexError, IndexResult};
use crate::rtree::split::{SplitStrategy, StarSplit};

/// Default maximum number of children/entries per node
pub const DEFAULT_MAX_FANOUT: usize = 16;

/// Smallest permitted maximum fanout
pub const MIN_MAX_FANOUT: usize = 2;

/// Largest dimensionality the file format can describe
pub const MAX_DIMENSION: usize = u16::MAX as usize;

/// Default minimum fanout for a given maximum: `max(1, max_fanout / 2)`.
pub fn default_min_fanout(max_fanout: usize) -> usize {
    (max_fanout / 2).max(1)
}

/// R-tree configuration.
///
/// # Example
///
/// ```rust
/// use spatial_index::{QuadraticSplit, RTreeConfig};
///
/// let config = RTreeConfig::new(3)
///     .with_max_fanout(32)
///     .with_min_fanout(8)
///     .with_split_strategy(QuadraticSplit)
///     .with_crs("EPSG:4979");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct RTreeConfig {
    dimension: usize,
    max_fanout: usize,
    min_fanout: Option<usize>,
    splitter: Arc<dyn SplitStrategy>,
    crs: Option<String>,
}

impl RTreeConfig {
    /// Creates a configuration with default fanout and the R* split.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            max_fanout: DEFAULT_MAX_FANOUT,
            min_fanout: None,
            splitter: Arc::new(StarSplit),
            crs: None,
        }
    }

    #[must_use]
    pub fn with_max_fanout(mut self, max_fanout: usize) -> Self {
        self.max_fanout = max_fanout;
        self
    }

    /// Overrides the derived minimum fanout.
    #[must_use]
    pub fn with_min_fanout(mut self, min_fanout: usize) -> Self {
        self.min_fanout = Some(min_fanout);
        self
    }

    #[must_use]
    pub fn with_split_strategy<S: SplitStrategy + 'static>(mut self, strategy: S) -> Self {
        self.splitter = Arc::new(strategy);
        self
    }

    /// Sets the working coordinate system id recorded in snapshots.
    #[must_use]
    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn max_fanout(&self) -> usize {
        self.max_fanout
    }

    pub fn min_fanout(&self) -> usize {
        self.min_fanout
            .unwrap_or_else(|| default_min_fanout(self.max_fanout))
    }

    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }

    pub(crate) fn splitter(&self) -> &dyn SplitStrategy {
        self.splitter.as_ref()
    }

    /// Checks that the parameters describe a buildable tree.
    ///
    /// Requirements: `1 <= dimension <= 65535`, `max_fanout >= 2`,
    /// `max_fanout` fits in a `u32`, and `1 <= min_fanout` with
    /// `2 * min_fanout <= max_fanout + 1` so that every split can give both
    /// halves at least `min_fanout` items.
    pub fn validate(&self) -> IndexResult<()> {
        if self.dimension == 0 || self.dimension > MAX_DIMENSION {
            return Err(IndexError::InvalidConfig(format!(
                "dimension must be in 1..={}, got {}",
                MAX_DIMENSION, self.dimension
            )));
        }
        if self.max_fanout < MIN_MAX_FANOUT || self.max_fanout > u32::MAX as usize {
            return Err(IndexError::InvalidConfig(format!(
                "max fanout must be at least {}, got {}",
                MIN_MAX_FANOUT, self.max_fanout
            )));
        }
        let min_fanout = self.min_fanout();
        if min_fanout == 0 || min_fanout > (self.max_fanout + 1) / 2 {
            return Err(IndexError::InvalidConfig(format!(
                "min fanout {} is incompatible with max fanout {}",
                min_fanout, self.max_fanout
            )));
        }
        if let Some(crs) = &self.crs {
            if crs.len() > u16::MAX as usize {
                return Err(IndexError::InvalidConfig(
                    "coordinate system id is too long".into(),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for RTreeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RTreeConfig")
            .field("dimension", &self.dimension)
            .field("max_fanout", &self.max_fanout)
            .field("min_fanout", &self.min_fanout())
            .field("splitter", &self.splitter.name())
            .field("crs", &self.crs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RTreeConfig::new(2);
        assert_eq!(config.dimension(), 2);
        assert_eq!(config.max_fanout(), DEFAULT_MAX_FANOUT);
        assert_eq!(config.min_fanout(), DEFAULT_MAX_FANOUT / 2);
        assert_eq!(config.crs(), None);
        assert_eq!(config.splitter().name(), "star");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_min_fanout() {
        assert_eq!(default_min_fanout(2), 1);
        assert_eq!(default_min_fanout(3), 1);
        assert_eq!(default_min_fanout(10), 5);
        assert_eq!(default_min_fanout(11), 5);
    }

    #[test]
    fn test_rejects_small_fanout() {
        let result = RTreeConfig::new(2).with_max_fanout(1).validate();
        assert!(matches!(result, Err(IndexError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_dimension() {
        let result = RTreeConfig::new(0).validate();
        assert!(matches!(result, Err(IndexError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_unsplittable_min_fanout() {
        let too_big = RTreeConfig::new(2).with_max_fanout(8).with_min_fanout(5);
        assert!(too_big.validate().is_err());

        let zero = RTreeConfig::new(2).with_max_fanout(8).with_min_fanout(0);
        assert!(zero.validate().is_err());

        let edge = RTreeConfig::new(2).with_max_fanout(9).with_min_fanout(5);
        assert!(edge.validate().is_ok());

        let huge = RTreeConfig::new(2).with_max_fanout(8).with_min_fanout(usize::MAX);
        assert!(matches!(huge.validate(), Err(IndexError::InvalidConfig(_))));
    }

    #[test]
    fn test_debug_names_strategy() {
        let config = RTreeConfig::new(2).with_crs("EPSG:4326");
        let debug = format!("{:?}", config);
        assert!(debug.contains("star"));
        assert!(debug.contains("EPSG:4326"));
    }
}
