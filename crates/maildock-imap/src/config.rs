//! Session configuration types.

use crate::fetch::ItemPolicy;

/// Default upper bound substituted for `*` in a UID FETCH range.
pub const DEFAULT_UNBOUNDED_RANGE_CAP: u32 = 10_000;

/// Per-session behaviour settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Upper bound used when a UID FETCH range ends in `*`.
    ///
    /// The range is not resolved against the real mailbox size.
    pub unbounded_range_cap: u32,
    /// Treatment of unrecognized FETCH data items.
    pub item_policy: ItemPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            unbounded_range_cap: DEFAULT_UNBOUNDED_RANGE_CAP,
            item_policy: ItemPolicy::Lenient,
        }
    }
}

impl SessionConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

/// Builder for session configuration.
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Sets the bound used for open-ended ranges.
    #[must_use]
    pub const fn unbounded_range_cap(mut self, cap: u32) -> Self {
        self.config.unbounded_range_cap = cap;
        self
    }

    /// Sets the unknown FETCH item policy.
    #[must_use]
    pub const fn item_policy(mut self, policy: ItemPolicy) -> Self {
        self.config.item_policy = policy;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub const fn build(self) -> SessionConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.unbounded_range_cap, 10_000);
        assert_eq!(config.item_policy, ItemPolicy::Lenient);
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::builder()
            .unbounded_range_cap(50)
            .item_policy(ItemPolicy::Strict)
            .build();
        assert_eq!(config.unbounded_range_cap, 50);
        assert_eq!(config.item_policy, ItemPolicy::Strict);
    }
}
