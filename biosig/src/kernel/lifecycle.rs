use super::ConfigError;

/// Constructor validation lifecycle shared by kernel structs.
///
/// Every argument check happens in [`KernelLifecycle::try_new`], so a constructed kernel can
/// run on any data without failing on its own configuration again.
pub trait KernelLifecycle: Sized {
    /// Kernel config type.
    type Config;

    /// Construct a validated kernel from config.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;
}
