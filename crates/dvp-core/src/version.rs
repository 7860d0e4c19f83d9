//! API version constants shared by the tooling.

use std::fmt;

/// Version of the virtualization platform API the generated plugins target.
pub const VIRTUALIZATION_API_VERSION: &str = "1.6.0";

/// Engine API version sent when logging in to a remote engine.
pub const ENGINE_API_VERSION: ApiVersion = ApiVersion {
    major: 1,
    minor: 11,
    micro: 0,
};

/// A `major.minor.micro` API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_api_version_display() {
        assert_eq!(ENGINE_API_VERSION.to_string(), "1.11.0");
    }

    #[test]
    fn versions_order_numerically() {
        let older = ApiVersion { major: 1, minor: 9, micro: 3 };
        assert!(older < ENGINE_API_VERSION);
    }
}
