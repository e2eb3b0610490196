//! Build/runtime metadata stamped onto every event.

/// Values injected as the `os`, `arch` and `version` event params.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub os: String,
    pub arch: String,
    pub version: String,
}

impl Environment {
    pub fn new(os: impl Into<String>, arch: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
            version: version.into(),
        }
    }

    /// Target OS and architecture of this build plus the library version.
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH, crate::VERSION)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_reports_build_target() {
        let env = Environment::current();
        assert_eq!(env.os, std::env::consts::OS);
        assert_eq!(env.arch, std::env::consts::ARCH);
        assert_eq!(env.version, crate::VERSION);
    }
}
