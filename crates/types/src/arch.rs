//! Target architecture names
//!
//! The canonical strings here are the on-disk contract: build and
//! install directory names embed them, and external scripts key on
//! those names. They must stay stable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A target CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 32-bit Intel.
    X86,
    /// 64-bit Intel.
    #[serde(rename = "x86_64")]
    X86_64,
    /// 32-bit ARM.
    Arm,
    /// 64-bit ARM.
    Aarch64,
}

impl Arch {
    /// Canonical directory-name component.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86 => "i686",
            Self::X86_64 => "x86_64",
            Self::Arm => "arm",
            Self::Aarch64 => "aarch64",
        }
    }

    /// Whether this architecture is 64-bit.
    #[must_use]
    pub fn is_64bit(&self) -> bool {
        matches!(self, Self::X86_64 | Self::Aarch64)
    }

    /// Classify the machine field of `cc -dumpmachine` output
    /// (e.g. `aarch64-poky-linux` -> `Aarch64`).
    #[must_use]
    pub fn from_machine(machine: &str) -> Option<Self> {
        let cpu = machine.split('-').next().unwrap_or(machine);
        if cpu == "aarch64" || cpu == "arm64" {
            Some(Self::Aarch64)
        } else if cpu.starts_with("arm") {
            Some(Self::Arm)
        } else if cpu == "x86_64" || cpu == "amd64" {
            Some(Self::X86_64)
        } else if cpu == "i386" || cpu == "i486" || cpu == "i586" || cpu == "i686" {
            Some(Self::X86)
        } else {
            None
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_classification() {
        assert_eq!(Arch::from_machine("aarch64-poky-linux"), Some(Arch::Aarch64));
        assert_eq!(Arch::from_machine("armv7l-linux-gnueabihf"), Some(Arch::Arm));
        assert_eq!(Arch::from_machine("x86_64-pc-linux-gnu"), Some(Arch::X86_64));
        assert_eq!(Arch::from_machine("i686-w64-mingw32"), Some(Arch::X86));
        assert_eq!(Arch::from_machine("riscv64-unknown-linux"), None);
    }

    #[test]
    fn bitness() {
        assert!(Arch::X86_64.is_64bit());
        assert!(Arch::Aarch64.is_64bit());
        assert!(!Arch::X86.is_64bit());
        assert!(!Arch::Arm.is_64bit());
    }
}
