use std::fmt;

use serde::{Deserialize, Serialize};

/// Instruction set family of a compilation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arch {
    /// 64-bit x86 host.
    X86,
    /// 64-bit ARM host.
    Arm,
    /// NVIDIA GPU.
    NvGpu,
}

/// Device descriptor shared by every rule and the cost model of a tuning task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Instruction set family.
    pub arch: Arch,
    /// Native word width in bits.
    #[serde(default = "default_bits")]
    pub bits: u32,
    /// Maximum threads per block (GPU) or hardware threads (host).
    #[serde(default = "default_max_threads")]
    pub max_threads: u32,
}

fn default_bits() -> u32 {
    64
}

fn default_max_threads() -> u32 {
    1024
}

impl Target {
    /// Default x86 host target.
    pub fn host() -> Self {
        Self {
            arch: Arch::X86,
            bits: default_bits(),
            max_threads: default_max_threads(),
        }
    }

    /// Default NVIDIA GPU target.
    pub fn nvgpu() -> Self {
        Self {
            arch: Arch::NvGpu,
            bits: default_bits(),
            max_threads: default_max_threads(),
        }
    }

    /// Returns true for GPU targets.
    pub fn is_gpu(&self) -> bool {
        matches!(self.arch, Arch::NvGpu)
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::host()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arch = match self.arch {
            Arch::X86 => "x86",
            Arch::Arm => "arm",
            Arch::NvGpu => "nvgpu",
        };
        write!(f, "{arch}-{}bit", self.bits)
    }
}
