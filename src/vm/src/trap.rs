use thiserror::Error;

#[derive(Debug, Error)]
pub enum Trap {
    #[error("load from unmapped address {0:#010x}")]
    LoadFault(u32),

    #[error("store to unmapped address {0:#010x}")]
    StoreFault(u32),

    #[error("illegal instruction {word:#010x} at pc {pc:#010x}")]
    IllegalInstruction { word: u32, pc: u32 },

    #[error("unsupported ecall {number}")]
    UnsupportedEcall { number: u32 },

    #[error("test case {case} failed")]
    TestFailure { case: u32 },

    #[error("breakpoint at pc {pc:#010x}")]
    Breakpoint { pc: u32 },

    #[error("guest write failed: {0}")]
    Io(#[from] std::io::Error),
}
