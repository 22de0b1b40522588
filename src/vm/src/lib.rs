pub mod cpu;
pub mod elf;
pub mod mem;
mod trap;

pub use {
    cpu::{Cpu, Exit, Registers, Status},
    mem::Memory,
    trap::Trap,
};
