use {
    crate::mem::Memory,
    anyhow::Result,
    object::{Object, ObjectSegment},
};

pub const MAGIC: &[u8] = b"\x7fELF";

/// Copies every loadable segment into guest memory and returns the entry
/// point.
pub fn load(mem: &mut Memory, data: &[u8]) -> Result<u32> {
    let file = object::File::parse(data)?;
    for segment in file.segments() {
        let data = segment.data()?;
        if data.is_empty() {
            continue;
        }
        mem.load(segment.address() as u32, data)?;
    }
    Ok(file.entry() as u32)
}
