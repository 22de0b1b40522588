use crate::trap::Trap;

pub const BASE: u32 = 0x8000_0000;
// 64k of guest memory
pub const SIZE: usize = 0x1_0000;

#[derive(Debug, Clone)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    pub fn new() -> Self {
        Self {
            bytes: vec![0; SIZE],
        }
    }

    fn range(
        &self,
        addr: u32,
        len: usize,
        fault: fn(u32) -> Trap,
    ) -> Result<std::ops::Range<usize>, Trap> {
        let offset = addr.wrapping_sub(BASE) as usize;
        match offset.checked_add(len) {
            Some(end) if end <= self.bytes.len() => Ok(offset..end),
            _ => Err(fault(addr)),
        }
    }

    pub fn slice(&self, addr: u32, len: usize) -> Result<&[u8], Trap> {
        Ok(&self.bytes[self.range(addr, len, Trap::LoadFault)?])
    }

    pub fn load(&mut self, addr: u32, data: &[u8]) -> Result<(), Trap> {
        let range = self.range(addr, data.len(), Trap::StoreFault)?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }

    pub fn read_u8(&self, addr: u32) -> Result<u8, Trap> {
        Ok(self.slice(addr, 1)?[0])
    }

    pub fn read_u16(&self, addr: u32) -> Result<u16, Trap> {
        let bytes = self.slice(addr, 2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&self, addr: u32) -> Result<u32, Trap> {
        let bytes = self.slice(addr, 4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn write_u8(&mut self, addr: u32, value: u8) -> Result<(), Trap> {
        self.load(addr, &[value])
    }

    pub fn write_u16(&mut self, addr: u32, value: u16) -> Result<(), Trap> {
        self.load(addr, &value.to_le_bytes())
    }

    pub fn write_u32(&mut self, addr: u32, value: u32) -> Result<(), Trap> {
        self.load(addr, &value.to_le_bytes())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_back_le_words() {
        let mut mem = Memory::new();
        mem.write_u32(BASE + 8, 0x0102_0304).unwrap();
        assert_eq!(mem.read_u32(BASE + 8).unwrap(), 0x0102_0304);
        assert_eq!(mem.read_u8(BASE + 8).unwrap(), 0x04);
        assert_eq!(mem.read_u16(BASE + 10).unwrap(), 0x0102);
    }

    #[test]
    fn faults_outside_the_window() {
        let mut mem = Memory::new();
        assert!(matches!(mem.read_u32(0), Err(Trap::LoadFault(0))));
        assert!(matches!(
            mem.read_u32(BASE + SIZE as u32 - 2),
            Err(Trap::LoadFault(_)),
        ));
        assert!(matches!(
            mem.write_u8(BASE.wrapping_sub(1), 0),
            Err(Trap::StoreFault(_)),
        ));
    }
}
