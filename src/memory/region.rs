//! A contiguous, zero-initialized block of simulated memory
//! covering an inclusive address range

/// Memory region
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryRegion {
    name: &'static str,
    begin: u32,
    end: u32,
    // data[i] stores the byte at begin + i
    data: Vec<u8>,
}

impl MemoryRegion {
    /// Make a zero-filled region of `size` bytes starting at `begin`.
    /// A region never extends past the top of the address space.
    pub fn new(name: &'static str, begin: u32, size: u32) -> Self {
        let end = begin.saturating_add(size.saturating_sub(1));
        let len = (end - begin) as usize + 1;
        Self { name, begin, end, data: vec![0; len] }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// First address of the region
    pub fn begin(&self) -> u32 {
        self.begin
    }

    /// Last address of the region (inclusive)
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Check if the address falls inside the region
    pub fn contains(&self, address: u32) -> bool {
        address >= self.begin && address <= self.end
    }

    fn offset(&self, address: u32) -> usize {
        address.wrapping_sub(self.begin) as usize
    }

    /// Get the byte at the given address.
    /// Bytes past the end of the region read as zero.
    pub fn get8(&self, address: u32) -> u8 {
        self.data.get(self.offset(address)).copied().unwrap_or(0)
    }

    /// Set the byte at the given address.
    /// Returns true iff the byte lies inside the region
    pub fn set8(&mut self, address: u32, byte: u8) -> bool {
        let offset = self.offset(address);
        match self.data.get_mut(offset) {
            Some(slot) if address >= self.begin => {
                *slot = byte;
                true
            }
            _ => false,
        }
    }

    /// Little-endian word read starting at `address`
    pub fn read32(&self, address: u32) -> u32 {
        (0..4u32).fold(0, |word, i| {
            word | (self.get8(address.wrapping_add(i)) as u32) << (8 * i)
        })
    }

    /// Little-endian word write starting at `address`
    pub fn write32(&mut self, address: u32, value: u32) {
        for i in 0..4u32 {
            let byte = (value >> (8 * i)) as u8;
            self.set8(address.wrapping_add(i), byte);
        }
    }

    /// Zero-fill the region
    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}
