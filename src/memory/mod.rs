//! Memory structure

pub mod region;

use region::MemoryRegion;

use crate::error::MemoryError;

pub const MEM_TEXT_BEGIN: u32 = 0x0040_0000;
pub const MEM_TEXT_SIZE: u32 = 0x0010_0000;
pub const MEM_DATA_BEGIN: u32 = 0x1000_0000;
pub const MEM_DATA_SIZE: u32 = 0x0010_0000;
pub const MEM_KDATA_BEGIN: u32 = 0x9000_0000;
pub const MEM_KDATA_SIZE: u32 = 0x0010_0000;
pub const MEM_KTEXT_BEGIN: u32 = 0x8000_0000;
pub const MEM_KTEXT_SIZE: u32 = 0x0010_0000;
pub const MEM_STACK_BEGIN: u32 = 0x7ff0_0000;
pub const MEM_STACK_SIZE: u32 = 0x0010_0000;

/// Memory interface implementation
pub trait StorageInterface {
    /// Read the little-endian word at `address`; unmapped addresses read 0
    fn read32(&self, address: u32) -> u32;

    /// Write a little-endian word; unmapped addresses are ignored
    fn write32(&mut self, address: u32, value: u32);

    /// Store words sequentially at 4-byte strides starting at `base`
    fn load_words(&mut self, words: &[u32], base: u32) {
        for (i, word) in words.iter().enumerate() {
            let address = base.wrapping_add(4 * i as u32);
            self.write32(address, *word);
        }
    }
}

/// Placement of a single named region
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionSpec {
    pub name: &'static str,
    pub begin: u32,
    pub size: u32,
}

impl RegionSpec {
    pub const fn new(name: &'static str, begin: u32, size: u32) -> Self {
        Self { name, begin, size }
    }
}

/// The fixed, ordered region table.
/// Lookup scans `text`, `data`, then `extra` in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryLayout {
    pub text: RegionSpec,
    pub data: RegionSpec,
    pub extra: Vec<RegionSpec>,
}

impl Default for MemoryLayout {
    fn default() -> Self {
        Self {
            text: RegionSpec::new("text", MEM_TEXT_BEGIN, MEM_TEXT_SIZE),
            data: RegionSpec::new("data", MEM_DATA_BEGIN, MEM_DATA_SIZE),
            extra: vec![
                RegionSpec::new("kdata", MEM_KDATA_BEGIN, MEM_KDATA_SIZE),
                RegionSpec::new("ktext", MEM_KTEXT_BEGIN, MEM_KTEXT_SIZE),
                RegionSpec::new("stack", MEM_STACK_BEGIN, MEM_STACK_SIZE),
            ],
        }
    }
}

impl MemoryLayout {
    pub fn specs(&self) -> impl Iterator<Item = &RegionSpec> {
        std::iter::once(&self.text)
            .chain(std::iter::once(&self.data))
            .chain(self.extra.iter())
    }

    /// Rejects empty, wrapping and overlapping regions
    pub fn validate(&self) -> Result<(), MemoryError> {
        let specs: Vec<&RegionSpec> = self.specs().collect();
        for spec in &specs {
            if spec.size == 0 || spec.begin.checked_add(spec.size - 1).is_none()
            {
                return Err(MemoryError::EmptyRegion {
                    name: spec.name,
                    begin: spec.begin,
                    end: spec.begin.wrapping_add(spec.size).wrapping_sub(1),
                });
            }
        }
        for (i, a) in specs.iter().enumerate() {
            for b in &specs[i + 1..] {
                let a_end = a.begin + (a.size - 1);
                let b_end = b.begin + (b.size - 1);
                if a.begin <= b_end && b.begin <= a_end {
                    return Err(MemoryError::Overlap(a.name, b.name));
                }
            }
        }
        Ok(())
    }

    /// Number of words the text region can hold
    pub fn text_capacity(&self) -> usize {
        (self.text.size / 4) as usize
    }
}

/// Segmented byte-addressable memory
#[derive(Clone, Debug)]
pub struct Memory {
    regions: Vec<MemoryRegion>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(&MemoryLayout::default())
    }
}

impl Memory {
    /// Allocate and zero-fill every region of the layout
    pub fn new(layout: &MemoryLayout) -> Self {
        let regions = layout
            .specs()
            .map(|spec| MemoryRegion::new(spec.name, spec.begin, spec.size))
            .collect();
        Self { regions }
    }

    /// The region owning the given address, if any
    pub fn region_of(&self, address: u32) -> Option<&MemoryRegion> {
        self.regions.iter().find(|region| region.contains(address))
    }

    fn region_of_mut(&mut self, address: u32) -> Option<&mut MemoryRegion> {
        self.regions.iter_mut().find(|region| region.contains(address))
    }

    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    /// Zero-fill the region owning `address`.
    /// Returns false if no region owns it.
    pub fn clear_region(&mut self, address: u32) -> bool {
        match self.region_of_mut(address) {
            Some(region) => {
                region.clear();
                true
            }
            None => false,
        }
    }

    /// Zero-fill all regions
    pub fn reset(&mut self) {
        self.regions.iter_mut().for_each(MemoryRegion::clear);
    }
}

impl StorageInterface for Memory {
    fn read32(&self, address: u32) -> u32 {
        self.region_of(address)
            .map_or(0, |region| region.read32(address))
    }

    fn write32(&mut self, address: u32, value: u32) {
        if let Some(region) = self.region_of_mut(address) {
            region.write32(address, value);
        }
    }
}
