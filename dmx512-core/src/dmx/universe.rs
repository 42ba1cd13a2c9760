//! DMX512 channel buffer

/// Number of channels in one universe
pub const CHANNEL_COUNT: usize = 512;

/// Errors from universe access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmxError {
    /// Channel number outside 1..=512
    InvalidChannel(u16),
}

/// One DMX512 universe: 512 one-byte channel values
///
/// Channels are numbered from 1 as on a lighting desk; channel `n` lives in
/// slot `n - 1` and is transmitted as the `n`-th byte after the start code.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmxUniverse {
    slots: [u8; CHANNEL_COUNT],
}

impl Default for DmxUniverse {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for DmxUniverse {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let active = self.slots.iter().filter(|&&v| v != 0).count();
        f.debug_struct("DmxUniverse")
            .field("active_channels", &active)
            .finish()
    }
}

impl DmxUniverse {
    /// Universe with every channel at zero
    pub const fn new() -> Self {
        Self {
            slots: [0; CHANNEL_COUNT],
        }
    }

    /// Universe from raw slot values (slot 0 = channel 1)
    pub const fn from_slots(slots: [u8; CHANNEL_COUNT]) -> Self {
        Self { slots }
    }

    fn index(channel: u16) -> Result<usize, DmxError> {
        match channel {
            1..=512 => Ok(channel as usize - 1),
            _ => Err(DmxError::InvalidChannel(channel)),
        }
    }

    /// Value of `channel` (1..=512)
    pub fn get(&self, channel: u16) -> Result<u8, DmxError> {
        Self::index(channel).map(|i| self.slots[i])
    }

    /// Set `channel` (1..=512) to `value`
    pub fn set(&mut self, channel: u16, value: u8) -> Result<(), DmxError> {
        let i = Self::index(channel)?;
        self.slots[i] = value;
        Ok(())
    }

    /// Copy `values` into consecutive channels starting at `first_channel`
    ///
    /// Nothing is written if the range does not fit in the universe.
    pub fn set_range(&mut self, first_channel: u16, values: &[u8]) -> Result<(), DmxError> {
        let start = Self::index(first_channel)?;
        let end = start + values.len();
        if end > CHANNEL_COUNT {
            // Report the first channel that falls outside the universe
            return Err(DmxError::InvalidChannel(CHANNEL_COUNT as u16 + 1));
        }
        self.slots[start..end].copy_from_slice(values);
        Ok(())
    }

    /// Set every channel to `value`
    pub fn fill(&mut self, value: u8) {
        self.slots.fill(value);
    }

    /// Set every channel to zero (blackout)
    pub fn clear(&mut self) {
        self.fill(0);
    }

    /// Slot values in transmission order
    pub fn slots(&self) -> &[u8; CHANNEL_COUNT] {
        &self.slots
    }

    /// Mutable slot values in transmission order
    pub fn slots_mut(&mut self) -> &mut [u8; CHANNEL_COUNT] {
        &mut self.slots
    }
}
