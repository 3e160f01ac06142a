pub(crate) trait RegisterBits {
    fn mask() -> u8;
    fn value(&self) -> u8;
}

/// Magnetometer measurement bandwidth (time of a single measurement)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum Bandwidth {
    /// 6.6 ms
    _6_6_ms = 0x00,
    /// 3.5 ms
    _3_5_ms = 0x01,
    /// 2.0 ms
    _2_0_ms = 0x02,
    /// 1.2 ms
    _1_2_ms = 0x03,
}

impl Default for Bandwidth {
    fn default() -> Self {
        Bandwidth::_6_6_ms
    }
}

impl RegisterBits for Bandwidth {
    fn mask() -> u8 {
        Bandwidth::_1_2_ms.value()
    }

    fn value(&self) -> u8 {
        *self as u8
    }
}

impl Bandwidth {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & Self::mask() {
            0x00 => Bandwidth::_6_6_ms,
            0x01 => Bandwidth::_3_5_ms,
            0x02 => Bandwidth::_2_0_ms,
            _ => Bandwidth::_1_2_ms,
        }
    }
}

/// Number of status polls before a measurement is declared stalled
pub const DEFAULT_MAX_POLLS: u16 = 100;

/// Configuration of Mmc56x3
#[derive(Copy, Clone, Debug, Default)]
pub struct MmcConfig {
    pub(crate) data_rate: Option<u16>,
    pub(crate) bandwidth: Option<Bandwidth>,
    pub(crate) continuous: Option<bool>,
    pub(crate) max_polls: Option<u16>,
}

impl MmcConfig {
    /// Creates an empty configuration; the chip stays in its post-reset
    /// state (one-shot, data rate 0, [`Bandwidth::_6_6_ms`]).
    ///
    /// [`Bandwidth::_6_6_ms`]: ./enum.Bandwidth.html
    pub fn new() -> Self {
        MmcConfig { data_rate: None,
                    bandwidth: None,
                    continuous: None,
                    max_polls: None, }
    }

    /// Sets output data rate, 0-255 or 1000 (see `Mmc56x3::set_data_rate`)
    pub fn data_rate(&mut self, data_rate: u16) -> &mut Self {
        self.data_rate = Some(data_rate);
        self
    }

    /// Sets measurement bandwidth ([`Bandwidth`])
    ///
    /// [`Bandwidth`]: ./enum.Bandwidth.html
    pub fn bandwidth(&mut self, bandwidth: Bandwidth) -> &mut Self {
        self.bandwidth = Some(bandwidth);
        self
    }

    /// Starts in continuous (`true`) or one-shot (`false`) mode
    pub fn continuous(&mut self, continuous: bool) -> &mut Self {
        self.continuous = Some(continuous);
        self
    }

    /// Sets how many times a status flag is polled before giving up;
    /// the flag is always polled at least once
    pub fn max_polls(&mut self, max_polls: u16) -> &mut Self {
        self.max_polls = Some(max_polls);
        self
    }
}
