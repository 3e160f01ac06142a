//! A platform agnostic driver to interface with the MMC5603 / MMC5613
//! (3-axis magnetometer)
//!
//! This driver was built using [`embedded-hal`] traits.
//!
//! Readings are corrected with a bias estimated by [`Mmc56x3::calibrate`]
//! (the SET/RESET bridge offset technique) and scaled to microtesla.
//! Calibration lives in RAM only; run it again after every power cycle.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`Mmc56x3::calibrate`]: ./struct.Mmc56x3.html#method.calibrate

#![deny(missing_docs)]
#![cfg_attr(not(test), no_std)]

extern crate cast;
extern crate embedded_hal as hal;
extern crate generic_array;
extern crate nalgebra;

mod conf;
mod mag;
mod sensor;

use core::fmt;
use core::mem;

use cast::{f32, i32, u8};
use generic_array::typenum::consts::*;
use generic_array::{ArrayLength, GenericArray};

pub use nalgebra::Vector3;

pub use conf::{Bandwidth, MmcConfig, DEFAULT_MAX_POLLS};
pub use mag::ADDRESS;
pub use sensor::{MagneticEvent, SensorDescriptor, SensorType};

use conf::RegisterBits;
use hal::blocking::delay::{DelayMs, DelayUs};
use hal::blocking::i2c::{Write, WriteRead};
use mag::Register;

// uT per LSB, 20 bit output
const MAG_RESOLUTION: f32 = 0.00625;
// +/- 30 gauss
const MAG_RANGE: f32 = 3000.0;

const TEMP_RESOLUTION: f32 = 0.8;
const TEMP_ZERO_OFFSET: f32 = -75.0;

const MAX_DATA_RATE: u16 = 1000;

const RESET_SETTLE_MS: u8 = 20;
const SET_RESET_PULSE_MS: u8 = 1;
// SET / RESET takes 375us
const SET_RESET_US: u16 = 500;
// measurement at the slowest bandwidth
const MEASUREMENT_US: u16 = 6600;
const CALIBRATION_POLL_MS: u8 = 1;
const POLL_MS: u8 = 5;

/// Driver errors
#[derive(Debug)]
pub enum Error<E> {
    /// I2C bus error
    Bus(E),
    /// `PRODUCT_ID` did not match; carries the value read
    InvalidDevice(u8),
    /// Measurement done flag never showed up within the poll limit
    MeasurementTimeout,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::Bus(error)
    }
}

/// Log sink that drops everything
pub struct NullLog;

impl fmt::Write for NullLog {
    fn write_str(&mut self, _s: &str) -> fmt::Result {
        Ok(())
    }
}

/// MMC56x3 driver
pub struct Mmc56x3<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    sensor_id: i32,
    raw: Vector3<i32>,
    bias: Vector3<i32>,
    // mirrors of the last values written to the chip
    ctrl1: u8,
    ctrl2: u8,
    odr: u16,
    // cmm_freq_en lives in write-only CTRL0; only a soft reset clears it
    freq_latched: bool,
    max_polls: u16,
}

impl<I2C, D, E> Mmc56x3<I2C, D>
    where I2C: WriteRead<Error = E> + Write<Error = E>,
          D: DelayMs<u8> + DelayUs<u16>
{
    /// Creates a new driver from a I2C peripheral, checks the chip identity
    /// and resets it into one-shot mode
    pub fn new<W: fmt::Write>(i2c: I2C,
                              delay: D,
                              address: u8,
                              sensor_id: i32,
                              l: &mut W)
                              -> Result<Self, Error<E>> {
        Self::with_config(i2c, delay, address, sensor_id, MmcConfig::new(), l)
    }

    /// Same as [`new`], then applies `config`
    ///
    /// [`new`]: #method.new
    pub fn with_config<W: fmt::Write>(i2c: I2C,
                                      delay: D,
                                      address: u8,
                                      sensor_id: i32,
                                      config: MmcConfig,
                                      l: &mut W)
                                      -> Result<Self, Error<E>> {
        let mut mmc56x3 =
            Mmc56x3 { i2c,
                      delay,
                      address,
                      sensor_id,
                      raw: Vector3::zeros(),
                      bias: Vector3::zeros(),
                      ctrl1: 0,
                      ctrl2: 0,
                      odr: 0,
                      freq_latched: false,
                      max_polls: config.max_polls
                                       .unwrap_or(DEFAULT_MAX_POLLS)
                                       .max(1), };

        let id = mmc56x3.read_register(Register::PRODUCT_ID)?;
        if id != mag::CHIP_ID {
            write!(l, "unexpected product id {:#04x}\r\n", id).ok();
            return Err(Error::InvalidDevice(id));
        }

        mmc56x3.reset()?;
        write!(l, "reset done\r\n").ok();

        if let Some(bandwidth) = config.bandwidth {
            mmc56x3.set_bandwidth(bandwidth)?;
        }
        if let Some(rate) = config.data_rate {
            mmc56x3.set_data_rate(rate)?;
            write!(l, "data rate {}\r\n", mmc56x3.data_rate()).ok();
        }
        if let Some(continuous) = config.continuous {
            mmc56x3.set_continuous_mode(continuous)?;
            write!(l, "continuous mode {}\r\n", continuous).ok();
        }

        Ok(mmc56x3)
    }

    /// Destroys the driver, giving back the I2C peripheral and the delay
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Soft resets the chip and forgets all cached register state
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        // SW_RESET self clears, so this is the one write the mirror skips
        self.write_register(Register::CTRL1, mag::SW_RESET)?;
        self.delay.delay_ms(RESET_SETTLE_MS);
        self.ctrl1 = 0;
        self.ctrl2 = 0;
        self.odr = 0;
        self.freq_latched = false;

        self.magnet_set_reset()?;
        self.set_continuous_mode(false)
    }

    /// Pulses large currents through the sense coils to clear any offset
    pub fn magnet_set_reset(&mut self) -> Result<(), Error<E>> {
        self.write_ctrl0(mag::DO_SET)?;
        self.delay.delay_ms(SET_RESET_PULSE_MS);
        self.write_ctrl0(mag::DO_RESET)?;
        self.delay.delay_ms(SET_RESET_PULSE_MS);
        Ok(())
    }

    /// Switches between continuous (`true`) and one-shot (`false`) mode
    ///
    /// Enabling also sets `cmm_freq_en`, which sits in a write-only register
    /// and cannot be cleared again without [`reset`]; see
    /// [`is_frequency_latched`].
    ///
    /// [`reset`]: #method.reset
    /// [`is_frequency_latched`]: #method.is_frequency_latched
    pub fn set_continuous_mode(&mut self, enabled: bool) -> Result<(), Error<E>> {
        let ctrl2 = if enabled {
            self.write_ctrl0(mag::CMM_FREQ_EN)?;
            self.ctrl2 | mag::CMM_EN
        } else {
            self.ctrl2 & !mag::CMM_EN
        };
        self.write_ctrl2(ctrl2)?;
        Ok(())
    }

    /// Whether the chip samples on its own; no bus access
    pub fn is_continuous_mode(&self) -> bool {
        self.ctrl2 & mag::CMM_EN != 0
    }

    /// Whether `cmm_freq_en` has been written since the last reset
    pub fn is_frequency_latched(&self) -> bool {
        self.freq_latched
    }

    /// Sets the output data rate, 0-255 Hz or 1000 Hz
    ///
    /// Anything above 255 selects 1000 Hz, which also turns on high power
    /// mode.
    pub fn set_data_rate(&mut self, rate: u16) -> Result<(), Error<E>> {
        let (odr, ctrl2) = match u8(rate) {
            Ok(odr) => (odr, self.ctrl2 & !mag::HPOWER),
            Err(_) => (u8::MAX, self.ctrl2 | mag::HPOWER),
        };
        self.write_register(Register::ODR, odr)?;
        self.odr = if rate > u16::from(u8::MAX) {
            MAX_DATA_RATE
        } else {
            rate
        };
        self.write_ctrl2(ctrl2)?;
        Ok(())
    }

    /// Data rate last requested with [`set_data_rate`] (after clamping)
    ///
    /// [`set_data_rate`]: #method.set_data_rate
    pub fn data_rate(&self) -> u16 {
        self.odr
    }

    /// Raw cached `CTRL2` byte
    pub fn ctrl2(&self) -> u8 {
        self.ctrl2
    }

    /// Sets the measurement bandwidth
    pub fn set_bandwidth(&mut self, bandwidth: Bandwidth) -> Result<(), Error<E>> {
        self.write_ctrl1_with_mask(bandwidth)?;
        Ok(())
    }

    /// Measurement bandwidth, from the cached `CTRL1`
    pub fn bandwidth(&self) -> Bandwidth {
        Bandwidth::from_bits(self.ctrl1)
    }

    /// Estimates the per-axis bias with the SET/RESET method
    ///
    /// Two full precision measurements are taken with opposite bridge
    /// polarity; the offset flips sign between them while the field does
    /// not, so their average is the bias. Stalled polls are reported to `l`.
    /// The previous mode and control registers are restored afterwards,
    /// also when a measurement fails; the old bias is then kept.
    pub fn calibrate<W: fmt::Write>(&mut self, l: &mut W) -> Result<(), Error<E>> {
        let old_ctrl1 = self.ctrl1;
        let old_ctrl2 = self.ctrl2;

        // restore runs even when a measurement stalls
        let bias = self.measure_bias(l);

        self.write_ctrl1(old_ctrl1)?;
        self.write_ctrl2(old_ctrl2)?;
        self.magnet_set_reset()?;
        let continuous = self.is_continuous_mode();
        self.set_continuous_mode(continuous)?;

        self.bias = bias?;
        Ok(())
    }

    /// Bias subtracted from every reading, in LSB
    pub fn bias(&self) -> Vector3<i32> {
        self.bias
    }

    /// Uncorrected sample from the last [`get_event`]
    ///
    /// [`get_event`]: #method.get_event
    pub fn raw(&self) -> Vector3<i32> {
        self.raw
    }

    /// Temperature sensor measurement in Celcius
    ///
    /// The chip cannot measure temperature in continuous mode; NaN is
    /// returned then, without touching the bus.
    pub fn read_temperature(&mut self) -> Result<f32, Error<E>> {
        if self.is_continuous_mode() {
            return Ok(core::f32::NAN);
        }

        self.write_ctrl0(mag::TM_T)?;
        self.wait_ready(mag::MEAS_T_DONE, POLL_MS, "temperature", &mut NullLog)?;
        let raw = self.read_register(Register::OUT_TEMP)?;
        Ok(f32(raw) * TEMP_RESOLUTION + TEMP_ZERO_OFFSET)
    }

    /// Magnetometer measurement, bias corrected, in microtesla
    ///
    /// In one-shot mode a measurement is triggered and waited for; in
    /// continuous mode the latest latched sample is read. `timestamp` is
    /// copied into the event as is.
    pub fn get_event(&mut self, timestamp: u32) -> Result<MagneticEvent, Error<E>> {
        if !self.is_continuous_mode() {
            self.write_ctrl0(mag::TM_M)?;
            self.wait_ready(mag::MEAS_M_DONE, POLL_MS, "magnetic", &mut NullLog)?;
        }

        self.raw = self.read_xyz()?;
        let field = self.raw - self.bias;

        let version = i32(mem::size_of::<MagneticEvent>()).unwrap_or(i32::MAX);
        Ok(MagneticEvent { version,
                           sensor_id: self.sensor_id,
                           sensor_type: SensorType::MagneticField,
                           timestamp,
                           magnetic: field.map(|v| f32(v) * MAG_RESOLUTION) })
    }

    /// Static sensor description
    pub fn get_sensor(&self) -> SensorDescriptor {
        SensorDescriptor { name: "MMC5603",
                           version: 1,
                           sensor_id: self.sensor_id,
                           sensor_type: SensorType::MagneticField,
                           max_value: MAG_RANGE,
                           min_value: -MAG_RANGE,
                           resolution: MAG_RESOLUTION,
                           min_delay: 0 }
    }

    fn measure_bias<W: fmt::Write>(&mut self, l: &mut W) -> Result<Vector3<i32>, Error<E>> {
        self.set_continuous_mode(false)?;

        self.write_ctrl0(mag::DO_SET)?;
        self.delay.delay_us(SET_RESET_US);
        // all axes, longest measurement time
        self.write_ctrl1(mag::CAL_CTRL1)?;
        let high = self.measure_precise("set", l)?;

        self.write_ctrl0(mag::DO_RESET)?;
        self.delay.delay_us(SET_RESET_US);
        let low = self.measure_precise("reset", l)?;

        Ok(midpoint(&high, &low))
    }

    fn measure_precise<W: fmt::Write>(&mut self,
                                      phase: &str,
                                      l: &mut W)
                                      -> Result<Vector3<i32>, Error<E>> {
        self.write_ctrl0(mag::TM_M)?;
        self.delay.delay_us(MEASUREMENT_US);
        self.wait_ready(mag::MEAS_M_DONE, CALIBRATION_POLL_MS, phase, l)?;
        Ok(self.read_xyz()?)
    }

    fn wait_ready<W: fmt::Write>(&mut self,
                                 flag: u8,
                                 interval_ms: u8,
                                 what: &str,
                                 l: &mut W)
                                 -> Result<(), Error<E>> {
        for _ in 0..self.max_polls {
            if self.read_register(Register::STATUS1)? & flag != 0 {
                return Ok(());
            }
            write!(l, "{}: not done reading\r\n", what).ok();
            self.delay.delay_ms(interval_ms);
        }

        write!(l, "{}: gave up after {} polls\r\n", what, self.max_polls).ok();
        Err(Error::MeasurementTimeout)
    }

    fn read_xyz(&mut self) -> Result<Vector3<i32>, E> {
        let buffer: GenericArray<u8, U9> = self.read_registers(Register::OUT_X_L)?;
        Ok(decode_xyz(&buffer))
    }

    fn write_ctrl0(&mut self, bits: u8) -> Result<(), E> {
        self.write_register(Register::CTRL0, bits)?;
        if bits & mag::CMM_FREQ_EN != 0 {
            self.freq_latched = true;
        }
        Ok(())
    }

    fn write_ctrl1_with_mask<RB>(&mut self, v: RB) -> Result<(), E>
        where RB: RegisterBits
    {
        let r = self.ctrl1;
        self.write_ctrl1((r & !RB::mask()) | v.value())
    }

    fn write_ctrl1(&mut self, byte: u8) -> Result<(), E> {
        self.write_register(Register::CTRL1, byte)?;
        self.ctrl1 = byte;
        Ok(())
    }

    fn write_ctrl2(&mut self, byte: u8) -> Result<(), E> {
        self.write_register(Register::CTRL2, byte)?;
        self.ctrl2 = byte;
        Ok(())
    }

    fn read_register(&mut self, reg: Register) -> Result<u8, E> {
        self.read_registers::<U1>(reg).map(|b| b[0])
    }

    fn read_registers<N>(&mut self,
                         reg: Register)
                         -> Result<GenericArray<u8, N>, E>
        where N: ArrayLength<u8>
    {
        let mut buffer: GenericArray<u8, N> = GenericArray::default();
        self.i2c.write_read(self.address, &[reg.addr()], &mut buffer)?;
        Ok(buffer)
    }

    fn write_register(&mut self, reg: Register, byte: u8) -> Result<(), E> {
        self.i2c.write(self.address, &[reg.addr(), byte])
    }
}

// 9 byte burst from OUT_X_L: 8 high + 8 mid bits per axis, then the low
// nibbles of x, y and z in the upper half of bytes 6..9
fn decode_xyz(buffer: &[u8]) -> Vector3<i32> {
    let axis = |hi: u8, mid: u8, lo: u8| (i32(hi) << 12) | (i32(mid) << 4) | (i32(lo) >> 4);
    Vector3::new(axis(buffer[0], buffer[1], buffer[6]),
                 axis(buffer[2], buffer[3], buffer[7]),
                 axis(buffer[4], buffer[5], buffer[8]))
}

fn midpoint(high: &Vector3<i32>, low: &Vector3<i32>) -> Vector3<i32> {
    (high + low).map(|v| v / 2)
}
