#![allow(dead_code)]

pub use mmc56x3::{Error, Mmc56x3, MmcConfig, NullLog, ADDRESS};

use embedded_hal_mock as hal;
pub use hal::delay::MockNoop;
pub use hal::i2c::{Mock as I2cMock, Transaction as I2cTrans};

pub const OUT_X_L: u8 = 0x00;
pub const OUT_TEMP: u8 = 0x09;
pub const STATUS1: u8 = 0x18;
pub const ODR: u8 = 0x1A;
pub const CTRL0: u8 = 0x1B;
pub const CTRL1: u8 = 0x1C;
pub const CTRL2: u8 = 0x1D;
pub const PRODUCT_ID: u8 = 0x39;

pub const MEAS_M_DONE: u8 = 0x40;
pub const MEAS_T_DONE: u8 = 0x80;

pub type Driver = Mmc56x3<I2cMock, MockNoop>;

pub fn write(reg: u8, value: u8) -> I2cTrans {
    I2cTrans::write(ADDRESS, vec![reg, value])
}

pub fn read(reg: u8, value: u8) -> I2cTrans {
    I2cTrans::write_read(ADDRESS, vec![reg], vec![value])
}

pub fn trans_product_id(id: u8) -> I2cTrans {
    read(PRODUCT_ID, id)
}

pub fn trans_set_reset() -> Vec<I2cTrans> {
    vec![write(CTRL0, 0x08), write(CTRL0, 0x10)]
}

/// Everything `new` does against a healthy chip
pub fn trans_init() -> Vec<I2cTrans> {
    let mut t = vec![trans_product_id(0x10), write(CTRL1, 0x80)];
    t.extend(trans_set_reset());
    t.push(write(CTRL2, 0x00));
    t
}

/// Packs three 20 bit samples the way the chip lays them out
pub fn encode_xyz(x: u32, y: u32, z: u32) -> Vec<u8> {
    let hi = |v: u32| (v >> 12) as u8;
    let mid = |v: u32| (v >> 4) as u8;
    let lo = |v: u32| ((v & 0x0F) << 4) as u8;
    vec![hi(x), mid(x), hi(y), mid(y), hi(z), mid(z), lo(x), lo(y), lo(z)]
}

pub fn trans_xyz(x: u32, y: u32, z: u32) -> I2cTrans {
    I2cTrans::write_read(ADDRESS, vec![OUT_X_L], encode_xyz(x, y, z))
}

/// One precise calibration measurement: trigger, done flag, burst read
pub fn trans_cal_measurement(x: u32, y: u32, z: u32) -> Vec<I2cTrans> {
    vec![write(CTRL0, 0x01), read(STATUS1, MEAS_M_DONE), trans_xyz(x, y, z)]
}

pub fn new_driver(expectations: &[I2cTrans]) -> (Driver, I2cMock) {
    let mut all = trans_init();
    all.extend_from_slice(expectations);
    let i2c = I2cMock::new(&all);
    let driver = Mmc56x3::new(i2c.clone(), MockNoop::new(), ADDRESS, 42, &mut NullLog)
        .expect("init");
    (driver, i2c)
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!((actual - expected).abs() < 1e-3,
            "expected {}, got {}",
            expected,
            actual);
}
