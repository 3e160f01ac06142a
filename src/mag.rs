/// Default (and only) I2C address of the MMC56x3
pub const ADDRESS: u8 = 0x30;

/// Expected content of `PRODUCT_ID`
pub const CHIP_ID: u8 = 0x10;

#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug)]
pub enum Register {
    OUT_X_L = 0x00,
    OUT_TEMP = 0x09,
    STATUS1 = 0x18,
    ODR = 0x1A,
    // write only
    CTRL0 = 0x1B,
    CTRL1 = 0x1C,
    CTRL2 = 0x1D,
    PRODUCT_ID = 0x39,
}

impl Register {
    pub fn addr(&self) -> u8 {
        *self as u8
    }
}

// STATUS1
pub const MEAS_M_DONE: u8 = 1 << 6;
pub const MEAS_T_DONE: u8 = 1 << 7;

// CTRL0
pub const TM_M: u8 = 0x01;
pub const TM_T: u8 = 0x02;
pub const DO_SET: u8 = 0x08;
pub const DO_RESET: u8 = 0x10;
pub const CMM_FREQ_EN: u8 = 0x80;

// CTRL1
pub const CAL_CTRL1: u8 = 0x20;
pub const SW_RESET: u8 = 0x80;

// CTRL2
pub const CMM_EN: u8 = 0x10;
pub const HPOWER: u8 = 0x80;
