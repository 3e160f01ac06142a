mod common;

use common::*;
use mmc56x3::Bandwidth;

#[test]
fn continuous_mode_toggles() {
    let (mut driver, mut i2c) = new_driver(&[write(CTRL0, 0x80),
                                             write(CTRL2, 0x10),
                                             write(CTRL2, 0x00)]);
    driver.set_continuous_mode(true).unwrap();
    assert!(driver.is_continuous_mode());
    driver.set_continuous_mode(false).unwrap();
    assert!(!driver.is_continuous_mode());
    i2c.done();
}

#[test]
fn frequency_enable_stays_latched_until_reset() {
    let mut expectations = vec![write(CTRL0, 0x80), write(CTRL2, 0x10), write(CTRL2, 0x00)];
    expectations.push(write(CTRL1, 0x80));
    expectations.extend(trans_set_reset());
    expectations.push(write(CTRL2, 0x00));
    let (mut driver, mut i2c) = new_driver(&expectations);

    driver.set_continuous_mode(true).unwrap();
    driver.set_continuous_mode(false).unwrap();
    assert!(driver.is_frequency_latched());

    driver.reset().unwrap();
    assert!(!driver.is_frequency_latched());
    i2c.done();
}

#[test]
fn max_data_rate_sets_high_power() {
    let (mut driver, mut i2c) = new_driver(&[write(ODR, 255), write(CTRL2, 0x80)]);
    driver.set_data_rate(1000).unwrap();
    assert_eq!(driver.data_rate(), 1000);
    assert_eq!(driver.ctrl2(), 0x80);
    i2c.done();
}

#[test]
fn low_data_rate_clears_high_power() {
    let (mut driver, mut i2c) = new_driver(&[write(ODR, 255),
                                             write(CTRL2, 0x80),
                                             write(ODR, 50),
                                             write(CTRL2, 0x00)]);
    driver.set_data_rate(1000).unwrap();
    driver.set_data_rate(50).unwrap();
    assert_eq!(driver.data_rate(), 50);
    assert_eq!(driver.ctrl2(), 0x00);
    i2c.done();
}

#[test]
fn data_rate_above_255_is_clamped_to_max() {
    let (mut driver, mut i2c) = new_driver(&[write(ODR, 255), write(CTRL2, 0x80)]);
    driver.set_data_rate(300).unwrap();
    assert_eq!(driver.data_rate(), 1000);
    i2c.done();
}

#[test]
fn data_rate_keeps_continuous_bit() {
    let (mut driver, mut i2c) = new_driver(&[write(CTRL0, 0x80),
                                             write(CTRL2, 0x10),
                                             write(ODR, 255),
                                             write(CTRL2, 0x90)]);
    driver.set_continuous_mode(true).unwrap();
    driver.set_data_rate(u16::MAX).unwrap();
    assert!(driver.is_continuous_mode());
    assert_eq!(driver.ctrl2(), 0x90);
    i2c.done();
}

#[test]
fn bandwidth_reads_back_what_was_written() {
    let (mut driver, mut i2c) = new_driver(&[write(CTRL1, 0x02), write(CTRL1, 0x01)]);
    assert_eq!(driver.bandwidth(), Bandwidth::_6_6_ms);
    driver.set_bandwidth(Bandwidth::_2_0_ms).unwrap();
    assert_eq!(driver.bandwidth(), Bandwidth::_2_0_ms);
    driver.set_bandwidth(Bandwidth::_3_5_ms).unwrap();
    assert_eq!(driver.bandwidth(), Bandwidth::_3_5_ms);
    i2c.done();
}
