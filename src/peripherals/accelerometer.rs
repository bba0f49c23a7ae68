//! Accelerometer module for PineTime
//!
//! Minimal BMA421 bring-up: ±2 g at 100 Hz, raw samples only. Steps are
//! counted in software from these samples.

use embassy_nrf::twim::{self, Twim};
use embassy_time::Timer;
use pinetime_watchface::pedometer::AccelSample;

const ADDRESS: u8 = 0x18;

const REG_CHIP_ID: u8 = 0x00;
const REG_DATA_8: u8 = 0x12; // ACC_X_LSB .. ACC_Z_MSB
const REG_ACC_CONF: u8 = 0x40;
const REG_ACC_RANGE: u8 = 0x41;
const REG_PWR_CONF: u8 = 0x7C;
const REG_PWR_CTRL: u8 = 0x7D;
const REG_CMD: u8 = 0x7E;

const CHIP_ID: u8 = 0x11;
const CMD_SOFT_RESET: u8 = 0xB6;
/// Performance mode, 4 sample average, 100 Hz
const ACC_CONF_100HZ: u8 = 0xA8;
const ACC_RANGE_2G: u8 = 0x00;
const PWR_CTRL_ACC_EN: u8 = 0x04;

#[derive(Debug, defmt::Format)]
pub enum Error {
    Bus(twim::Error),
    BadChipId(u8),
}

impl From<twim::Error> for Error {
    fn from(err: twim::Error) -> Self {
        Error::Bus(err)
    }
}

pub struct Accelerometer<'a, T>
where
    T: twim::Instance,
{
    i2c: Twim<'a, T>,
}

impl<'a, T> Accelerometer<'a, T>
where
    T: twim::Instance,
{
    /// Reset the sensor and start continuous sampling
    pub async fn init(i2c: Twim<'a, T>) -> Result<Self, Error> {
        let mut accel = Self { i2c };

        // The sensor does not acknowledge the reset command itself
        let _ = accel.write_reg(REG_CMD, CMD_SOFT_RESET).await;
        Timer::after_millis(2).await;

        let chip_id = accel.read_reg(REG_CHIP_ID).await?;
        if chip_id != CHIP_ID {
            return Err(Error::BadChipId(chip_id));
        }

        // Leave advanced power save before touching the configuration
        accel.write_reg(REG_PWR_CONF, 0x00).await?;
        Timer::after_micros(450).await;

        accel.write_reg(REG_ACC_CONF, ACC_CONF_100HZ).await?;
        accel.write_reg(REG_ACC_RANGE, ACC_RANGE_2G).await?;
        accel.write_reg(REG_PWR_CTRL, PWR_CTRL_ACC_EN).await?;

        defmt::info!("BMA421 ready");
        Ok(accel)
    }

    /// Latest acceleration, in counts of 1/1024 g
    pub async fn read_sample(&mut self) -> Result<AccelSample, Error> {
        let reg = [REG_DATA_8];
        let mut buf = [0u8; 6];
        self.i2c.write_read(ADDRESS, &reg, &mut buf).await?;

        // 12 bit values, left aligned in the 16 bit register pair
        let axis = |lsb: u8, msb: u8| i16::from_le_bytes([lsb, msb]) >> 4;
        Ok(AccelSample::new(
            axis(buf[0], buf[1]),
            axis(buf[2], buf[3]),
            axis(buf[4], buf[5]),
        ))
    }

    async fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Error> {
        // EasyDMA only reads from RAM, keep the buffer on the stack
        let buf = [reg, value];
        self.i2c.write(ADDRESS, &buf).await?;
        Ok(())
    }

    async fn read_reg(&mut self, reg: u8) -> Result<u8, Error> {
        let reg = [reg];
        let mut out = [0u8];
        self.i2c.write_read(ADDRESS, &reg, &mut out).await?;
        Ok(out[0])
    }
}
