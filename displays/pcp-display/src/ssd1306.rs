//! SSD1306 OLED Display Driver
//!
//! Driver for 128x64 SSD1306-based OLED displays via I2C, in page
//! addressing mode. Drawing happens in a [`Framebuffer`]; the driver only
//! initialises the panel and copies finished frames to it.

use embedded_hal_async::i2c::I2c;

use crate::framebuffer::{Framebuffer, PAGES, WIDTH};

/// SSD1306 I2C address (0x3C, or 0x3D with the address pin high)
pub const SSD1306_ADDR: u8 = 0x3C;

/// Control byte: the rest of the write is one command
const CONTROL_COMMAND: u8 = 0x00;
/// Control byte: the rest of the write is display data
const CONTROL_DATA: u8 = 0x40;

/// SSD1306 commands
#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const RESUME_RAM: u8 = 0xA4;
}

/// Power-up command sequence
const INIT_SEQUENCE: &[u8] = &[
    cmd::DISPLAY_OFF,
    cmd::SET_CLOCK_DIV,
    0x80, // Default clock
    cmd::SET_MUX_RATIO,
    0x3F, // 64 lines
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::SET_CHARGE_PUMP,
    0x14, // Internal charge pump
    cmd::SET_MEMORY_MODE,
    0x02, // Page addressing
    cmd::SET_SEG_REMAP,    // Flip horizontally
    cmd::SET_COM_SCAN_DEC, // Flip vertically
    cmd::SET_COM_PINS,
    0x12, // Alternative COM config
    cmd::SET_CONTRAST,
    0xCF,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::RESUME_RAM,
    cmd::SET_NORMAL,
    cmd::DISPLAY_ON,
];

/// SSD1306 OLED driver
pub struct Ssd1306<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Ssd1306<I2C> {
    /// Create a driver at the default address
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, SSD1306_ADDR)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Initialize the display
    pub async fn init(&mut self) -> Result<(), I2C::Error> {
        for &c in INIT_SEQUENCE {
            self.command(c).await?;
        }
        Ok(())
    }

    /// Send a command to the display
    async fn command(&mut self, cmd: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[CONTROL_COMMAND, cmd]).await
    }

    /// Copy a frame to the display
    pub async fn flush(&mut self, frame: &Framebuffer) -> Result<(), I2C::Error> {
        for page in 0..PAGES {
            self.command(cmd::SET_PAGE_ADDR | page as u8).await?;
            self.command(cmd::SET_LOW_COLUMN).await?;
            self.command(cmd::SET_HIGH_COLUMN).await?;

            let mut data = [0u8; WIDTH + 1];
            data[0] = CONTROL_DATA;
            data[1..].copy_from_slice(&frame.pages()[page]);
            self.i2c.write(self.address, &data).await?;
        }
        Ok(())
    }

    /// Set display contrast (0-255)
    pub async fn set_contrast(&mut self, contrast: u8) -> Result<(), I2C::Error> {
        self.command(cmd::SET_CONTRAST).await?;
        self.command(contrast).await
    }

    /// Turn display on/off
    pub async fn set_display_on(&mut self, on: bool) -> Result<(), I2C::Error> {
        if on {
            self.command(cmd::DISPLAY_ON).await
        } else {
            self.command(cmd::DISPLAY_OFF).await
        }
    }

    /// Release the bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::{ErrorType, Operation};
    use pcp_hal::{Point, Surface};
    use std::vec::Vec;

    /// Records every write as (address, bytes)
    #[derive(Default)]
    struct FakeBus {
        writes: Vec<(u8, Vec<u8>)>,
    }

    impl ErrorType for FakeBus {
        type Error = Infallible;
    }

    impl I2c for FakeBus {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_init_sends_commands() {
        let mut display = Ssd1306::new(FakeBus::default());
        block_on(display.init()).unwrap();
        let bus = display.release();

        assert_eq!(bus.writes.len(), INIT_SEQUENCE.len());
        assert!(bus.writes.iter().all(|(addr, w)| *addr == 0x3C && w[0] == 0x00));
        assert_eq!(bus.writes.first().unwrap().1, [0x00, 0xAE]);
        assert_eq!(bus.writes.last().unwrap().1, [0x00, 0xAF]);
    }

    #[test]
    fn test_flush_writes_pages() {
        let mut frame = Framebuffer::new();
        frame.fill_region(pcp_hal::Rect::new(0, 8, 1, 8), true);
        frame.copy_region(pcp_hal::Rect::new(0, 8, 1, 8), Point::new(127, 8));

        let mut display = Ssd1306::with_address(FakeBus::default(), 0x3D);
        block_on(display.flush(&frame)).unwrap();
        let bus = display.release();

        // Three addressing commands and one data write per page
        assert_eq!(bus.writes.len(), PAGES * 4);
        let page1: Vec<_> = bus.writes[4..8].iter().map(|(_, w)| w.clone()).collect();
        assert_eq!(page1[0], [0x00, 0xB1]);
        assert_eq!(page1[1], [0x00, 0x00]);
        assert_eq!(page1[2], [0x00, 0x10]);
        let data = &page1[3];
        assert_eq!(data.len(), WIDTH + 1);
        assert_eq!(data[0], 0x40);
        assert_eq!(data[1], 0xFF);
        assert_eq!(data[128], 0xFF);
        assert!(data[2..128].iter().all(|&b| b == 0));
        assert!(bus.writes.iter().all(|(addr, _)| *addr == 0x3D));
    }
}
