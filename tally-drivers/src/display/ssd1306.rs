//! SSD1306 OLED count display
//!
//! Driver for 128x32 SSD1306-based OLED panels via I2C. Text is drawn
//! into a RAM frame with `embedded-graphics` and sent to the panel one
//! page (8 pixel rows) at a time.

use core::convert::Infallible;

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use embedded_hal_async::i2c::I2c;
use tally_core::screen::{CountScreen, Line};
use tally_core::traits::{CountDisplay, DisplayError, Snapshot};

/// Default 7-bit I2C address (0x3D with SA0 pulled high)
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Display dimensions
pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 32;
const PAGES: usize = HEIGHT / 8;

/// Top of the first text row, in pixels
const FIRST_ROW_Y: i32 = 10;
/// Distance between text rows, in pixels
const ROW_PITCH: i32 = 10;

/// Control bytes
const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

/// SSD1306 commands
#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const DISPLAY_RAM: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// Power-up sequence for a 128x32 panel on the internal charge pump
const INIT_SEQUENCE: &[u8] = &[
    cmd::DISPLAY_OFF,
    cmd::SET_CLOCK_DIV,
    0x80,
    cmd::SET_MUX_RATIO,
    (HEIGHT - 1) as u8,
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::SET_CHARGE_PUMP,
    0x14,
    cmd::SET_MEMORY_MODE,
    0x02, // Page addressing
    cmd::SET_SEG_REMAP,
    cmd::SET_COM_SCAN_DEC,
    cmd::SET_COM_PINS,
    0x02, // Sequential COM, 32 rows
    cmd::SET_CONTRAST,
    0x8F,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::DISPLAY_RAM,
    cmd::SET_NORMAL,
    cmd::DISPLAY_ON,
];

/// 1 bit per pixel frame, organized as pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pages: [[u8; WIDTH]; PAGES],
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    /// Create a blank frame
    pub const fn new() -> Self {
        Self {
            pages: [[0; WIDTH]; PAGES],
        }
    }

    /// Blank every pixel
    pub fn clear(&mut self) {
        for page in self.pages.iter_mut() {
            page.fill(0);
        }
    }

    /// Check if a pixel is lit
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        self.pages[y / 8][x] & (1 << (y % 8)) != 0
    }

    /// Check if no pixel in a page is lit
    pub fn page_is_blank(&self, page: usize) -> bool {
        self.pages
            .get(page)
            .map_or(true, |p| p.iter().all(|&b| b == 0))
    }

    /// Draw one text row with its top edge at `y`
    fn text(&mut self, text: &str, y: i32) {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        // Drawing into RAM cannot fail
        let _ = Text::with_baseline(text, Point::new(0, y), style, Baseline::Top).draw(self);
    }

    fn set(&mut self, x: usize, y: usize, on: bool) {
        let mask = 1 << (y % 8);
        let byte = &mut self.pages[y / 8][x];
        if on {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for Frame {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                continue;
            };
            if x < WIDTH && y < HEIGHT {
                self.set(x, y, color.is_on());
            }
        }
        Ok(())
    }
}

/// SSD1306 count display
pub struct Ssd1306Display<I2C> {
    i2c: I2C,
    address: u8,
    frame: Frame,
    initialized: bool,
}

impl<I2C: I2c> Ssd1306Display<I2C> {
    /// Create a driver for the panel at `address`
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            frame: Frame::new(),
            initialized: false,
        }
    }

    /// Initialize the panel and blank it
    pub async fn init(&mut self) -> Result<(), DisplayError> {
        for &c in INIT_SEQUENCE {
            self.command(c).await?;
        }
        self.initialized = true;

        self.frame.clear();
        self.flush().await
    }

    /// Check if [`Self::init`] has succeeded
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Frame as last drawn
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Send a command to the display
    async fn command(&mut self, c: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, &[CONTROL_COMMAND, c])
            .await
            .map_err(|_| DisplayError::Communication)
    }

    /// Flush the frame to the display
    async fn flush(&mut self) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }

        for page in 0..PAGES {
            self.command(cmd::SET_PAGE_ADDR | page as u8).await?;
            self.command(cmd::SET_LOW_COLUMN).await?;
            self.command(cmd::SET_HIGH_COLUMN).await?;

            let mut data = [0u8; WIDTH + 1];
            data[0] = CONTROL_DATA;
            data[1..].copy_from_slice(&self.frame.pages[page]);
            self.i2c
                .write(self.address, &data)
                .await
                .map_err(|_| DisplayError::Communication)?;
        }

        Ok(())
    }

    async fn render(&mut self, rows: &[&str]) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }

        self.frame.clear();
        let mut y = FIRST_ROW_Y;
        for row in rows {
            self.frame.text(row, y);
            y += ROW_PITCH;
        }
        self.flush().await
    }
}

impl<I2C: I2c> CountDisplay for Ssd1306Display<I2C> {
    async fn greet(&mut self, greeting: &str) -> Result<(), DisplayError> {
        self.render(&[greeting]).await
    }

    async fn show(&mut self, snapshot: Snapshot) -> Result<(), DisplayError> {
        let [total, in_box]: [Line; 2] = CountScreen::lines(snapshot);
        self.render(&[total.as_str(), in_box.as_str()]).await
    }
}
