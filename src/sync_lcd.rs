use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use ufmt_write::uWrite;

use crate::{
    cursor_address, split_nibbles, strobe, Backlight, Instruction, Mode, COMMAND_DELAY_MS,
    DEFAULT_ADDRESS, INIT_SEQUENCE, POWER_ON_DELAY_MS,
};

/// API to write to the LCD.
///
/// The handle borrows the bus and the delay for its whole lifetime and assumes it is the only
/// user of the display. Nothing of the controller state is mirrored here; cursor position and
/// display mode live on the device.
pub struct Lcd<'a, I, D>
where
    I: I2c,
    D: DelayNs,
{
    i2c: &'a mut I,
    address: u8,
    delay: &'a mut D,
    backlight_state: Backlight,
}

impl<'a, I, D> Lcd<'a, I, D>
where
    I: I2c,
    D: DelayNs,
{
    /// Create new instance with only the I2C and delay instance.
    ///
    /// Talks to [`DEFAULT_ADDRESS`] with the backlight on until configured otherwise. No bus
    /// traffic happens before [`init`](Self::init).
    pub fn new(i2c: &'a mut I, delay: &'a mut D) -> Self {
        Self {
            i2c,
            delay,
            address: DEFAULT_ADDRESS,
            backlight_state: Backlight::On,
        }
    }

    /// Set the 7 bit I2C address of the bridge.
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Drive the backlight pin on or off with every write.
    pub fn with_backlight(mut self, backlight: Backlight) -> Self {
        self.backlight_state = backlight;
        self
    }

    /// Brings the controller up and hands back the ready handle.
    pub fn init(mut self) -> Result<Self, I::Error> {
        self.initialize()?;
        Ok(self)
    }

    /// Runs the bring-up: 4 bit interface, two lines, 5x8 font, display on without cursor,
    /// left to right entry, cleared screen.
    ///
    /// Every other method assumes this has completed once. Running it again resets the
    /// display to the same state.
    pub fn initialize(&mut self) -> Result<(), I::Error> {
        #[cfg(feature = "defmt")]
        defmt::debug!("lcd: bring-up at {=u8:#x}", self.address);

        // Initial delay to wait for init after power on.
        self.delay.delay_ms(POWER_ON_DELAY_MS);
        for instruction in INIT_SEQUENCE.iter() {
            self.send_command(*instruction)?;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("lcd: ready");
        Ok(())
    }

    /// Latches `value` into the controller by writing it with enable high, then enable low.
    /// The backlight bit is carried on both writes.
    pub fn send_byte(&mut self, value: u8) -> Result<(), I::Error> {
        for state in strobe(value, self.backlight_state).iter() {
            self.i2c.write(self.address, &[*state])?;
        }
        Ok(())
    }

    fn send(&mut self, data: u8, mode: Mode) -> Result<(), I::Error> {
        let [high_bits, low_bits] = split_nibbles(data, mode);
        self.send_byte(high_bits)?;
        self.send_byte(low_bits)
    }

    /// Writes an instruction and waits for it to execute.
    pub fn send_command(&mut self, value: u8) -> Result<(), I::Error> {
        self.send(value, Mode::Cmd)?;
        self.delay.delay_ms(COMMAND_DELAY_MS);
        Ok(())
    }

    /// Writes one character code at the current cursor position.
    pub fn send_data(&mut self, value: u8) -> Result<(), I::Error> {
        self.send(value, Mode::Data)
    }

    /// Write string to display, stopping at the first NUL.
    ///
    /// Bytes map 1:1 onto the character ROM, so only ASCII renders as expected.
    pub fn write_str(&mut self, data: &str) -> Result<(), I::Error> {
        self.write_bytes(data.as_bytes())
    }

    /// Write bytes up to the first NUL, or the whole slice if there is none.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), I::Error> {
        for b in data.iter().take_while(|b| **b != 0) {
            self.send_data(*b)?;
        }
        Ok(())
    }

    /// Clear the display and move the cursor home.
    pub fn clear(&mut self) -> Result<(), I::Error> {
        self.send_command(Instruction::Clear as u8)
    }

    /// Return cursor to upper left corner, i.e. (0,0).
    pub fn return_home(&mut self) -> Result<(), I::Error> {
        self.send_command(Instruction::ReturnHome as u8)
    }

    /// Set the cursor to (row, col). Coordinates are zero-based; rows other than 0 and 1 are
    /// ignored.
    pub fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), I::Error> {
        match cursor_address(row, col) {
            Some(address) => self.send_command(address),
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("lcd: set_cursor on missing row {}", row);
                Ok(())
            }
        }
    }

    /// I2C address the handle talks to.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Backlight state carried on every write.
    pub fn backlight_state(&self) -> Backlight {
        self.backlight_state
    }
}

impl<'a, I, D> uWrite for Lcd<'a, I, D>
where
    I: I2c,
    D: DelayNs,
{
    type Error = I::Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.write_str(s)
    }
}
