use embedded_hal_async::{delay::DelayNs, i2c::I2c};

use crate::{
    cursor_address, split_nibbles, strobe, Backlight, Instruction, Mode, COMMAND_DELAY_MS,
    DEFAULT_ADDRESS, INIT_SEQUENCE, POWER_ON_DELAY_MS,
};

/// API to write to the LCD.
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
    pub async fn init(mut self) -> Result<Self, I::Error> {
        self.initialize().await?;
        Ok(self)
    }

    /// Runs the bring-up sequence, see [`crate::Lcd::initialize`].
    pub async fn initialize(&mut self) -> Result<(), I::Error> {
        #[cfg(feature = "defmt")]
        defmt::debug!("lcd: bring-up at {=u8:#x}", self.address);

        self.delay.delay_ms(POWER_ON_DELAY_MS).await;
        for instruction in INIT_SEQUENCE.iter() {
            self.send_command(*instruction).await?;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("lcd: ready");
        Ok(())
    }

    /// Writes `value` with enable high, then enable low.
    pub async fn send_byte(&mut self, value: u8) -> Result<(), I::Error> {
        for state in strobe(value, self.backlight_state).iter() {
            self.i2c.write(self.address, &[*state]).await?;
        }
        Ok(())
    }

    async fn send(&mut self, data: u8, mode: Mode) -> Result<(), I::Error> {
        let [high_bits, low_bits] = split_nibbles(data, mode);
        self.send_byte(high_bits).await?;
        self.send_byte(low_bits).await
    }

    /// Writes an instruction and waits for it to execute.
    pub async fn send_command(&mut self, value: u8) -> Result<(), I::Error> {
        self.send(value, Mode::Cmd).await?;
        self.delay.delay_ms(COMMAND_DELAY_MS).await;
        Ok(())
    }

    /// Writes one character code at the current cursor position.
    pub async fn send_data(&mut self, value: u8) -> Result<(), I::Error> {
        self.send(value, Mode::Data).await
    }

    /// Write string to display, stopping at the first NUL.
    pub async fn write_str(&mut self, data: &str) -> Result<(), I::Error> {
        self.write_bytes(data.as_bytes()).await
    }

    /// Write bytes up to the first NUL.
    pub async fn write_bytes(&mut self, data: &[u8]) -> Result<(), I::Error> {
        for b in data.iter().take_while(|b| **b != 0) {
            self.send_data(*b).await?;
        }
        Ok(())
    }

    /// Clear the display
    pub async fn clear(&mut self) -> Result<(), I::Error> {
        self.send_command(Instruction::Clear as u8).await
    }

    /// Return cursor to upper left corner, i.e. (0,0).
    pub async fn return_home(&mut self) -> Result<(), I::Error> {
        self.send_command(Instruction::ReturnHome as u8).await
    }

    /// Set the cursor to (row, col). Coordinates are zero-based.
    pub async fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), I::Error> {
        match cursor_address(row, col) {
            Some(address) => self.send_command(address).await,
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
