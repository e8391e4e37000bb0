#![cfg_attr(not(test), no_std)]
//! Driver for HD44780 compatible 16x2 character LCDs wired through a PCF8574 I2C to parallel
//! bridge. It requires an I2C instance implementing [`embedded_hal::i2c::I2c`] and an instance
//! to delay execution with [`embedded_hal::delay::DelayNs`]. With the `async` feature the same
//! API is available for [`embedded_hal_async`] peripherals in [`async_lcd`].
//!
//! The controller is driven in 4 bit mode: every byte goes out as two nibbles, high nibble
//! first, and every nibble is latched by pulsing the enable line of the bridge.
//!
//! Usage:
//! ```ignore
//! // Pins, clocks and the I2C peripheral come from the board HAL, e.g. rp2040-hal.
//! let mut i2c = hal::I2C::i2c0(pac.I2C0, sda, scl, 100.kHz(), &mut pac.RESETS, &clocks.system_clock);
//! let mut delay = cortex_m::delay::Delay::new(core.SYST, clocks.system_clock.freq().to_Hz());
//!
//! let mut lcd = lcd1602_i2c_bridge::Lcd::new(&mut i2c, &mut delay)
//!     .with_address(lcd1602_i2c_bridge::DEFAULT_ADDRESS)
//!     .init()
//!     .unwrap();
//!
//! loop {
//!     lcd.write_str("  Hello World!").unwrap();
//!     timer.delay_ms(1000);
//!     lcd.set_cursor(1, 0).unwrap();
//!     lcd.write_str("Rasperry Pi Pico").unwrap();
//!     timer.delay_ms(2000);
//!     lcd.initialize().unwrap();
//! }
//! ```
//!
//! Most backpacks answer on `0x27`; boards with the PCF8574A use `0x3F`.

#[cfg(feature = "async")]
pub mod async_lcd;
pub mod sync_lcd;

#[cfg(test)]
mod mock;

pub use sync_lcd::Lcd;

/// Address of the PCF8574 with all address pins pulled high.
pub const DEFAULT_ADDRESS: u8 = 0x27;

/// Time the controller needs after power on before it accepts instructions.
const POWER_ON_DELAY_MS: u32 = 15;
/// Execution time granted to every instruction.
const COMMAND_DELAY_MS: u32 = 2;

/// State of the backlight pin of the bridge (P3).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Backlight {
    Off = 0x00,
    On = 0x08,
}

/// Enable strobe pin of the bridge (P2).
const ENABLE: u8 = 0x04;

/// Register select, P0 on the bridge.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mode {
    Cmd = 0x00,
    Data = 0x01,
}

#[repr(u8)]
enum Instruction {
    Clear = 0x01,
    ReturnHome = 0x02,
    EntrySet = 0x04,
    DisplayControl = 0x08,
    FunctionSet = 0x20,
}

enum BitMode {
    Bit4 = 0x00,
}

enum Lines {
    Two = 0x08,
}

enum Font {
    Font5x8 = 0x00,
}

enum DisplayControl {
    DisplayOn = 0x04,
}

enum Cursor {
    Off = 0x00,
}

enum Blink {
    Off = 0x00,
}

enum EntryMode {
    Increment = 0x02,
    NoShift = 0x00,
}

/// DDRAM base of each row. Row 0 starts at 0x08 on the modules this driver targets.
const ROW_BASES: [u8; 2] = [0x08, 0xC0];

/// Instructions issued by the bring-up, in order.
const INIT_SEQUENCE: [u8; 5] = [
    Instruction::ReturnHome as u8,
    Instruction::FunctionSet as u8 | BitMode::Bit4 as u8 | Lines::Two as u8 | Font::Font5x8 as u8,
    Instruction::DisplayControl as u8
        | DisplayControl::DisplayOn as u8
        | Cursor::Off as u8
        | Blink::Off as u8,
    Instruction::EntrySet as u8 | EntryMode::Increment as u8 | EntryMode::NoShift as u8,
    Instruction::Clear as u8,
];

/// Splits `value` into its high and low nibble, both moved to the upper half of the byte and
/// tagged with the register select bit of `mode`.
fn split_nibbles(value: u8, mode: Mode) -> [u8; 2] {
    let high_bits: u8 = value & 0xf0;
    let low_bits: u8 = (value << 4) & 0xf0;
    [high_bits | mode as u8, low_bits | mode as u8]
}

/// The two bridge states that latch `value`: enable high, then enable low.
fn strobe(value: u8, backlight: Backlight) -> [u8; 2] {
    [
        value | backlight as u8 | ENABLE,
        (value & !ENABLE) | backlight as u8,
    ]
}

/// Set-address instruction for `(row, col)`; `None` for rows the display doesn't have.
fn cursor_address(row: u8, col: u8) -> Option<u8> {
    ROW_BASES
        .get(row as usize)
        .map(|base| base.wrapping_add(col))
}
