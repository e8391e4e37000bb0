//! Recording stand-ins for the bus and the delay, shared by the driver tests.

use core::convert::Infallible;

use embedded_hal::i2c::ErrorKind;

/// Records every byte written to the bus, one entry per write call.
#[derive(Default)]
pub struct MockBus {
    pub writes: Vec<(u8, Vec<u8>)>,
}

impl MockBus {
    /// All written bytes, in order, ignoring the address.
    pub fn bytes(&self) -> Vec<u8> {
        self.writes.iter().flat_map(|(_, b)| b.iter().copied()).collect()
    }

    /// Reassembles `(register select, value)` pairs from the strobed nibbles.
    pub fn decoded(&self) -> Vec<(u8, u8)> {
        let bytes = self.bytes();
        assert_eq!(bytes.len() % 4, 0, "incomplete byte on the bus: {:x?}", bytes);
        bytes
            .chunks(4)
            .map(|c| {
                assert_eq!(c[0] & !0x04, c[1], "high nibble not strobed: {:x?}", c);
                assert_eq!(c[2] & !0x04, c[3], "low nibble not strobed: {:x?}", c);
                (c[0] & 0x01, (c[0] & 0xf0) | (c[2] >> 4))
            })
            .collect()
    }

    pub fn commands(&self) -> Vec<u8> {
        self.decoded()
            .into_iter()
            .filter(|(rs, _)| *rs == 0)
            .map(|(_, v)| v)
            .collect()
    }

    pub fn data(&self) -> Vec<u8> {
        self.decoded()
            .into_iter()
            .filter(|(rs, _)| *rs == 1)
            .map(|(_, v)| v)
            .collect()
    }

    fn record(&mut self, address: u8, operations: &[&[u8]]) {
        for bytes in operations {
            self.writes.push((address, bytes.to_vec()));
        }
    }
}

/// Bus that accepts `remaining` writes and fails every write after that.
pub struct FailingBus {
    pub remaining: usize,
    pub writes: usize,
}

impl FailingBus {
    pub fn new(remaining: usize) -> Self {
        Self {
            remaining,
            writes: 0,
        }
    }

    fn attempt(&mut self) -> Result<(), ErrorKind> {
        if self.remaining == 0 {
            return Err(ErrorKind::Other);
        }
        self.remaining -= 1;
        self.writes += 1;
        Ok(())
    }
}

/// Records every millisecond delay.
#[derive(Default)]
pub struct MockDelay {
    pub ms: Vec<u32>,
}

impl MockDelay {
    pub fn total_ms(&self) -> u32 {
        self.ms.iter().sum()
    }
}

mod blocking {
    use super::*;
    use embedded_hal::delay::DelayNs;
    use embedded_hal::i2c::{ErrorType, I2c, Operation};

    impl ErrorType for MockBus {
        type Error = Infallible;
    }

    impl I2c for MockBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            let writes: Vec<&[u8]> = operations
                .iter()
                .filter_map(|op| match op {
                    Operation::Write(bytes) => Some(*bytes),
                    Operation::Read(_) => None,
                })
                .collect();
            self.record(address, &writes);
            Ok(())
        }
    }

    impl ErrorType for FailingBus {
        type Error = ErrorKind;
    }

    impl I2c for FailingBus {
        fn transaction(
            &mut self,
            _address: u8,
            _operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            self.attempt()
        }
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}

        fn delay_ms(&mut self, ms: u32) {
            self.ms.push(ms);
        }
    }
}

#[cfg(feature = "async")]
mod nonblocking {
    use super::*;
    use embedded_hal_async::delay::DelayNs;
    use embedded_hal_async::i2c::{I2c, Operation};

    impl I2c for MockBus {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            let writes: Vec<&[u8]> = operations
                .iter()
                .filter_map(|op| match op {
                    Operation::Write(bytes) => Some(*bytes),
                    Operation::Read(_) => None,
                })
                .collect();
            self.record(address, &writes);
            Ok(())
        }
    }

    impl I2c for FailingBus {
        async fn transaction(
            &mut self,
            _address: u8,
            _operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            self.attempt()
        }
    }

    impl DelayNs for MockDelay {
        async fn delay_ns(&mut self, _ns: u32) {}

        async fn delay_ms(&mut self, ms: u32) {
            self.ms.push(ms);
        }
    }
}
