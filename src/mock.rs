//! In-memory fake of the SPI register block, for driving the transfer
//! engine without hardware.
//!
//! Every byte clocked out is appended to `written` in wire order. Received
//! bytes come from the `responses` queue; when it runs dry the bus echoes
//! what was written, which gives loopback semantics. `poll_busy` reports
//! the `busy` flag, `false` unless a test sets it, so nothing can hang.

use embedded_hal::spi::Mode;
use fugit::HertzU32 as Hertz;
use heapless::{Deque, Vec};

use crate::spi::{BitOrder, Instance, FIFO_DEPTH_WORDS};

pub struct MockSpi {
    fifo: [u32; FIFO_DEPTH_WORDS],
    width_bits: u16,
    pub busy: bool,
    /// Bytes clocked out, across all transactions, in wire order.
    pub written: Vec<u8, 4096>,
    /// Bytes to clock in; echoes the outgoing byte once empty.
    pub responses: Deque<u8, 256>,
    pub transactions: usize,
    pub width_writes: Vec<u16, 1024>,
    /// Writes to the mode, bit-order and clock registers combined.
    pub config_writes: usize,
    pub mode: Option<Mode>,
    pub bit_order: Option<BitOrder>,
    pub frequency: Option<Hertz>,
}

impl MockSpi {
    pub fn new() -> Self {
        MockSpi {
            fifo: [0; FIFO_DEPTH_WORDS],
            width_bits: 0,
            busy: false,
            written: Vec::new(),
            responses: Deque::new(),
            transactions: 0,
            width_writes: Vec::new(),
            config_writes: 0,
            mode: None,
            bit_order: None,
            frequency: None,
        }
    }

    pub fn enqueue_responses(&mut self, data: &[u8]) {
        for &byte in data {
            let _ = self.responses.push_back(byte);
        }
    }
}

impl Default for MockSpi {
    fn default() -> Self {
        Self::new()
    }
}

impl Instance for MockSpi {
    fn poll_busy(&self) -> bool {
        self.busy
    }

    fn start_transaction(&mut self) {
        self.transactions += 1;
        let snapshot = self.fifo;
        let len = usize::from(self.width_bits) / 8;
        for i in 0..len {
            let lane = 8 * (i % 4);
            let byte = (snapshot[i / 4] >> lane) as u8;
            let _ = self.written.push(byte);
            if let Some(response) = self.responses.pop_front() {
                let word = &mut self.fifo[i / 4];
                *word = *word & !(0xff << lane) | u32::from(response) << lane;
            }
        }
    }

    fn set_width_bits(&mut self, bits: u16) {
        self.width_bits = bits;
        let _ = self.width_writes.push(bits);
    }

    fn write_fifo_word(&mut self, index: usize, word: u32) {
        self.fifo[index] = word;
    }

    fn read_fifo_word(&self, index: usize) -> u32 {
        self.fifo[index]
    }

    fn set_data_mode(&mut self, mode: Mode) {
        self.mode = Some(mode);
        self.config_writes += 1;
    }

    fn set_bit_order(&mut self, bit_order: BitOrder) {
        self.bit_order = Some(bit_order);
        self.config_writes += 1;
    }

    fn set_frequency(&mut self, frequency: Hertz) {
        self.frequency = Some(frequency);
        self.config_writes += 1;
    }
}
