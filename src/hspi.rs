//! Memory-mapped user SPI ("HSPI") register block.
//!
//! The flash-cache SPI at `0x6000_0200` is owned by the ROM and is not
//! exposed here; only the user block is available to applications.

use core::ptr;

use embedded_hal::spi::{Mode, Phase, Polarity};
use fugit::HertzU32 as Hertz;

use crate::spi::{BitOrder, Instance};

/// Peripheral input clock, fixed on this family.
const APB_FREQUENCY: Hertz = Hertz::from_raw(80_000_000);

const HSPI_BASE: usize = 0x6000_0100;

const CMD: usize = 0x00;
const CTRL: usize = 0x08;
const CLOCK: usize = 0x18;
const USER: usize = 0x1c;
const USER1: usize = 0x20;
const PIN: usize = 0x2c;
const W0: usize = 0x40;

bitfield::bitfield! {
    pub struct Cmd(u32);
    impl Debug;
    /// Set to start a transaction; cleared by hardware on completion.
    pub usr, set_usr: 18;
}

bitfield::bitfield! {
    pub struct Ctrl(u32);
    impl Debug;
    /// Receive LSB first when set.
    pub rd_bit_order, set_rd_bit_order: 25;
    /// Transmit LSB first when set.
    pub wr_bit_order, set_wr_bit_order: 26;
}

bitfield::bitfield! {
    pub struct Clock(u32);
    impl Debug;
    pub u32, clkcnt_l, set_clkcnt_l: 5, 0;
    pub u32, clkcnt_h, set_clkcnt_h: 11, 6;
    pub u32, clkcnt_n, set_clkcnt_n: 17, 12;
    pub u32, clkdiv_pre, set_clkdiv_pre: 30, 18;
    pub clk_equ_sysclk, set_clk_equ_sysclk: 31;
}

bitfield::bitfield! {
    pub struct User(u32);
    impl Debug;
    pub duplex, set_duplex: 0;
    pub cs_setup, set_cs_setup: 5;
    pub ck_out_edge, set_ck_out_edge: 7;
    pub usr_mosi, set_usr_mosi: 27;
    pub usr_miso, set_usr_miso: 28;
}

bitfield::bitfield! {
    pub struct User1(u32);
    impl Debug;
    /// Bits to receive, minus one.
    pub u32, usr_miso_bitlen, set_usr_miso_bitlen: 16, 8;
    /// Bits to transmit, minus one.
    pub u32, usr_mosi_bitlen, set_usr_mosi_bitlen: 25, 17;
}

bitfield::bitfield! {
    pub struct Pin(u32);
    impl Debug;
    /// Clock idles high when set.
    pub ck_idle_edge, set_ck_idle_edge: 29;
}

static mut HSPI1_TAKEN: bool = false;

/// The user SPI block. At most one handle exists at a time.
pub struct Hspi1 {
    _private: (),
}

impl Hspi1 {
    pub fn take() -> Option<Self> {
        critical_section::with(|_| unsafe {
            if HSPI1_TAKEN {
                None
            } else {
                HSPI1_TAKEN = true;
                Some(Self { _private: () })
            }
        })
    }

    /// # Safety
    ///
    /// Must not be used to create a second handle to a block that is
    /// already driven elsewhere.
    pub unsafe fn steal() -> Self {
        Self { _private: () }
    }

    fn read_reg(&self, offset: usize) -> u32 {
        unsafe { ptr::read_volatile((HSPI_BASE + offset) as *const u32) }
    }

    fn write_reg(&mut self, offset: usize, value: u32) {
        unsafe { ptr::write_volatile((HSPI_BASE + offset) as *mut u32, value) }
    }
}

impl Instance for Hspi1 {
    fn poll_busy(&self) -> bool {
        Cmd(self.read_reg(CMD)).usr()
    }

    fn start_transaction(&mut self) {
        let mut cmd = Cmd(self.read_reg(CMD));
        cmd.set_usr(true);
        self.write_reg(CMD, cmd.0);
    }

    fn set_width_bits(&mut self, bits: u16) {
        debug_assert!(bits > 0);
        let mut user1 = User1(self.read_reg(USER1));
        user1.set_usr_mosi_bitlen(u32::from(bits) - 1);
        user1.set_usr_miso_bitlen(u32::from(bits) - 1);
        self.write_reg(USER1, user1.0);
    }

    fn write_fifo_word(&mut self, index: usize, word: u32) {
        self.write_reg(W0 + 4 * index, word);
    }

    fn read_fifo_word(&self, index: usize) -> u32 {
        self.read_reg(W0 + 4 * index)
    }

    fn set_data_mode(&mut self, mode: Mode) {
        // The sample edge is expressed relative to the idle level, so the
        // out-edge bit flips whenever exactly one of CPOL/CPHA is set.
        let late_sample = matches!(
            (mode.polarity, mode.phase),
            (Polarity::IdleLow, Phase::CaptureOnSecondTransition)
                | (Polarity::IdleHigh, Phase::CaptureOnFirstTransition)
        );

        let mut user = User(self.read_reg(USER));
        user.set_duplex(true);
        user.set_cs_setup(true);
        user.set_usr_mosi(true);
        user.set_usr_miso(true);
        user.set_ck_out_edge(late_sample);
        self.write_reg(USER, user.0);

        let mut pin = Pin(self.read_reg(PIN));
        pin.set_ck_idle_edge(mode.polarity == Polarity::IdleHigh);
        self.write_reg(PIN, pin.0);
    }

    fn set_bit_order(&mut self, bit_order: BitOrder) {
        let lsb = bit_order == BitOrder::LsbFirst;
        let mut ctrl = Ctrl(self.read_reg(CTRL));
        ctrl.set_wr_bit_order(lsb);
        ctrl.set_rd_bit_order(lsb);
        self.write_reg(CTRL, ctrl.0);
    }

    fn set_frequency(&mut self, frequency: Hertz) {
        let mut clock = Clock(0);
        if frequency >= APB_FREQUENCY {
            clock.set_clk_equ_sysclk(true);
        } else {
            // f = APB / ((pre + 1) * (n + 1)), run with n = 1
            let target = frequency.to_Hz().max(1);
            let pre = (APB_FREQUENCY.to_Hz() / (2 * target)).clamp(1, 0x2000) - 1;
            clock.set_clkdiv_pre(pre);
            clock.set_clkcnt_n(1);
            clock.set_clkcnt_h(0);
            clock.set_clkcnt_l(1);
        }
        self.write_reg(CLOCK, clock.0);
    }
}
