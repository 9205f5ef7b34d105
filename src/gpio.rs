//! Bit-banged GPIO driver for HT1632C controllers.
//!
//! The chip is written over a 2-wire interface: a shared data line and a
//! shared write-strobe (WR) line, with one active-low chip-select line per
//! cascaded board. Every bit is clocked by pulsing WR high while the data
//! line holds the bit's level; the chip latches data on the rising edge.
//! Transmission is synchronous and software timed, so any `OutputPin`s fast
//! enough for the strobe period will do.
//!
//! # Example
//! ```rust,no_run
//! use ht1632c::{compute_buffer_size, CommonsMode, Ht1632c};
//!
//! const OUT: usize = 32; // columns per chip
//! const COM: usize = 8; // rows per chip
//! const SIZE: usize = compute_buffer_size(OUT, COM);
//! const CHANNELS: usize = 1;
//! const BOARDS: usize = 1;
//!
//! # fn example<P: embedded_hal::digital::OutputPin, D: embedded_hal::delay::DelayNs>(
//! #     cs: P, wr: P, data: P, delay: D,
//! # ) -> Result<(), P::Error> {
//! let mut display =
//!     Ht1632c::<_, _, _, _, OUT, COM, SIZE, CHANNELS, BOARDS>::new([cs], wr, data, delay);
//! display.init(CommonsMode::PMos8)?;
//!
//! display.set_pixel(0, 0);
//! display.render()?;
//! # Ok(())
//! # }
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::command::Command;
use crate::command::CommonsMode;
use crate::command::ADDR_LEN;
use crate::command::CMD_LEN;
use crate::command::ID_COMMAND;
use crate::command::ID_LEN;
use crate::command::ID_WRITE;
use crate::command::WORD_LEN;
use crate::framebuffer::FrameBuffer;

/// Maximum number of cascaded boards on one interface.
pub const MAX_BOARDS: usize = 4;

/// Settle time between pin transitions, in nanoseconds. The HT1632C serial
/// clock tops out at 1 MHz, so each half-cycle must hold for at least 500ns.
const SETTLE_NS: u32 = 500;

/// Board set addressed by a brightness command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Target {
    /// The board currently selected as the render target.
    Current,
    /// An explicit board set; bit `i` of the mask addresses board `i`.
    Boards(u8),
}

/// Driver for a chain of HT1632C boards sharing one data/WR pair.
///
/// Owns one packed [`FrameBuffer`] per channel plus two selectors: the
/// *write channel* that single-channel pixel calls affect, and the *render
/// target* board that [`render`](Self::render) and
/// [`Target::Current`] resolve to. Both start at 0 and only change through
/// the explicit select calls.
///
/// Pixel and fill operations touch buffer memory only; nothing reaches the
/// hardware until [`render`](Self::render) retransmits the buffers.
///
/// # Type Parameters
/// - `CS`, `WR`, `DATA`: output pins for chip-select, write-strobe and data
/// - `D`: delay provider for the per-bit settle time
/// - `OUT`: columns per chip
/// - `COM`: rows per chip (8 or 16)
/// - `SIZE`: channel buffer size, `compute_buffer_size(OUT, COM)`
/// - `CHANNELS`: number of independent memory planes
/// - `BOARDS`: number of cascaded boards, at most [`MAX_BOARDS`]
pub struct Ht1632c<
    CS,
    WR,
    DATA,
    D,
    const OUT: usize,
    const COM: usize,
    const SIZE: usize,
    const CHANNELS: usize,
    const BOARDS: usize,
> {
    cs: [CS; BOARDS],
    wr: WR,
    data: DATA,
    delay: D,
    channels: [FrameBuffer<OUT, COM, SIZE>; CHANNELS],
    write_channel: usize,
    render_target: usize,
}

impl<
        CS,
        WR,
        DATA,
        D,
        E,
        const OUT: usize,
        const COM: usize,
        const SIZE: usize,
        const CHANNELS: usize,
        const BOARDS: usize,
    > Ht1632c<CS, WR, DATA, D, OUT, COM, SIZE, CHANNELS, BOARDS>
where
    CS: OutputPin<Error = E>,
    WR: OutputPin<Error = E>,
    DATA: OutputPin<Error = E>,
    D: DelayNs,
{
    /// Select mask addressing every configured board at once.
    const ALL_BOARDS: u8 = ((1u16 << BOARDS) - 1) as u8;

    /// Create a driver from its control pins.
    ///
    /// The pins must already be configured as push-pull outputs by the HAL.
    /// The frame buffers start zeroed and both selectors start at 0; call
    /// [`init`](Self::init) before any other hardware operation.
    pub fn new(cs: [CS; BOARDS], wr: WR, data: DATA, delay: D) -> Self {
        assert!(BOARDS <= MAX_BOARDS);
        assert!(CHANNELS >= 1);

        Self {
            cs,
            wr,
            data,
            delay,
            channels: [FrameBuffer::new(); CHANNELS],
            write_channel: 0,
            render_target: 0,
        }
    }

    /// One-time chip bring-up.
    ///
    /// Idles the interface, zeroes every channel buffer, then broadcasts the
    /// power-on command sequence to all boards: oscillator off, the given
    /// common-driving mode, oscillator on, LED duty generator on, full 16/16
    /// PWM duty. Finishes by rendering the blank buffers to every board so
    /// the displays start all-off, and leaves board 0 as the render target.
    ///
    /// The RC master-mode command is deliberately not sent: RC master is the
    /// power-on default, and sending it breaks HT1632C parts.
    ///
    /// # Errors
    /// Propagates the first pin error.
    pub fn init(&mut self, commons: CommonsMode) -> Result<(), E> {
        // Idle state: everything deselected, WR and data low.
        self.select(0)?;
        self.wr.set_low()?;
        self.data.set_low()?;

        for channel in self.channels.iter_mut() {
            channel.clear();
        }

        self.select(Self::ALL_BOARDS)?;
        self.write_bits(ID_COMMAND, ID_LEN)?;
        self.write_command(Command::SysDis)?;
        self.write_command(Command::Commons(commons))?;
        self.write_command(Command::SysEn)?;
        self.write_command(Command::LedOn)?;
        self.write_command(Command::Pwm(16))?;
        self.select(0)?;

        // Push the blank buffers so every board starts in a known state.
        for board in 0..BOARDS {
            self.render_target = board;
            self.render()?;
        }
        self.render_target = 0;
        Ok(())
    }

    /// Select which channel the single-channel pixel calls affect.
    /// Out-of-range values leave the selection unchanged.
    pub fn select_channel(&mut self, channel: usize) {
        if channel < CHANNELS {
            self.write_channel = channel;
        }
    }

    /// Select which board [`render`](Self::render) and [`Target::Current`]
    /// address. Out-of-range values leave the selection unchanged.
    pub fn render_target(&mut self, board: usize) {
        if board < BOARDS {
            self.render_target = board;
        }
    }

    /// Set the pixel at `(x, y)` on the current write channel.
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        self.channels[self.write_channel].set_pixel(x, y);
    }

    /// Clear the pixel at `(x, y)` on the current write channel.
    pub fn clear_pixel(&mut self, x: usize, y: usize) {
        self.channels[self.write_channel].clear_pixel(x, y);
    }

    /// Get the pixel at `(x, y)` on the current write channel.
    #[must_use]
    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        self.channels[self.write_channel].get_pixel(x, y)
    }

    /// Set the pixel at `(x, y)` on an explicit channel, independent of the
    /// current selection. Invalid channels are ignored.
    pub fn set_pixel_on(&mut self, channel: usize, x: usize, y: usize) {
        if let Some(fb) = self.channels.get_mut(channel) {
            fb.set_pixel(x, y);
        }
    }

    /// Clear the pixel at `(x, y)` on an explicit channel. Invalid channels
    /// are ignored.
    pub fn clear_pixel_on(&mut self, channel: usize, x: usize, y: usize) {
        if let Some(fb) = self.channels.get_mut(channel) {
            fb.clear_pixel(x, y);
        }
    }

    /// Get the pixel at `(x, y)` on an explicit channel. Invalid channels
    /// read as `false`.
    #[must_use]
    pub fn get_pixel_on(&self, channel: usize, x: usize, y: usize) -> bool {
        self.channels
            .get(channel)
            .map_or(false, |fb| fb.get_pixel(x, y))
    }

    /// Turn on every pixel of the current write channel.
    pub fn fill(&mut self) {
        self.channels[self.write_channel].fill();
    }

    /// Turn on every pixel of every channel.
    pub fn fill_all(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.fill();
        }
    }

    /// Turn off every pixel of every channel.
    pub fn clear(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.clear();
        }
    }

    /// Direct access to a channel's frame buffer, e.g. for drawing with
    /// `embedded-graphics`. Returns `None` for an invalid channel.
    pub fn framebuffer(&mut self, channel: usize) -> Option<&mut FrameBuffer<OUT, COM, SIZE>> {
        self.channels.get_mut(channel)
    }

    /// Retransmit every channel buffer to the current render target.
    ///
    /// One uninterrupted transaction: select the target board, write-RAM ID,
    /// start address 0, then every channel in index order, every byte in
    /// offset order, high nibble before low nibble, then deselect. The full
    /// buffer is always sent; there is no partial update. A no-op if the
    /// render target is out of range.
    ///
    /// # Errors
    /// Propagates the first pin error.
    pub fn render(&mut self) -> Result<(), E> {
        if self.render_target >= BOARDS {
            return Ok(());
        }

        self.select(1 << self.render_target)?;
        self.write_bits(ID_WRITE, ID_LEN)?;
        self.write_bits(0, ADDR_LEN)?;
        for channel in 0..CHANNELS {
            for offset in 0..SIZE {
                let byte = self.channels[channel].data()[offset];
                self.write_bits(byte >> WORD_LEN, WORD_LEN)?;
                self.write_bits(byte, WORD_LEN)?;
            }
        }
        self.select(0)
    }

    /// Set the PWM duty on the targeted boards.
    ///
    /// `duty` covers the chip's documented 1..=16 range and is passed
    /// through unclamped (see [`Command::Pwm`]). [`Target::Current`] with an
    /// out-of-range render target is a no-op.
    ///
    /// # Errors
    /// Propagates the first pin error.
    pub fn set_brightness(&mut self, duty: u8, target: Target) -> Result<(), E> {
        let mask = match target {
            Target::Boards(mask) => mask,
            Target::Current => {
                if self.render_target >= BOARDS {
                    return Ok(());
                }
                1 << self.render_target
            }
        };

        self.select(mask)?;
        self.write_bits(ID_COMMAND, ID_LEN)?;
        self.write_command(Command::Pwm(duty))?;
        self.select(0)
    }

    /// Consume the driver and hand back its pins and delay provider.
    pub fn release(self) -> ([CS; BOARDS], WR, DATA, D) {
        (self.cs, self.wr, self.data, self.delay)
    }

    /// Drive CS line `i` active (low) iff bit `i` of `mask` is set. Mask 0
    /// deselects every board; deselection brackets every transaction.
    fn select(&mut self, mask: u8) -> Result<(), E> {
        for (i, cs) in self.cs.iter_mut().enumerate() {
            if mask & (1 << i) != 0 {
                cs.set_low()?;
            } else {
                cs.set_high()?;
            }
        }
        Ok(())
    }

    /// Shift out the low `count` bits of `value`, most significant first.
    ///
    /// Per bit: data line to the bit's level, settle, WR high, settle, WR
    /// low. WR must be low on entry and is low again on return.
    fn write_bits(&mut self, value: u8, count: u8) -> Result<(), E> {
        for shift in (0..count).rev() {
            if value >> shift & 1 != 0 {
                self.data.set_high()?;
            } else {
                self.data.set_low()?;
            }
            self.delay.delay_ns(SETTLE_NS);
            self.wr.set_high()?;
            self.delay.delay_ns(SETTLE_NS);
            self.wr.set_low()?;
        }
        Ok(())
    }

    /// Emit the single don't-care padding bit (a fixed 0) the chip expects
    /// after every command word.
    fn write_single_bit(&mut self) -> Result<(), E> {
        self.data.set_low()?;
        self.delay.delay_ns(SETTLE_NS);
        self.wr.set_high()?;
        self.delay.delay_ns(SETTLE_NS);
        self.wr.set_low()
    }

    /// Transmit an 8-bit command word followed by its padding bit.
    fn write_command(&mut self, cmd: Command) -> Result<(), E> {
        self.write_bits(cmd.bits(), CMD_LEN)?;
        self.write_single_bit()
    }
}

#[cfg(feature = "log")]
impl<
        CS,
        WR,
        DATA,
        D,
        const OUT: usize,
        const COM: usize,
        const SIZE: usize,
        const CHANNELS: usize,
        const BOARDS: usize,
    > core::fmt::Debug for Ht1632c<CS, WR, DATA, D, OUT, COM, SIZE, CHANNELS, BOARDS>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ht1632c")
            .field("out", &OUT)
            .field("com", &COM)
            .field("channels", &CHANNELS)
            .field("boards", &BOARDS)
            .field("write_channel", &self.write_channel)
            .field("render_target", &self.render_target)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<
        CS,
        WR,
        DATA,
        D,
        const OUT: usize,
        const COM: usize,
        const SIZE: usize,
        const CHANNELS: usize,
        const BOARDS: usize,
    > defmt::Format for Ht1632c<CS, WR, DATA, D, OUT, COM, SIZE, CHANNELS, BOARDS>
{
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Ht1632c<{}, {}, {}, {}>", OUT, COM, CHANNELS, BOARDS);
        defmt::write!(f, " write_channel: {}", self.write_channel);
        defmt::write!(f, " render_target: {}", self.render_target);
    }
}
