//! Driver for Holtek HT1632/HT1632C dot-matrix LED controllers.
//!
//! ## How the HT1632C interface works
//!
//! The HT1632C is a memory-mapped LED controller: it owns a small display
//! RAM addressed in 4-bit words and continuously scans it out to the LED
//! matrix. The host talks to it over a write-only serial interface:
//!
//! ### Signal names
//! - **CS** – Chip-select, active low, one line per cascaded chip; a
//!   transaction runs from falling to rising edge of CS
//! - **WR** – Write strobe; the chip latches the data line on every rising
//!   edge
//! - **DATA** – Serial data, most significant bit first
//!
//! ### Transaction framing
//! Every transaction opens with a 3-bit ID code. Command transactions
//! (`100`) carry 8-bit command words, each followed by one don't-care
//! padding bit. RAM writes (`101`) carry a 7-bit start address followed by
//! 4-bit data words; the chip auto-increments the address, so a full-frame
//! update is a single transaction that streams the entire buffer.
//!
//! ### Memory layout
//! Display RAM packs pixels by column: each byte of the host-side frame
//! buffer holds 8 vertically adjacent pixels (most significant bit on top)
//! and is transmitted as two 4-bit words, high nibble first. See the
//! [`framebuffer`] module for the exact mapping.
//!
//! ## Driver structure
//!
//! - [`framebuffer::FrameBuffer`] — one packed memory plane ("channel");
//!   implements `embedded-graphics` [`DrawTarget`] so text and shapes can be
//!   drawn with that ecosystem
//! - [`command`] — the chip's command vocabulary, bit-exact
//! - [`gpio::Ht1632c`] — the driver proper: chip select, the bit-banged
//!   serial writer, full-frame rendering, brightness, and bring-up
//!
//! Pins are anything implementing `embedded-hal`'s [`OutputPin`]; the
//! per-bit settle time comes from an injected [`DelayNs`]. Everything is
//! synchronous and blocking: a render transmits the whole address space of
//! every channel and returns when the last bit has been strobed out.
//!
//! ## Available Feature Flags
//!
//! ### `defmt` Feature
//! Implements `defmt::Format` for the driver types so they can be emitted
//! with the `defmt` logging framework. No functional changes; purely adds
//! trait impls.
//!
//! ### `log` Feature
//! Adds `core::fmt::Debug` impls for the driver types for use with `log`
//! style formatting.
//!
//! [`DrawTarget`]: embedded_graphics::draw_target::DrawTarget
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]

pub mod command;
pub mod framebuffer;
pub mod gpio;

pub use command::Command;
pub use command::CommonsMode;
pub use framebuffer::compute_buffer_size;
pub use framebuffer::FrameBuffer;
pub use framebuffer::PIXELS_PER_BYTE;
pub use gpio::Ht1632c;
pub use gpio::Target;
pub use gpio::MAX_BOARDS;
