//! Services the watchface calls back into

use crate::message::MessageError;

/// Synchronous side of the platform used by event handlers.
///
/// Implementations must not block: handlers run to completion on the single
/// event loop.
pub trait Platform {
    /// Steps counted since local midnight
    fn steps_today(&mut self) -> u32;

    /// Request two short vibration pulses. No acknowledgment.
    fn vibes_double_pulse(&mut self);

    /// Queue an encoded dictionary for the companion.
    ///
    /// `Ok` only means the message was accepted; the delivery result arrives
    /// later as [`Event::OutboxSent`](crate::event::Event::OutboxSent) or
    /// [`Event::OutboxFailed`](crate::event::Event::OutboxFailed).
    fn outbox_send(&mut self, message: &[u8]) -> Result<(), MessageError>;
}
