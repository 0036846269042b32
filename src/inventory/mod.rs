//! Room inventory engine: availability computation over the booking ledger
//! and the only write path that creates or transitions reservations.

pub mod availability;
pub mod booking;
