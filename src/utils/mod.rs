// Shared helpers for byte and text handling
pub mod encoding;
pub mod io;
