//! # Core Wire Components
//!
//! Low-level byte codec and packet framing.
//!
//! ## Wire Format
//! ```text
//! plain:  [Type(4)] [Size(4)] [Payload(N)]
//! authed: [Type(4)] [Size(4)] [Ciphertext(N)] [MAC(32)]
//! ```
//!
//! ## Security
//! - 250 MiB payload ceiling, enforced before allocation
//! - encrypt-then-MAC: the MAC is verified before any body byte is decrypted
//! - sensitive intermediate buffers zeroed on every error path

pub mod packet;
pub mod wire;
