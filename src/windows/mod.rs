//! Window discovery.
//!
//! [`arena`] tracks the shell's own windows behind generation-checked
//! handles, [`wmctrl`] lists other clients' windows through an external
//! helper, and [`snapshot`] merges both into the running-apps rows.

pub mod arena;
pub mod snapshot;
pub mod wmctrl;
