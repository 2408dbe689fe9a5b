//! Installed application descriptors.
//!
//! [`index`] answers "which application does this window class belong to";
//! [`catalogue`] lists what the launcher can start.  Both read the same
//! descriptor files through [`entry`].

pub mod catalogue;
pub mod entry;
pub mod index;

pub use index::{standard_application_dirs, DesktopDescriptor, DesktopIndex};
