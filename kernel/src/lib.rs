#![no_std]
#![warn(clippy::all)]

#[cfg(test)]
extern crate std;

pub mod console;
pub mod devices;
pub mod filesys;
pub mod init;
pub mod threads;
pub mod utils;

pub use init::init;

pub use bootloader_api::entry_point;
