#[cfg(target_os = "windows")]
pub mod windows;

use crate::error::Error;
use crate::window::{WindowAccessor, WindowId};

#[cfg(target_os = "windows")]
pub fn foreground_window() -> Result<WindowId, Error> {
    windows::foreground_window().ok_or_else(|| Error::Window("no foreground window".to_string()))
}

#[cfg(not(target_os = "windows"))]
pub fn foreground_window() -> Result<WindowId, Error> {
    Err(Error::UnsupportedPlatform("Window centering"))
}

#[cfg(target_os = "windows")]
pub fn native_accessor() -> Result<Box<dyn WindowAccessor>, Error> {
    Ok(Box::new(windows::Win32Windows))
}

#[cfg(not(target_os = "windows"))]
pub fn native_accessor() -> Result<Box<dyn WindowAccessor>, Error> {
    Err(Error::UnsupportedPlatform("Window centering"))
}
