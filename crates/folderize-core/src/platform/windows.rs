use std::mem;
use std::ptr;

use winapi::shared::windef::{HWND, RECT};
use winapi::um::winuser::{
    GetForegroundWindow, GetMonitorInfoW, GetWindowRect, IsZoomed, MonitorFromWindow,
    SetWindowPos, MONITORINFO, MONITOR_DEFAULTTONEAREST, SWP_NOACTIVATE, SWP_NOSIZE,
    SWP_NOZORDER,
};

use crate::error::Error;
use crate::window::{Rect, WindowAccessor, WindowId};

/// Win32 window accessor. Window ids are raw `HWND` values.
pub struct Win32Windows;

fn hwnd(id: WindowId) -> HWND {
    id as usize as HWND
}

fn to_rect(r: RECT) -> Rect {
    Rect::new(r.left, r.top, r.right, r.bottom)
}

pub fn foreground_window() -> Option<WindowId> {
    let handle = unsafe { GetForegroundWindow() };
    if handle.is_null() {
        None
    } else {
        Some(handle as usize as WindowId)
    }
}

impl WindowAccessor for Win32Windows {
    fn window_rect(&self, id: WindowId) -> Result<Rect, Error> {
        let mut rect: RECT = unsafe { mem::zeroed() };
        if unsafe { GetWindowRect(hwnd(id), &mut rect) } == 0 {
            return Err(Error::Window(format!("GetWindowRect failed for {:#x}", id)));
        }
        Ok(to_rect(rect))
    }

    fn work_area(&self, id: WindowId) -> Result<Rect, Error> {
        let monitor = unsafe { MonitorFromWindow(hwnd(id), MONITOR_DEFAULTTONEAREST) };
        if monitor.is_null() {
            return Err(Error::Window(format!("no monitor for window {:#x}", id)));
        }
        let mut info: MONITORINFO = unsafe { mem::zeroed() };
        info.cbSize = mem::size_of::<MONITORINFO>() as u32;
        if unsafe { GetMonitorInfoW(monitor, &mut info) } == 0 {
            return Err(Error::Window(format!("GetMonitorInfoW failed for {:#x}", id)));
        }
        Ok(to_rect(info.rcWork))
    }

    fn is_maximized(&self, id: WindowId) -> Result<bool, Error> {
        Ok(unsafe { IsZoomed(hwnd(id)) } != 0)
    }

    fn move_window(&self, id: WindowId, x: i32, y: i32) -> Result<(), Error> {
        let ok = unsafe {
            SetWindowPos(
                hwnd(id),
                ptr::null_mut(),
                x,
                y,
                0,
                0,
                SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
            )
        };
        if ok == 0 {
            return Err(Error::Window(format!("SetWindowPos failed for {:#x}", id)));
        }
        Ok(())
    }
}
