//! [`WindowManager`] implementation backed by `user32`.

use super::Win32Error;
use crate::traits::WindowManager;
use crate::types::{MonitorDescriptor, ProcessId, Rect, WindowHandle};
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, RECT, TRUE};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowTextW, GetWindowThreadProcessId, IsWindow, IsWindowVisible,
    SetWindowPos, ShowWindow, MONITORINFOF_PRIMARY, SHOW_WINDOW_CMD, SWP_NOACTIVATE,
    SWP_NOZORDER, SW_MAXIMIZE, SW_MINIMIZE, SW_RESTORE,
};

/// Windows desktop window manager.
#[derive(Debug, Default)]
pub struct Win32Wm;

impl Win32Wm {
    pub fn new() -> Self {
        Self
    }
}

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as usize as *mut _)
}

fn checked(window: WindowHandle) -> Result<HWND, Win32Error> {
    let h = hwnd(window);
    if unsafe { IsWindow(h) }.as_bool() {
        Ok(h)
    } else {
        Err(Win32Error::new(format!("window {} no longer exists", window)))
    }
}

unsafe extern "system" fn enum_windows_cb(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let handles = &mut *(lparam.0 as *mut Vec<WindowHandle>);
    if IsWindowVisible(hwnd).as_bool() {
        handles.push(WindowHandle(hwnd.0 as usize as u64));
    }
    TRUE
}

unsafe extern "system" fn enum_monitors_cb(
    monitor: HMONITOR,
    _hdc: HDC,
    _clip: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    let monitors = &mut *(lparam.0 as *mut Vec<HMONITOR>);
    monitors.push(monitor);
    TRUE
}

fn show(window: WindowHandle, cmd: SHOW_WINDOW_CMD) -> Result<(), Win32Error> {
    let h = checked(window)?;
    // The return value is the previous visibility, not success.
    unsafe {
        let _ = ShowWindow(h, cmd);
    }
    Ok(())
}

impl WindowManager for Win32Wm {
    type Error = Win32Error;

    fn visible_windows(&self) -> Result<Vec<WindowHandle>, Self::Error> {
        let mut handles: Vec<WindowHandle> = Vec::new();
        unsafe {
            EnumWindows(
                Some(enum_windows_cb),
                LPARAM(&mut handles as *mut Vec<WindowHandle> as isize),
            )?;
        }
        Ok(handles)
    }

    fn window_pid(&self, window: WindowHandle) -> Result<ProcessId, Self::Error> {
        let h = checked(window)?;
        let mut pid: u32 = 0;
        unsafe {
            GetWindowThreadProcessId(h, Some(&mut pid));
        }
        if pid == 0 {
            return Err(Win32Error::new(format!("no owner for window {}", window)));
        }
        Ok(pid)
    }

    fn window_title(&self, window: WindowHandle) -> Result<String, Self::Error> {
        let h = checked(window)?;
        let mut buf = [0u16; 512];
        let len = unsafe { GetWindowTextW(h, &mut buf) };
        Ok(String::from_utf16_lossy(&buf[..len.max(0) as usize]))
    }

    fn monitors(&self) -> Result<Vec<MonitorDescriptor>, Self::Error> {
        let mut handles: Vec<HMONITOR> = Vec::new();
        let ok = unsafe {
            EnumDisplayMonitors(
                HDC::default(),
                None,
                Some(enum_monitors_cb),
                LPARAM(&mut handles as *mut Vec<HMONITOR> as isize),
            )
        };
        if !ok.as_bool() {
            return Err(Win32Error::new("EnumDisplayMonitors failed"));
        }

        let mut monitors = Vec::with_capacity(handles.len());
        for (index, monitor) in handles.into_iter().enumerate() {
            let mut info = MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                ..Default::default()
            };
            if !unsafe { GetMonitorInfoW(monitor, &mut info) }.as_bool() {
                log::warn!("GetMonitorInfoW failed for monitor {}, skipping", index);
                continue;
            }
            let r = info.rcMonitor;
            monitors.push(MonitorDescriptor {
                index: monitors.len(),
                origin_x: r.left,
                origin_y: r.top,
                width: (r.right - r.left).max(0) as u32,
                height: (r.bottom - r.top).max(0) as u32,
                is_primary: info.dwFlags & MONITORINFOF_PRIMARY != 0,
            });
        }
        Ok(monitors)
    }

    fn restore(&self, window: WindowHandle) -> Result<(), Self::Error> {
        show(window, SW_RESTORE)
    }

    fn move_resize(&self, window: WindowHandle, rect: Rect) -> Result<(), Self::Error> {
        let h = checked(window)?;
        unsafe {
            SetWindowPos(
                h,
                HWND::default(),
                rect.x,
                rect.y,
                rect.width as i32,
                rect.height as i32,
                SWP_NOZORDER | SWP_NOACTIVATE,
            )?;
        }
        Ok(())
    }

    fn maximize(&self, window: WindowHandle) -> Result<(), Self::Error> {
        show(window, SW_MAXIMIZE)
    }

    fn minimize(&self, window: WindowHandle) -> Result<(), Self::Error> {
        show(window, SW_MINIMIZE)
    }
}
