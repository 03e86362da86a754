// Windows service control manager backend

#[cfg(target_os = "windows")]
pub mod service;

#[cfg(target_os = "windows")]
pub mod manager;

#[cfg(target_os = "windows")]
pub mod dispatcher;

#[cfg(target_os = "windows")]
pub mod beep;
