//! Python install paths from the Windows registry.

use std::path::PathBuf;
use windows::core::{HSTRING, PCWSTR, PWSTR};
use windows::Win32::Foundation::ERROR_SUCCESS;
use windows::Win32::System::Registry::{
    RegCloseKey, RegEnumKeyExW, RegGetValueW, RegOpenKeyExW, HKEY, HKEY_CURRENT_USER,
    HKEY_LOCAL_MACHINE, KEY_READ, RRF_RT_REG_SZ,
};

/// 32-bit view on 64-bit Windows first, then the native view.
const PYTHON_CORE_KEYS: [&str; 2] = [
    r"Software\Wow6432Node\Python\PythonCore",
    r"Software\Python\PythonCore",
];

/// First registered install path under HKCU, then under HKLM.
pub(crate) fn python_install_paths() -> Vec<PathBuf> {
    [HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE]
        .into_iter()
        .filter_map(|root| {
            PYTHON_CORE_KEYS
                .iter()
                .find_map(|key| first_install_path(root, key))
        })
        .collect()
}

fn first_install_path(root: HKEY, key: &str) -> Option<PathBuf> {
    let mut handle = HKEY::default();
    let subkey = HSTRING::from(key);
    // SAFETY: `subkey` outlives the call and `handle` is a valid out pointer.
    let status = unsafe { RegOpenKeyExW(root, &subkey, 0, KEY_READ, &mut handle) };
    if status != ERROR_SUCCESS {
        return None;
    }

    let mut found = None;
    let mut index = 0;
    loop {
        let mut name = [0u16; 256];
        let mut len = name.len() as u32;
        // SAFETY: `name` holds `len` UTF-16 units and `handle` is open.
        let status = unsafe {
            RegEnumKeyExW(
                handle,
                index,
                PWSTR(name.as_mut_ptr()),
                &mut len,
                None,
                PWSTR::null(),
                None,
                None,
            )
        };
        if status != ERROR_SUCCESS {
            break;
        }

        let version = String::from_utf16_lossy(&name[..len as usize]);
        if let Some(path) = read_default_value(handle, &format!(r"{version}\InstallPath")) {
            found = Some(path);
            break;
        }
        index += 1;
    }

    // SAFETY: `handle` was opened above and is closed exactly once.
    unsafe {
        let _ = RegCloseKey(handle);
    }
    found
}

fn read_default_value(key: HKEY, subkey: &str) -> Option<PathBuf> {
    let subkey = HSTRING::from(subkey);
    let mut size = 0u32;
    // SAFETY: size query with no data buffer.
    let status = unsafe {
        RegGetValueW(
            key,
            &subkey,
            PCWSTR::null(),
            RRF_RT_REG_SZ,
            None,
            None,
            Some(&mut size as *mut u32),
        )
    };
    if status != ERROR_SUCCESS || size == 0 {
        return None;
    }

    let mut buffer = vec![0u16; (size as usize).div_ceil(2)];
    // SAFETY: `buffer` is at least `size` bytes long.
    let status = unsafe {
        RegGetValueW(
            key,
            &subkey,
            PCWSTR::null(),
            RRF_RT_REG_SZ,
            None,
            Some(buffer.as_mut_ptr().cast()),
            Some(&mut size as *mut u32),
        )
    };
    if status != ERROR_SUCCESS {
        return None;
    }

    let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    let value = String::from_utf16_lossy(&buffer[..len]);
    (!value.is_empty()).then(|| PathBuf::from(value))
}
