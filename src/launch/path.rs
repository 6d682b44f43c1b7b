//! Path translation across the Windows/WSL boundary.

use crate::host::OsFamily;

const WSL_MOUNT_PREFIX: &str = "/mnt/";

/// Rewrites `path` into the form an editor running on `destination` expects.
///
/// - Linux: `C:\Users\me\a.txt` becomes `/mnt/c/Users/me/a.txt`.
/// - Windows: `/mnt/c/Users/me/a.txt` becomes `C:\Users\me\a.txt`.
///
/// Anything else is returned unchanged.
pub fn convert_path_for_platform(path: &str, destination: OsFamily) -> String {
    match destination {
        OsFamily::Linux => windows_to_wsl(path),
        OsFamily::Windows => wsl_to_windows(path),
        OsFamily::Other => None,
    }
    .unwrap_or_else(|| path.to_string())
}

fn windows_to_wsl(path: &str) -> Option<String> {
    let bytes = path.as_bytes();
    if bytes.len() < 3 || !bytes[0].is_ascii_alphabetic() || bytes[1] != b':' || bytes[2] != b'\\'
    {
        return None;
    }

    let drive = (bytes[0] as char).to_ascii_lowercase();
    Some(format!("/mnt/{drive}{}", path[2..].replace('\\', "/")))
}

fn wsl_to_windows(path: &str) -> Option<String> {
    let rest = path.strip_prefix(WSL_MOUNT_PREFIX)?;
    let bytes = rest.as_bytes();
    if bytes.len() < 2 || !bytes[0].is_ascii_alphabetic() || bytes[1] != b'/' {
        return None;
    }

    let drive = (bytes[0] as char).to_ascii_uppercase();
    Some(format!("{drive}:{}", rest[1..].replace('/', "\\")))
}
