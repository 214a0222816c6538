//! The configuration of the tool, given from environment variables and lazy
//! initialized when needed.

use once_cell::race::OnceBool;
use once_cell::sync::OnceCell;
use std::env;


/// Return the forced gzip mode of input files, none if it should be detected from the
/// header of each file.
///
/// To force it, set `STACKNBT_GZIP=1`, or `STACKNBT_GZIP=0` to disable it.
pub fn gzip() -> Option<bool> {
    static ENV: OnceCell<Option<bool>> = OnceCell::new();
    *ENV.get_or_init(|| {
        match env::var_os("STACKNBT_GZIP")?.as_encoded_bytes() {
            b"1" => Some(true),
            b"0" => Some(false),
            _ => None,
        }
    })
}

/// Return true if metadata components should also be decoded.
///
/// To enable this feature, set `STACKNBT_COMPONENTS=1`.
pub fn components() -> bool {
    static ENV: OnceBool = OnceBool::new();
    ENV.get_or_init(|| {
        env::var_os("STACKNBT_COMPONENTS")
            .map(|s| s.as_encoded_bytes() == b"1")
            .unwrap_or(false)
    })
}
