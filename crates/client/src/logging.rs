/// Centralized logging macros for the link client and its transports
///
/// These macros provide consistent logging with:
/// - Platform-specific output (web_sys::console on WASM, stderr on native)
/// - Debug/info/warn stripped from release builds
/// - Error level always compiled
///
/// Log debug-level message (only in debug builds)
#[macro_export]
macro_rules! link_debug {
    ($($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::log_1(&format!($($arg)*).into());
            #[cfg(not(target_arch = "wasm32"))]
            eprintln!("[DEBUG] {}", format!($($arg)*));
        }
    };
}

/// Log info-level message (only in debug builds)
///
/// Use for lifecycle milestones (link opened, link closed)
#[macro_export]
macro_rules! link_info {
    ($($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::info_1(&format!($($arg)*).into());
            #[cfg(not(target_arch = "wasm32"))]
            eprintln!("[INFO] {}", format!($($arg)*));
        }
    };
}

/// Log warning-level message (only in debug builds)
///
/// Use for recoverable conditions: swallowed close failures, commands
/// dropped because the link is down
#[macro_export]
macro_rules! link_warn {
    ($($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::warn_1(&format!($($arg)*).into());
            #[cfg(not(target_arch = "wasm32"))]
            eprintln!("[WARN] {}", format!($($arg)*));
        }
    };
}

/// Log error-level message (always compiled, even in release)
#[macro_export]
macro_rules! link_error {
    ($($arg:tt)*) => {
        {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::error_1(&format!($($arg)*).into());
            #[cfg(not(target_arch = "wasm32"))]
            eprintln!("[ERROR] {}", format!($($arg)*));
        }
    };
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    #[test]
    fn test_logging_macros_compile() {
        link_debug!("test debug");
        link_info!("test info");
        link_warn!("test warn");
        link_error!("test error");
    }

    #[test]
    fn test_logging_with_format_args() {
        link_debug!("status {:?} -> {:?}", "Disconnected", "Connecting");
        link_warn!("ignoring close failure: {}", "stream already closed");
        link_error!("failed to open link: {}", "access denied");
    }
}
