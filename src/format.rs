// ./src/format.rs

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Renders a byte count in base-1024 units with at most two decimals,
/// e.g. `1536` → `"1.5 KB"`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    format!("{} {}", trim_decimals(&format!("{scaled:.2}")), UNITS[unit])
}

fn trim_decimals(rendered: &str) -> &str {
    if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.')
    } else {
        rendered
    }
}
