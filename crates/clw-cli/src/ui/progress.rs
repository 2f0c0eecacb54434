//! Download progress text.

/// Single-line progress status: a percentage when the total is known, the
/// byte count so far otherwise.
pub fn format_progress(current: u64, total: Option<u64>) -> String {
    match total.filter(|&t| t > 0) {
        Some(total) => {
            let percent = current.min(total) as f64 * 100.0 / total as f64;
            format!("Progress: {percent:.1}%")
        }
        None => format!("Progress: {}", format_size(current)),
    }
}

/// Format bytes for human-readable display
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;

    if bytes >= GIB {
        format!("{:.1} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}
