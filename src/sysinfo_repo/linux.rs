// Linux-specific helpers: thermal zones (Raspberry Pi exposes its SoC sensor here).

/// First thermal zone in Celsius, when sysinfo finds no labelled CPU sensor.
pub(super) fn read_thermal_zone_celsius() -> Option<f64> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/sys/class/thermal/thermal_zone0/temp").ok()?;
        parse_millidegrees(&content)
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Thermal zones report millidegrees Celsius, e.g. "48312\n".
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(super) fn parse_millidegrees(content: &str) -> Option<f64> {
    let milli = content.trim().parse::<i64>().ok()?;
    Some(milli as f64 / 1000.0)
}
