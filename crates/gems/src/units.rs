pub fn volume_from_milli_liters(milli_liters: f64) -> f64 {
    milli_liters * 1e-6
}

pub fn volume_to_micro_liters(volume: f64) -> f64 {
    volume * 1e9
}

/// Converts a flow rate in mL/min to m^3/s
pub fn flow_from_milli_liters_per_minute(ml_per_min: f64) -> f64 {
    ml_per_min * 1e-6 / 60.
}

/// Converts a flow rate in m^3/s to µL/min
pub fn flow_to_micro_liters_per_minute(flow: f64) -> f64 {
    flow * 1e9 * 60.
}

pub fn time_from_hours(hours: f64) -> f64 {
    hours * 3600.
}

pub fn time_to_hours(seconds: f64) -> f64 {
    seconds / 3600.
}

pub fn length_from_micro_meters(micro_meters: f64) -> f64 {
    micro_meters * 1e-6
}

pub fn length_from_milli_meters(milli_meters: f64) -> f64 {
    milli_meters * 1e-3
}
