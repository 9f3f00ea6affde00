const UNITS: &[(&str, u64)] = &[
    ("s", 1),
    ("second", 1),
    ("seconds", 1),
    ("m", 60),
    ("minute", 60),
    ("minutes", 60),
    ("h", 3600),
    ("hour", 3600),
    ("hours", 3600),
    ("d", 86400),
    ("day", 86400),
    ("days", 86400),
    ("w", 604800),
    ("week", 604800),
    ("weeks", 604800),
];

pub fn parse_interval(value: &str) -> Result<u64, String> {
    let value = value.trim();
    let digits_end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    if digits_end == 0 {
        return Err(format!("interval {} has no leading digits", value));
    }
    let (digits, unit) = value.split_at(digits_end);
    let quantity: u64 = digits
        .parse()
        .map_err(|e| format!("interval {}: {}", value, e))?;
    let unit = unit.trim();
    for (name, multiplier) in UNITS {
        if *name == unit {
            return quantity
                .checked_mul(*multiplier)
                .ok_or_else(|| format!("interval {} is out of range", value));
        }
    }
    Err(format!(
        "interval {} has unknown unit {}; expected s, m, h, d, or w",
        value, unit
    ))
}
