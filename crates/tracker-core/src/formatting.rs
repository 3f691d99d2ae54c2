use chrono::NaiveDate;

/// Currency symbol printed in front of every amount.
pub const CURRENCY_SYMBOL: &str = "₹";

/// Format `value` with thousands separators and `decimals` fractional digits.
///
/// ```
/// use tracker_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 2), "1,234.50");
/// assert_eq!(format_number(-9876.0, 0), "-9,876");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let formatted = format!("{:.prec$}", value.abs(), prec = decimals as usize);
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut out = group_thousands(int_part);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }

    // "-0.00" reads as noise; only keep the sign if something survived rounding.
    let is_zero = out.chars().all(|c| matches!(c, '0' | '.' | ','));
    if value < 0.0 && !is_zero {
        format!("-{}", out)
    } else {
        out
    }
}

/// Format an amount of money, e.g. `"₹1,200.00"` or `"-₹240.00"`.
pub fn format_currency(amount: f64) -> String {
    let body = format_number(amount, 2);
    match body.strip_prefix('-') {
        Some(abs) => format!("-{}{}", CURRENCY_SYMBOL, abs),
        None => format!("{}{}", CURRENCY_SYMBOL, body),
    }
}

/// Format a consumption figure, e.g. `"50.00 units"`.
pub fn format_units(units: f64) -> String {
    format!("{} units", format_number(units, 2))
}

/// Display form of a reading date, matching the entry form: `DD-MM-YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// English ordinal: `1st`, `2nd`, `3rd`, `4th`, `11th`, `21st`.
pub fn ordinal(n: u32) -> String {
    let suffix = if (11..=13).contains(&(n % 100)) {
        "th"
    } else {
        match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{}{}", n, suffix)
}

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    let len = s.len();
    let mut result = String::with_capacity(len + len / 3);
    for (i, c) in s.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}
