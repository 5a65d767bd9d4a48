use std::collections::HashMap;

/// Looks up `currency` in a per-currency map, falling back to the USD value.
pub fn price_in(map: &HashMap<String, f64>, currency: &str) -> Option<f64> {
    map.get(&currency.to_lowercase()).or_else(|| map.get("usd")).copied()
}

pub fn round_float_number(n: f64, fraction_digits: u32) -> f64 {
    let factor = 10f64.powi(fraction_digits as i32);
    (n * factor).round() / factor
}

/// `1234567.5` -> `1,234,567.5`
pub fn number_with_commas(n: f64) -> String {
    let raw = n.to_string();
    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn get_change_percentage(change: f64) -> String {
    let trend = if change > 0.0 {
        "📈"
    } else if change == 0.0 {
        ""
    } else {
        "📉"
    };
    let sign = if change > 0.0 { "+" } else { "" };
    format!("{} {}{}%", trend, sign, round_float_number(change, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_usd_when_currency_missing() {
        let prices = HashMap::from([("usd".to_string(), 100.0)]);
        assert_eq!(price_in(&prices, "eur"), Some(100.0));
        assert_eq!(price_in(&prices, "EUR"), Some(100.0));
    }

    #[test]
    fn prefers_requested_currency() {
        let prices = HashMap::from([("usd".to_string(), 100.0), ("eur".to_string(), 93.5)]);
        assert_eq!(price_in(&prices, "EUR"), Some(93.5));
        assert_eq!(price_in(&HashMap::new(), "usd"), None);
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(number_with_commas(100.0), "100");
        assert_eq!(number_with_commas(1234.0), "1,234");
        assert_eq!(number_with_commas(1234567.25), "1,234,567.25");
        assert_eq!(number_with_commas(-9876543.0), "-9,876,543");
        assert_eq!(number_with_commas(0.4512), "0.4512");
    }

    #[test]
    fn rounds_to_fraction_digits() {
        assert_eq!(round_float_number(2.34567, 2), 2.35);
        assert_eq!(round_float_number(-1.25, 1), -1.3);
    }

    #[test]
    fn change_percentage_carries_trend() {
        assert_eq!(get_change_percentage(3.14159), "📈 +3.14%");
        assert_eq!(get_change_percentage(-0.5), "📉 -0.5%");
        assert_eq!(get_change_percentage(0.0), " 0%");
    }
}
