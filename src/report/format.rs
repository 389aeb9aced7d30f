/// Groups digits the Indian way (`12,34,567.5`): last three, then pairs.
/// Up to three fraction digits are kept, trailing zeros dropped.
pub fn group_en_in(value: f64) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    let head_len = digits.len().saturating_sub(3);
    for (i, c) in digits[..head_len].iter().enumerate() {
        if i > 0 && (head_len - i) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    if head_len > 0 {
        grouped.push(',');
    }
    grouped.extend(&digits[head_len..]);

    let mut out = String::new();
    if negative && (grouped != "0" || !frac.is_empty()) {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Payslip amount cell; empty when the amount is missing.
pub fn rupees(value: Option<f64>) -> String {
    value
        .map(|v| format!("Rs. {}", group_en_in(v)))
        .unwrap_or_default()
}
