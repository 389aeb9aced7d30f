const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

fn join(head: String, rest: u64) -> String {
    if rest == 0 {
        head
    } else {
        format!("{} {}", head, spell(rest))
    }
}

/// Indian scale: Hundred, Thousand, Lakh, Crore. Zero spells as nothing.
fn spell(n: u64) -> String {
    match n {
        0 => String::new(),
        1..=19 => ONES[n as usize].to_string(),
        20..=99 => {
            let tens = TENS[(n / 10) as usize];
            if n % 10 == 0 {
                tens.to_string()
            } else {
                format!("{} {}", tens, ONES[(n % 10) as usize])
            }
        }
        100..=999 => join(format!("{} Hundred", ONES[(n / 100) as usize]), n % 100),
        1_000..=99_999 => join(format!("{} Thousand", spell(n / 1_000)), n % 1_000),
        100_000..=9_999_999 => join(format!("{} Lakh", spell(n / 100_000)), n % 100_000),
        _ => join(format!("{} Crore", spell(n / 10_000_000)), n % 10_000_000),
    }
}

/// Spells a rupee amount for the payslip: `"One Thousand Rupees and Fifty Paise Only /-"`.
///
/// `None` (or a non-finite value) yields `"-"`. Amounts are rounded to paise first.
pub fn to_words(amount: Option<f64>) -> String {
    let Some(amount) = amount.filter(|a| a.is_finite()) else {
        return "-".to_string();
    };

    let paise_total = (amount.abs() * 100.0).round() as u64;
    if paise_total == 0 {
        return "Zero Rupees Only /-".to_string();
    }

    let rupees = paise_total / 100;
    let paise = paise_total % 100;

    let mut words = if rupees == 0 {
        "Zero Rupees".to_string()
    } else {
        format!("{} Rupees", spell(rupees))
    };
    if paise > 0 {
        words.push_str(&format!(" and {} Paise", spell(paise)));
    }
    if amount < 0.0 {
        words.insert_str(0, "Minus ");
    }

    words + " Only /-"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_values() {
        assert_eq!(to_words(Some(0.0)), "Zero Rupees Only /-");
        assert_eq!(to_words(Some(1.0)), "One Rupees Only /-");
        assert_eq!(to_words(None), "-");
        assert_eq!(to_words(Some(f64::NAN)), "-");
    }

    #[test]
    fn indian_scale() {
        assert_eq!(to_words(Some(100.0)), "One Hundred Rupees Only /-");
        assert_eq!(
            to_words(Some(45_250.0)),
            "Forty Five Thousand Two Hundred Fifty Rupees Only /-"
        );
        assert_eq!(to_words(Some(1_00_000.0)), "One Lakh Rupees Only /-");
        assert_eq!(
            to_words(Some(12_34_567.0)),
            "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven Rupees Only /-"
        );
        assert_eq!(
            to_words(Some(2_05_00_019.0)),
            "Two Crore Five Lakh Nineteen Rupees Only /-"
        );
    }

    #[test]
    fn paise_are_rounded_and_appended() {
        assert_eq!(
            to_words(Some(1_000.5)),
            "One Thousand Rupees and Fifty Paise Only /-"
        );
        assert_eq!(to_words(Some(10.999)), "Eleven Rupees Only /-");
        assert_eq!(to_words(Some(0.25)), "Zero Rupees and Twenty Five Paise Only /-");
    }

    #[test]
    fn negative_amounts_are_prefixed() {
        assert_eq!(to_words(Some(-20.0)), "Minus Twenty Rupees Only /-");
    }
}
