/// Форматирует число с разделителями тысяч (точками)
///
/// # Примеры
/// ```
/// use backend::shared::format::format_number;
/// assert_eq!(format_number(1234567), "1.234.567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    group_thousands(&n.to_string())
}

/// Денежная сумма с двумя знаками после запятой: `1234.5` → `1.234,50`.
/// Нечисловые значения выводятся как `0,00`.
pub fn format_amount(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}{},{:02}",
        sign,
        group_thousands(&(cents / 100).to_string()),
        cents % 100
    )
}

fn group_thousands(digits: &str) -> String {
    let mut result = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}
