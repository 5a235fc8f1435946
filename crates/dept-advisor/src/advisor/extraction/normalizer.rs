pub(crate) fn normalize_document(value: &str) -> String {
    value
        .replace(['\u{feff}', '\u{200b}', '\u{200c}', '\u{200d}'], "")
        .replace("\r\n", "\n")
        .chars()
        .map(fold_full_width_digit)
        .collect()
}

/// Maps full-width digits (U+FF10..=U+FF19) onto their ASCII forms.
fn fold_full_width_digit(value: char) -> char {
    match value {
        '\u{ff10}'..='\u{ff19}' => {
            char::from_u32(u32::from(value) - 0xff10 + u32::from('0')).unwrap_or(value)
        }
        other => other,
    }
}

pub(crate) fn normalize_keyword(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Trims a captured value and collapses internal whitespace runs.
pub(crate) fn clean_capture(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_invisible_characters_and_crlf() {
        let normalized = normalize_document("\u{feff}姓名：王\u{200b}小明\r\n數學：90");
        assert_eq!(normalized, "姓名：王小明\n數學：90");
    }

    #[test]
    fn folds_full_width_digits_to_ascii() {
        assert_eq!(normalize_document("數學：９５ 英文：１００"), "數學：95 英文：100");
    }

    #[test]
    fn clean_capture_collapses_whitespace() {
        assert_eq!(clean_capture("  台北市立  建國高級中學 "), "台北市立 建國高級中學");
        assert_eq!(normalize_keyword(" Coding "), "coding");
    }
}
