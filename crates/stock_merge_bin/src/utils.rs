pub fn sanitize_ticker(ticker: String) -> String {
    return ticker
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_' || *c == '.')
        .take(20)
        .collect::<String>()
        .to_uppercase();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_ticker_pass_no_harm() {
        let result = sanitize_ticker("AAPL".to_string());
        assert_eq!(result, "AAPL".to_string());
    }

    #[test]
    fn sanitize_ticker_pass_delimiters() {
        let result = sanitize_ticker("BRK.B-_".to_string());
        assert_eq!(result, "BRK.B-_".to_string());
    }

    #[test]
    fn sanitize_ticker_pass_remove_non_alnum() {
        let result = sanitize_ticker("AA*&(^(*&PL,/ /?".to_string());
        assert_eq!(result, "AAPL".to_string());
    }

    #[test]
    fn sanitize_ticker_pass_remove_path_separators() {
        let result = sanitize_ticker("../etc/passwd".to_string());
        assert_eq!(result, "..ETCPASSWD".to_string());
    }

    #[test]
    fn sanitize_ticker_pass_max_len() {
        let result = sanitize_ticker("ABCDEFGHIJKLMNOPQRSTU".to_string());
        assert_eq!(result, "ABCDEFGHIJKLMNOPQRST".to_string());
    }

    #[test]
    fn sanitize_ticker_pass_to_uppercase() {
        let result = sanitize_ticker("aApl".to_string());
        assert_eq!(result, "AAPL".to_string());
    }

    #[test]
    fn sanitize_ticker_fail_to_uppercase() {
        let result = sanitize_ticker("aApl".to_string());
        assert_ne!(result, "aApl".to_string());
    }
}
