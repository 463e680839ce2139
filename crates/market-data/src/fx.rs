//! FX pair symbol helpers.
//!
//! FX rates are served by the same oracle as prices, addressed with the
//! Yahoo-style pair symbol `FROMTO=X` (e.g. `USDKRW=X` is KRW per 1 USD).

/// Builds the oracle symbol for converting one unit of `from` into `to`.
pub fn fx_symbol(from_currency: &str, to_currency: &str) -> String {
    format!(
        "{}{}=X",
        from_currency.trim().to_uppercase(),
        to_currency.trim().to_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_symbol_normalizes_case() {
        assert_eq!(fx_symbol("usd", "krw"), "USDKRW=X");
        assert_eq!(fx_symbol("JPY", "KRW"), "JPYKRW=X");
    }
}
