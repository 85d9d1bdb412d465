use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use mogu_shared::{AppError, AppResult, ErrorCode};

/// One-hot encoder with a dropped reference level.
///
/// Levels are the distinct observed values in code-point order. The first
/// level is the reference and has no column, so N levels give N-1 columns
/// and an all-zero row means "reference level". The column set follows the
/// observed levels, so the fitted encoder belongs to a model's schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    prefix: String,
    reference: Option<String>,
    levels: Vec<String>,
}

impl OneHotEncoder {
    pub fn fit<'a, I>(prefix: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let distinct: BTreeSet<&str> = values.into_iter().collect();
        let mut ordered = distinct.into_iter().map(str::to_owned);
        let reference = ordered.next();
        Self {
            prefix: prefix.into(),
            reference,
            levels: ordered.collect(),
        }
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn width(&self) -> usize {
        self.levels.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.levels
            .iter()
            .map(|level| format!("{}_{}", self.prefix, level))
            .collect()
    }

    /// Writes the indicator columns for `value` into `out` (length `width()`).
    pub fn encode_into(&self, value: &str, out: &mut [f64]) -> AppResult<()> {
        debug_assert_eq!(out.len(), self.width());
        out.fill(0.0);

        if self.reference.as_deref() == Some(value) {
            return Ok(());
        }
        match self.levels.binary_search_by(|level| level.as_str().cmp(value)) {
            Ok(pos) => {
                out[pos] = 1.0;
                Ok(())
            }
            Err(_) => Err(AppError::with_details(
                ErrorCode::UnknownCategoryLevel,
                format!("'{value}' is not a fitted level of '{}'", self.prefix),
                serde_json::json!({ "prefix": self.prefix, "value": value }),
            )),
        }
    }

    pub fn encode(&self, value: &str) -> AppResult<Vec<f64>> {
        let mut out = vec![0.0; self.width()];
        self.encode_into(value, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn n_levels_give_n_minus_one_columns() {
        let enc = OneHotEncoder::fit("household_size", ["2인 가구", "1인 가구", "3인 이상 가구", "1인 가구"]);
        assert_eq!(enc.width(), 2);
        assert_eq!(enc.reference(), Some("1인 가구"));
        assert_eq!(
            enc.column_names(),
            vec!["household_size_2인 가구", "household_size_3인 이상 가구"]
        );
    }

    #[test]
    fn at_most_one_indicator_is_hot() {
        let values = ["식품/간식", "생활용품", "패션/잡화", "뷰티/헬스케어"];
        let enc = OneHotEncoder::fit("category", values);
        assert_eq!(enc.width(), 3);
        for value in values {
            let row = enc.encode(value).unwrap();
            let hot = row.iter().filter(|v| **v == 1.0).count();
            assert!(hot <= 1);
            assert_eq!(hot == 0, enc.reference() == Some(value));
        }
    }

    #[test]
    fn single_level_has_no_columns() {
        let enc = OneHotEncoder::fit("gender", ["female", "female"]);
        assert_eq!(enc.width(), 0);
        assert!(enc.encode("female").unwrap().is_empty());
    }

    #[test]
    fn empty_input_has_no_reference() {
        let enc = OneHotEncoder::fit("gender", std::iter::empty::<&str>());
        assert_eq!(enc.reference(), None);
        assert_eq!(enc.width(), 0);
    }

    #[test]
    fn unseen_level_is_an_error() {
        let enc = OneHotEncoder::fit("gender", ["male", "female"]);
        assert_eq!(enc.encode("other").unwrap_err().code(), "E3001");
    }
}
