//! Ingredient quantity scaling.
//!
//! Quantities are free text ("2 1/2 cups, diced"). Only the first numeric
//! token is interpreted: it is parsed to an exact rational, multiplied by the
//! serving ratio and rendered back in place. Everything around the token is
//! passed through, apart from pluralising the unit word and the ingredient
//! name when the scaled amount is plural. Scaling never fails: text without a
//! usable number comes back unchanged.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Largest denominator rendered as a fraction; anything finer becomes a decimal.
pub const MAX_FRACTION_DENOMINATOR: i64 = 8;

/// Mixed number, then simple fraction, then decimal or integer. Alternation is
/// leftmost-first, so "2 1/2" is never split into "2" and "1/2".
const QUANTITY_PATTERN: &str = r"(\d+) +(\d+)/(\d+)|(\d+)/(\d+)|\d+(?:\.\d+)?";

static QUANTITY_TOKEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(QUANTITY_PATTERN).ok());

/// Abbreviated units that read the same in singular and plural.
const INVARIANT_UNITS: &[&str] = &[
    "g", "kg", "mg", "ml", "l", "cl", "dl", "oz", "lb", "lbs", "tsp", "tbsp", "fl",
];

/// An exact non-negative fraction, always stored reduced with a positive denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rational {
    num: i64,
    den: i64,
}

const fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.abs()
}

impl Rational {
    fn new(num: i64, den: i64) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let divisor = gcd(num, den).max(1);
        let sign = if den < 0 { -1 } else { 1 };
        Some(Self {
            num: sign * num / divisor,
            den: sign * den / divisor,
        })
    }

    fn checked_mul(self, other: Self) -> Option<Self> {
        // Cross-reduce first so large servings counts do not overflow needlessly.
        let g1 = gcd(self.num, other.den).max(1);
        let g2 = gcd(other.num, self.den).max(1);
        let num = (self.num / g1).checked_mul(other.num / g2)?;
        let den = (self.den / g2).checked_mul(other.den / g1)?;
        Self::new(num, den)
    }

    #[allow(clippy::cast_precision_loss)]
    fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    fn render(self) -> String {
        if self.den == 1 {
            return self.num.to_string();
        }
        if self.den <= MAX_FRACTION_DENOMINATOR {
            let whole = self.num / self.den;
            let rem = self.num % self.den;
            return if whole == 0 {
                format!("{rem}/{}", self.den)
            } else {
                format!("{whole} {rem}/{}", self.den)
            };
        }
        let rounded = format!("{:.1}", self.to_f64());
        rounded
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

fn parse_int(digits: &str) -> Option<i64> {
    digits.parse().ok()
}

fn parse_decimal(token: &str) -> Option<Rational> {
    match token.split_once('.') {
        None => Rational::new(parse_int(token)?, 1),
        Some((whole, frac)) => {
            let exponent = u32::try_from(frac.len()).ok()?;
            let den = 10_i64.checked_pow(exponent)?;
            let num = parse_int(whole)?
                .checked_mul(den)?
                .checked_add(parse_int(frac)?)?;
            Rational::new(num, den)
        }
    }
}

fn parse_token(caps: &Captures<'_>) -> Option<Rational> {
    if let (Some(whole), Some(num), Some(den)) = (caps.get(1), caps.get(2), caps.get(3)) {
        let den = parse_int(den.as_str())?;
        if den == 0 {
            return None;
        }
        let num = parse_int(whole.as_str())?
            .checked_mul(den)?
            .checked_add(parse_int(num.as_str())?)?;
        return Rational::new(num, den);
    }
    if let (Some(num), Some(den)) = (caps.get(4), caps.get(5)) {
        return Rational::new(parse_int(num.as_str())?, parse_int(den.as_str())?);
    }
    parse_decimal(caps.get(0)?.as_str())
}

/// Whether a value counts as "one" for pluralisation.
///
/// Anything within 0.1 of 1.0 reads as singular ("1.05 cup"), including 1.0 itself.
#[must_use]
pub fn is_close_to_one(value: f64) -> bool {
    (value - 1.0).abs() < 0.1
}

fn is_plural(value: f64) -> bool {
    value > 1.0 && !is_close_to_one(value)
}

/// Appends "s" to the alphabetic run at the start of `word`, keeping any
/// trailing punctuation ("cup," becomes "cups,").
fn pluralize_word(word: &str) -> String {
    let alpha_end = word
        .char_indices()
        .find(|(_, c)| !c.is_alphabetic())
        .map_or(word.len(), |(i, _)| i);
    let (stem, tail) = word.split_at(alpha_end);

    if stem.is_empty()
        || stem.ends_with(['s', 'S'])
        || INVARIANT_UNITS.contains(&stem.to_lowercase().as_str())
    {
        return word.to_string();
    }
    format!("{stem}s{tail}")
}

/// Pluralises the first word after the number, if one is separated from it by whitespace.
fn pluralize_unit(rest: &str) -> String {
    let trimmed = rest.trim_start();
    let gap = &rest[..rest.len() - trimmed.len()];
    if gap.is_empty() || trimmed.is_empty() {
        return rest.to_string();
    }
    let word_end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let (word, after) = trimmed.split_at(word_end);
    format!("{gap}{}{after}", pluralize_word(word))
}

/// Pluralises the head of an ingredient name, before any comma or parenthesis
/// ("Carrot, diced" becomes "Carrots, diced").
fn pluralize_name(name: &str) -> String {
    let split_at = name.find([',', '(']).unwrap_or(name.len());
    let (head, tail) = name.split_at(split_at);
    let stem = head.trim_end();
    let gap = &head[stem.len()..];

    if !stem.chars().last().is_some_and(char::is_alphabetic) || stem.ends_with(['s', 'S']) {
        return name.to_string();
    }
    format!("{stem}s{gap}{tail}")
}

/// Scales a quantity written for `original_servings` to `new_servings`.
///
/// Returns the new quantity text and the (possibly pluralised) ingredient name.
/// When no numeric token can be found or parsed, or either servings count is
/// not positive, both strings come back unchanged.
///
/// ```
/// use meal_planner::core::scaling::scale_quantity;
///
/// let (quantity, name) = scale_quantity("2 cups", "carrot", 2, 4);
/// assert_eq!(quantity, "4 cups");
/// assert_eq!(name, "carrots");
/// ```
#[must_use]
pub fn scale_quantity(
    quantity: &str,
    name: &str,
    original_servings: i32,
    new_servings: i32,
) -> (String, String) {
    let unchanged = || (quantity.to_string(), name.to_string());

    if original_servings <= 0 || new_servings <= 0 {
        return unchanged();
    }
    let Some(pattern) = QUANTITY_TOKEN.as_ref() else {
        return unchanged();
    };
    let Some(caps) = pattern.captures(quantity) else {
        return unchanged();
    };
    let Some(token) = caps.get(0) else {
        return unchanged();
    };
    let Some(value) = parse_token(&caps) else {
        return unchanged();
    };
    let Some(scaled) = Rational::new(new_servings.into(), original_servings.into())
        .and_then(|ratio| value.checked_mul(ratio))
    else {
        return unchanged();
    };

    // An unchanged magnitude keeps its original spelling ("1.5" stays "1.5").
    let rendered = if scaled == value {
        token.as_str().to_string()
    } else {
        scaled.render()
    };

    let before = &quantity[..token.start()];
    let after = &quantity[token.end()..];

    if is_plural(scaled.to_f64()) {
        (
            format!("{before}{rendered}{}", pluralize_unit(after)),
            pluralize_name(name),
        )
    } else {
        (format!("{before}{rendered}{after}"), name.to_string())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn scale(quantity: &str, name: &str, from: i32, to: i32) -> (String, String) {
        scale_quantity(quantity, name, from, to)
    }

    fn pair(quantity: &str, name: &str) -> (String, String) {
        (quantity.to_string(), name.to_string())
    }

    #[test]
    fn test_doubling_pluralises_unit_and_name() {
        assert_eq!(scale("2 cups", "carrot", 2, 4), pair("4 cups", "carrots"));
        assert_eq!(scale("1 cup", "carrot", 1, 3), pair("3 cups", "carrots"));
    }

    #[test]
    fn test_halving_one_renders_fraction_and_stays_singular() {
        assert_eq!(scale("1 cup", "onion", 2, 1), pair("1/2 cup", "onion"));
    }

    #[test]
    fn test_exactly_one_is_singular() {
        assert!(is_close_to_one(1.0));
        assert_eq!(scale("1/2 cup", "sugar", 2, 4), pair("1 cup", "sugar"));
    }

    #[test]
    fn test_close_to_one_boundary() {
        assert!(is_close_to_one(0.95));
        assert!(is_close_to_one(1.05));
        assert!(!is_close_to_one(0.5));
        assert!(!is_close_to_one(1.2));
        // 20/19 = 1.05..., rendered as a decimal but still singular
        assert_eq!(scale("1 cup", "onion", 19, 20), pair("1.1 cup", "onion"));
    }

    #[test]
    fn test_mixed_number_is_one_token() {
        assert_eq!(
            scale("2 1/2 cups, diced", "carrot", 2, 4),
            pair("5 cups, diced", "carrots")
        );
        assert_eq!(
            scale("1 1/2 tablespoon", "butter", 1, 2),
            pair("3 tablespoons", "butters")
        );
    }

    #[test]
    fn test_result_renders_as_mixed_fraction() {
        assert_eq!(scale("1.5 cup", "rice", 1, 3), pair("4 1/2 cups", "rices"));
        assert_eq!(scale("1 cup", "flour", 3, 7), pair("2 1/3 cups", "flours"));
        assert_eq!(scale("3 cups", "milk", 4, 1), pair("3/4 cups", "milk"));
    }

    #[test]
    fn test_fine_fractions_fall_back_to_one_decimal() {
        assert_eq!(scale("1 cup", "stock", 9, 1), pair("0.1 cup", "stock"));
        assert_eq!(scale("250 g", "pasta", 9, 4), pair("111.1 g", "pastas"));
        assert_eq!(scale("2 cups", "water", 9, 2), pair("0.4 cups", "water"));
    }

    #[test]
    fn test_trailing_zero_and_point_are_stripped() {
        assert_eq!(scale("9 cups", "bean", 9, 10), pair("10 cups", "beans"));
        assert_eq!(Rational::new(41, 10).unwrap().render(), "4.1");
        assert_eq!(Rational::new(401, 100).unwrap().render(), "4");
        assert_eq!(Rational::new(199, 100).unwrap().render(), "2");
        assert_eq!(Rational::new(1, 25).unwrap().render(), "0");
    }

    #[test]
    fn test_abbreviated_units_are_not_pluralised() {
        assert_eq!(scale("100 g", "spinach", 1, 2), pair("200 g", "spinachs"));
        assert_eq!(scale("1 tbsp", "oil", 1, 3), pair("3 tbsp", "oils"));
    }

    #[test]
    fn test_unit_glued_to_number_is_left_alone() {
        assert_eq!(scale("200g", "tofu", 2, 4), pair("400g", "tofus"));
    }

    #[test]
    fn test_name_modifiers_are_preserved() {
        assert_eq!(
            scale("2", "Carrot, julienned", 1, 2),
            pair("4", "Carrots, julienned")
        );
        assert_eq!(scale("2", "Egg (large)", 1, 2), pair("4", "Eggs (large)"));
        assert_eq!(scale("2", "Chickpeas", 1, 2), pair("4", "Chickpeas"));
    }

    #[test]
    fn test_text_around_number_passes_through() {
        assert_eq!(
            scale("about 4 cups, packed", "kale", 2, 4),
            pair("about 8 cups, packed", "kales")
        );
    }

    #[test]
    fn test_only_first_token_is_scaled() {
        assert_eq!(
            scale("2 cans (400 g each)", "tomato", 2, 4),
            pair("4 cans (400 g each)", "tomatos")
        );
    }

    #[test]
    fn test_no_number_is_passthrough() {
        assert_eq!(scale("to taste", "salt", 2, 4), pair("to taste", "salt"));
        assert_eq!(scale("", "pepper", 2, 4), pair("", "pepper"));
        assert_eq!(scale("a pinch", "nutmeg", 2, 4), pair("a pinch", "nutmeg"));
    }

    #[test]
    fn test_unparseable_tokens_are_passthrough() {
        assert_eq!(scale("1/0 cup", "milk", 2, 4), pair("1/0 cup", "milk"));
        assert_eq!(
            scale("99999999999999999999 cups", "rice", 1, 2),
            pair("99999999999999999999 cups", "rice")
        );
    }

    #[test]
    fn test_non_positive_servings_are_passthrough() {
        assert_eq!(scale("2 cups", "rice", 0, 4), pair("2 cups", "rice"));
        assert_eq!(scale("2 cups", "rice", 2, -1), pair("2 cups", "rice"));
    }

    #[test]
    fn test_unit_ratio_keeps_magnitude_text() {
        for (quantity, expected) in [
            ("3", "3"),
            ("1.5 cups", "1.5 cups"),
            ("1/3 cup", "1/3 cup"),
            ("2 1/2 cups", "2 1/2 cups"),
            ("0.25 tsp", "0.25 tsp"),
        ] {
            for servings in [1, 4, 12] {
                let (scaled, _) = scale(quantity, "thing", servings, servings);
                assert_eq!(scaled, expected, "{quantity} at {servings} servings");
            }
        }
    }

    #[test]
    fn test_scaling_composes() {
        for (quantity, o, m, n) in [
            ("1 cup", 3, 2, 6),
            ("2 1/2 cups", 4, 6, 2),
            ("0.75 kg", 2, 5, 8),
            ("3/4 cup", 4, 2, 8),
            ("1 cup", 9, 3, 1),
        ] {
            let (via, _) = scale(quantity, "x", o, m);
            let (twice, _) = scale(&via, "x", m, n);
            let (once, _) = scale(quantity, "x", o, n);
            let magnitude = |s: &str| -> f64 {
                let caps = QUANTITY_TOKEN.as_ref().unwrap().captures(s).unwrap();
                parse_token(&caps).unwrap().to_f64()
            };
            assert!(
                (magnitude(&twice) - magnitude(&once)).abs() <= 0.1,
                "{quantity}: {twice} vs {once}"
            );
        }
    }
}
