//! General commands - utilities that don't touch the database.

use crate::{
    core::{scaling::scale_quantity, user::validate_servings},
    errors::Result,
};

/// Scales one ingredient line from `from` servings to `to` servings.
///
/// # Errors
/// Returns a validation error if either serving count is outside 1..=12.
pub fn scale(quantity: &str, name: &str, from: i32, to: i32) -> Result<String> {
    validate_servings(from)?;
    validate_servings(to)?;
    let (quantity, name) = scale_quantity(quantity, name, from, to);
    Ok(super::ingredient_line(&quantity, &name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn test_scale_renders_line() -> Result<()> {
        assert_eq!(scale("2 cups", "carrot", 2, 4)?, "4 cups carrots");
        assert_eq!(scale("1 cup", "milk", 2, 1)?, "1/2 cup milk");
        assert!(matches!(scale("1", "egg", 0, 2), Err(Error::Validation { .. })));
        Ok(())
    }
}
