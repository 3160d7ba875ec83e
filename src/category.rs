//! The closed set of category tags used to classify transactions.

use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::Error;

/// A classification tag for a transaction.
///
/// Categories form a fixed, closed set. Each one is stored in the database
/// and transmitted over the API as a three-letter code, and displayed with
/// its label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Groceries and eating out.
    Food,
    /// Public transport, fuel and vehicle costs.
    Transport,
    /// Rent, mortgage and utilities.
    Housing,
    /// Medical expenses and insurance.
    Health,
    /// Courses, books and tuition.
    Education,
    /// Entertainment and hobbies.
    Leisure,
    /// General purchases.
    Shopping,
    /// Wages and salary payments.
    Salary,
    /// Deposits into and returns from investments.
    Investment,
    /// Anything that does not fit the other categories.
    #[default]
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 10] = [
        Category::Food,
        Category::Transport,
        Category::Housing,
        Category::Health,
        Category::Education,
        Category::Leisure,
        Category::Shopping,
        Category::Salary,
        Category::Investment,
        Category::Other,
    ];

    /// The short code the category is stored and transmitted as.
    pub fn code(&self) -> &'static str {
        match self {
            Category::Food => "FOO",
            Category::Transport => "TRA",
            Category::Housing => "HOU",
            Category::Health => "HEA",
            Category::Education => "EDU",
            Category::Leisure => "LEI",
            Category::Shopping => "SHO",
            Category::Salary => "SAL",
            Category::Investment => "INV",
            Category::Other => "OTH",
        }
    }

    /// The human readable label for the category.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Housing => "Housing",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Leisure => "Leisure",
            Category::Shopping => "Shopping",
            Category::Salary => "Salary",
            Category::Investment => "Investment",
            Category::Other => "Other",
        }
    }

    /// Parse a category from its short `code`.
    ///
    /// # Errors
    /// Returns [Error::InvalidCategory] if `code` is not one of the known
    /// category codes.
    pub fn from_code(code: &str) -> Result<Self, Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.code() == code)
            .ok_or_else(|| Error::InvalidCategory(code.to_owned()))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Category::from_code(&code).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod category_tests {
    use super::Category;
    use crate::Error;

    #[test]
    fn codes_round_trip() {
        for category in Category::ALL {
            assert_eq!(Ok(category), Category::from_code(category.code()));
        }
    }

    #[test]
    fn codes_are_unique() {
        for (i, first) in Category::ALL.iter().enumerate() {
            for second in &Category::ALL[i + 1..] {
                assert_ne!(first.code(), second.code());
            }
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(
            Category::from_code("XYZ"),
            Err(Error::InvalidCategory("XYZ".to_owned()))
        );
    }

    #[test]
    fn serializes_as_code() {
        let json = serde_json::to_string(&Category::Food).unwrap();

        assert_eq!(json, "\"FOO\"");

        let parsed: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Category::Food);
    }
}
