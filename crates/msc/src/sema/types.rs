//! MiniSoft semantic types and the rules relating them

use std::fmt;

use crate::frontend::ast::DataType;

/// Longest identifier the language accepts
pub const MAX_IDENTIFIER_LEN: usize = 14;

/// Semantic type of a symbol or expression.
///
/// Array types only label declared array symbols. Expressions always
/// synthesize a scalar type; indexing yields the element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Float,
    IntArray,
    FloatArray,
}

impl Type {
    /// Array type whose elements are `element`
    pub fn array_of(element: DataType) -> Self {
        match element {
            DataType::Int => Type::IntArray,
            DataType::Float => Type::FloatArray,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    pub fn is_array(self) -> bool {
        matches!(self, Type::IntArray | Type::FloatArray)
    }

    /// Element type of an array, `None` for scalars
    pub fn element_type(self) -> Option<Type> {
        match self {
            Type::IntArray => Some(Type::Int),
            Type::FloatArray => Some(Type::Float),
            Type::Int | Type::Float => None,
        }
    }

    /// Whether a value of type `value` may be stored into `self`.
    /// Identical types always fit; the only widening is `Int` into `Float`.
    pub fn accepts(self, value: Type) -> bool {
        self == value || (self == Type::Float && value == Type::Int)
    }

    /// Whether the two sides of a comparison may be compared
    pub fn is_comparable_with(self, other: Type) -> bool {
        self == other || (self.is_numeric() && other.is_numeric())
    }

    /// Result type of an arithmetic operator over numeric operands
    pub fn arithmetic_result(left: Type, right: Type) -> Type {
        if left == Type::Float || right == Type::Float {
            Type::Float
        } else {
            Type::Int
        }
    }
}

impl From<DataType> for Type {
    fn from(ty: DataType) -> Self {
        match ty {
            DataType::Int => Type::Int,
            DataType::Float => Type::Float,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Int => "Int",
            Type::Float => "Float",
            Type::IntArray => "IntArray",
            Type::FloatArray => "FloatArray",
        };
        f.write_str(name)
    }
}

/// Why a name is rejected as an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    Empty,
    BadStart,
    BadCharacter,
    TooLong,
    TrailingUnderscore,
    DoubleUnderscore,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::Empty => write!(f, "identifier is empty"),
            NameError::BadStart => write!(f, "identifier must start with a letter"),
            NameError::BadCharacter => {
                write!(f, "identifier may only contain letters, digits and '_'")
            }
            NameError::TooLong => {
                write!(f, "identifier is longer than {} characters", MAX_IDENTIFIER_LEN)
            }
            NameError::TrailingUnderscore => write!(f, "identifier must not end with '_'"),
            NameError::DoubleUnderscore => write!(f, "identifier must not contain '__'"),
        }
    }
}

/// Check a declared name against the language's naming rule
pub fn validate_identifier(name: &str) -> Result<(), NameError> {
    let mut chars = name.chars();
    let first = chars.next().ok_or(NameError::Empty)?;

    if !first.is_ascii_alphabetic() {
        return Err(NameError::BadStart);
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(NameError::BadCharacter);
    }
    if name.chars().count() > MAX_IDENTIFIER_LEN {
        return Err(NameError::TooLong);
    }
    if name.ends_with('_') {
        return Err(NameError::TrailingUnderscore);
    }
    if name.contains("__") {
        return Err(NameError::DoubleUnderscore);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widening_is_one_way() {
        assert!(Type::Float.accepts(Type::Int));
        assert!(!Type::Int.accepts(Type::Float));
        assert!(Type::Int.accepts(Type::Int));
        assert!(!Type::Int.accepts(Type::IntArray));
    }

    #[test]
    fn test_comparison_compatibility() {
        assert!(Type::Int.is_comparable_with(Type::Float));
        assert!(Type::Float.is_comparable_with(Type::Int));
        assert!(!Type::Int.is_comparable_with(Type::FloatArray));
    }

    #[test]
    fn test_arithmetic_result() {
        assert_eq!(Type::arithmetic_result(Type::Int, Type::Int), Type::Int);
        assert_eq!(Type::arithmetic_result(Type::Int, Type::Float), Type::Float);
        assert_eq!(Type::arithmetic_result(Type::Float, Type::Int), Type::Float);
    }

    #[test]
    fn test_array_types() {
        assert_eq!(Type::array_of(DataType::Float), Type::FloatArray);
        assert_eq!(Type::IntArray.element_type(), Some(Type::Int));
        assert_eq!(Type::Float.element_type(), None);
        assert_eq!(Type::FloatArray.to_string(), "FloatArray");
    }

    #[test]
    fn test_identifier_rules() {
        assert_eq!(validate_identifier("count"), Ok(()));
        assert_eq!(validate_identifier("a_b1"), Ok(()));
        assert_eq!(validate_identifier("abcdefghijklmn"), Ok(()));
        assert_eq!(validate_identifier("abcdefghijklmno"), Err(NameError::TooLong));
        assert_eq!(validate_identifier("_x"), Err(NameError::BadStart));
        assert_eq!(validate_identifier("9x"), Err(NameError::BadStart));
        assert_eq!(validate_identifier("x_"), Err(NameError::TrailingUnderscore));
        assert_eq!(validate_identifier("a__b"), Err(NameError::DoubleUnderscore));
        assert_eq!(validate_identifier(""), Err(NameError::Empty));
    }
}
