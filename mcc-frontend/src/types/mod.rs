//! Type system
//!
//! Integer types of four widths in signed and unsigned form, `void`, pointers
//! and fixed-size arrays. Types are plain values; two descriptors that compare
//! equal denote the same type.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Void,

    Char,
    UnsignedChar,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,

    Pointer(Box<Type>),

    Array {
        element: Box<Type>,
        size: u64,
    },
}

/// Result of unifying the operand types of a binary operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArithmeticConversion {
    pub common: Type,
    pub convert_left: bool,
    pub convert_right: bool,
}

impl Type {
    pub fn pointer_to(base: Type) -> Type {
        Type::Pointer(Box::new(base))
    }

    pub fn array_of(element: Type, size: u64) -> Type {
        Type::Array {
            element: Box::new(element),
            size,
        }
    }

    /// Size in bytes; `void` has no size and reports 0
    pub fn size(&self) -> u64 {
        match self {
            Type::Void => 0,
            Type::Char | Type::UnsignedChar => 1,
            Type::Short | Type::UnsignedShort => 2,
            Type::Int | Type::UnsignedInt => 4,
            Type::Long | Type::UnsignedLong | Type::Pointer(_) => 8,
            Type::Array { element, size } => element.size().saturating_mul(*size),
        }
    }

    /// Size in bytes, or `None` when it does not fit in a `u64`
    pub fn checked_size(&self) -> Option<u64> {
        match self {
            Type::Array { element, size } => element.checked_size()?.checked_mul(*size),
            other => Some(other.size()),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array { .. })
    }

    pub fn is_integer(&self) -> bool {
        self.rank().is_some()
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Type::Char | Type::Short | Type::Int | Type::Long)
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            Type::UnsignedChar | Type::UnsignedShort | Type::UnsignedInt | Type::UnsignedLong
        )
    }

    /// Integers are the only arithmetic types
    pub fn is_arithmetic(&self) -> bool {
        self.is_integer()
    }

    pub fn is_scalar(&self) -> bool {
        self.is_arithmetic() || self.is_pointer()
    }

    /// Pointer target or array element
    pub fn base_type(&self) -> Option<&Type> {
        match self {
            Type::Pointer(base) => Some(base),
            Type::Array { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Arrays used as values become pointers to their first element
    pub fn decay(&self) -> Type {
        match self {
            Type::Array { element, .. } => Type::Pointer(element.clone()),
            other => other.clone(),
        }
    }

    fn rank(&self) -> Option<u8> {
        match self {
            Type::Char | Type::UnsignedChar => Some(1),
            Type::Short | Type::UnsignedShort => Some(2),
            Type::Int | Type::UnsignedInt => Some(3),
            Type::Long | Type::UnsignedLong => Some(4),
            _ => None,
        }
    }

    /// Unsigned counterpart of an integer type; other types are unchanged
    pub fn to_unsigned(&self) -> Type {
        match self {
            Type::Char => Type::UnsignedChar,
            Type::Short => Type::UnsignedShort,
            Type::Int => Type::UnsignedInt,
            Type::Long => Type::UnsignedLong,
            other => other.clone(),
        }
    }

    /// Everything narrower than `int` is promoted to `int`
    pub fn integral_promotion(&self) -> Type {
        match self {
            Type::Char | Type::UnsignedChar | Type::Short | Type::UnsignedShort => Type::Int,
            other => other.clone(),
        }
    }

    /// Reduce `value` to what an object of this type would hold
    pub fn truncate_constant(&self, value: i64) -> i64 {
        match (self.size(), self.is_signed()) {
            (1, true) => value as i8 as i64,
            (1, false) => value as u8 as i64,
            (2, true) => value as i16 as i64,
            (2, false) => value as u16 as i64,
            (4, true) => value as i32 as i64,
            (4, false) => value as u32 as i64,
            _ => value,
        }
    }
}

/// Unify two operand types the way C's usual arithmetic conversions do,
/// extended with the pointer combinations the language allows. Returns `None`
/// when the operands cannot be combined at all.
pub fn usual_arithmetic_conversion(left: &Type, right: &Type) -> Option<ArithmeticConversion> {
    let common = if left.is_arithmetic() && right.is_arithmetic() {
        unify_integers(&left.integral_promotion(), &right.integral_promotion())?
    } else {
        let (l, r) = (left.decay(), right.decay());
        match (l.is_pointer(), r.is_pointer()) {
            (true, true) if l == r => l,
            (true, false) if r.is_integer() => l,
            (false, true) if l.is_integer() => r,
            _ => return None,
        }
    };

    Some(ArithmeticConversion {
        convert_left: *left != common,
        convert_right: *right != common,
        common,
    })
}

fn unify_integers(left: &Type, right: &Type) -> Option<Type> {
    if left == right {
        return Some(left.clone());
    }

    let (left_rank, right_rank) = (left.rank()?, right.rank()?);
    if left.is_signed() == right.is_signed() {
        let wider = if left_rank >= right_rank { left } else { right };
        return Some(wider.clone());
    }

    let (signed, unsigned) = if left.is_signed() { (left, right) } else { (right, left) };
    let (signed_rank, unsigned_rank) = (signed.rank()?, unsigned.rank()?);

    Some(if unsigned_rank >= signed_rank {
        unsigned.clone()
    } else if signed.size() > unsigned.size() {
        signed.clone()
    } else {
        signed.to_unsigned()
    })
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Char => write!(f, "char"),
            Type::UnsignedChar => write!(f, "unsigned char"),
            Type::Short => write!(f, "short"),
            Type::UnsignedShort => write!(f, "unsigned short"),
            Type::Int => write!(f, "int"),
            Type::UnsignedInt => write!(f, "unsigned int"),
            Type::Long => write!(f, "long"),
            Type::UnsignedLong => write!(f, "unsigned long"),
            Type::Pointer(base) if base.is_pointer() => write!(f, "{base}*"),
            Type::Pointer(base) => write!(f, "{base} *"),
            Type::Array { element, size } => write!(f, "{element} [{size}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn common(a: Type, b: Type) -> Option<Type> {
        usual_arithmetic_conversion(&a, &b).map(|c| c.common)
    }

    #[test]
    fn test_sizes() {
        assert_eq!(Type::Char.size(), 1);
        assert_eq!(Type::UnsignedShort.size(), 2);
        assert_eq!(Type::Int.size(), 4);
        assert_eq!(Type::Long.size(), 8);
        assert_eq!(Type::pointer_to(Type::Char).size(), 8);
        assert_eq!(Type::array_of(Type::Short, 5).size(), 10);
    }

    #[test]
    fn test_oversized_array_size() {
        let huge = Type::array_of(Type::Long, 1 << 61);
        assert_eq!(huge.checked_size(), None);
        assert_eq!(huge.size(), u64::MAX);
        assert_eq!(Type::array_of(Type::Char, 1 << 40).checked_size(), Some(1 << 40));
    }

    #[test]
    fn test_promotion() {
        assert_eq!(Type::Char.integral_promotion(), Type::Int);
        assert_eq!(Type::UnsignedShort.integral_promotion(), Type::Int);
        assert_eq!(Type::UnsignedInt.integral_promotion(), Type::UnsignedInt);
        assert_eq!(Type::Long.integral_promotion(), Type::Long);
    }

    #[test]
    fn test_integer_unification() {
        assert_eq!(common(Type::Char, Type::Short), Some(Type::Int));
        assert_eq!(common(Type::Int, Type::Int), Some(Type::Int));
        assert_eq!(common(Type::Int, Type::Long), Some(Type::Long));
        assert_eq!(common(Type::UnsignedInt, Type::Int), Some(Type::UnsignedInt));
        assert_eq!(common(Type::UnsignedInt, Type::Long), Some(Type::Long));
        assert_eq!(common(Type::UnsignedLong, Type::Long), Some(Type::UnsignedLong));
        assert_eq!(common(Type::UnsignedChar, Type::UnsignedChar), Some(Type::Int));
    }

    #[test]
    fn test_conversion_flags() {
        let conv = usual_arithmetic_conversion(&Type::Int, &Type::Char).unwrap();
        assert_eq!(conv.common, Type::Int);
        assert!(!conv.convert_left);
        assert!(conv.convert_right);

        let conv = usual_arithmetic_conversion(&Type::Short, &Type::Short).unwrap();
        assert!(conv.convert_left && conv.convert_right);
    }

    #[test]
    fn test_pointer_unification() {
        let int_ptr = Type::pointer_to(Type::Int);
        assert_eq!(common(int_ptr.clone(), Type::Long), Some(int_ptr.clone()));
        assert_eq!(common(Type::Char, int_ptr.clone()), Some(int_ptr.clone()));
        assert_eq!(common(Type::array_of(Type::Int, 3), Type::Int), Some(int_ptr.clone()));
        assert_eq!(common(int_ptr.clone(), Type::array_of(Type::Int, 3)), Some(int_ptr.clone()));
        assert_eq!(common(int_ptr, Type::pointer_to(Type::Char)), None);
        assert_eq!(common(Type::Void, Type::Int), None);
    }

    #[test]
    fn test_truncate_constant() {
        assert_eq!(Type::Char.truncate_constant(300), 44);
        assert_eq!(Type::UnsignedChar.truncate_constant(-1), 255);
        assert_eq!(Type::Int.truncate_constant(1 << 31), -(1 << 31));
        assert_eq!(Type::UnsignedInt.truncate_constant(-1), 4_294_967_295);
        assert_eq!(Type::Long.truncate_constant(-5), -5);
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::UnsignedLong.to_string(), "unsigned long");
        assert_eq!(Type::pointer_to(Type::Int).to_string(), "int *");
        assert_eq!(Type::pointer_to(Type::pointer_to(Type::Char)).to_string(), "char **");
        assert_eq!(Type::array_of(Type::Char, 4).to_string(), "char [4]");
    }
}
