/// Binary operators, loosest binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Assignment
    /// Assign (`=`)
    Assign,
    /// Add and assign (`+=`)
    AddAssign,
    /// Subtract and assign (`-=`)
    SubtractAssign,
    /// Multiply and assign (`*=`)
    MultiplyAssign,
    /// Divide and assign (`/=`)
    DivideAssign,
    /// Modulo and assign (`%=`)
    ModuloAssign,

    // Logical
    /// Logical OR (`||`)
    Or,
    /// Logical AND (`&&`)
    And,

    // Comparison
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than (`<`)
    LessThan,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Modulo (`%`)
    Modulo,
    /// Power (`^`), parsed but without a value
    Power,
}

/// Tightest binding level in [`BinOp::precedence`].
pub const MAX_PRECEDENCE: u8 = 6;

const ALL: [BinOp; 20] = [
    BinOp::Assign,
    BinOp::AddAssign,
    BinOp::SubtractAssign,
    BinOp::MultiplyAssign,
    BinOp::DivideAssign,
    BinOp::ModuloAssign,
    BinOp::Or,
    BinOp::And,
    BinOp::Equal,
    BinOp::NotEqual,
    BinOp::GreaterEqual,
    BinOp::LessEqual,
    BinOp::GreaterThan,
    BinOp::LessThan,
    BinOp::Add,
    BinOp::Subtract,
    BinOp::Multiply,
    BinOp::Divide,
    BinOp::Modulo,
    BinOp::Power,
];

impl BinOp {
    pub fn symbol(self) -> &'static str {
        use BinOp::*;
        match self {
            Assign => "=",
            AddAssign => "+=",
            SubtractAssign => "-=",
            MultiplyAssign => "*=",
            DivideAssign => "/=",
            ModuloAssign => "%=",
            Or => "||",
            And => "&&",
            Equal => "==",
            NotEqual => "!=",
            GreaterEqual => ">=",
            LessEqual => "<=",
            GreaterThan => ">",
            LessThan => "<",
            Add => "+",
            Subtract => "-",
            Multiply => "*",
            Divide => "/",
            Modulo => "%",
            Power => "^",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<BinOp> {
        ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// Binding strength, 0 (assignment) to [`MAX_PRECEDENCE`] (power).
    pub fn precedence(self) -> u8 {
        use BinOp::*;
        match self {
            Assign | AddAssign | SubtractAssign | MultiplyAssign | DivideAssign | ModuloAssign => 0,
            Or => 1,
            And => 2,
            Equal | NotEqual | GreaterEqual | LessEqual | GreaterThan | LessThan => 3,
            Add | Subtract => 4,
            Multiply | Divide | Modulo => 5,
            Power => 6,
        }
    }

    pub fn is_assignment(self) -> bool {
        self.precedence() == 0
    }

    /// The arithmetic behind a compound assignment (`+=` is `+`).
    pub fn compound(self) -> Option<BinOp> {
        use BinOp::*;
        match self {
            AddAssign => Some(Add),
            SubtractAssign => Some(Subtract),
            MultiplyAssign => Some(Multiply),
            DivideAssign => Some(Divide),
            ModuloAssign => Some(Modulo),
            _ => None,
        }
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Boolean negation (`!`)
    Not,
    /// Numeric negation (`-`)
    Negate,
    /// Numeric identity (`+`)
    Plus,
}

impl UnaryOp {
    pub fn from_char(c: char) -> Option<UnaryOp> {
        match c {
            '!' => Some(UnaryOp::Not),
            '-' => Some(UnaryOp::Negate),
            '+' => Some(UnaryOp::Plus),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Negate => "-",
            UnaryOp::Plus => "+",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_round_trip() {
        for op in ALL {
            assert_eq!(BinOp::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(BinOp::from_symbol("=>"), None);
    }

    #[test]
    fn test_precedence_order() {
        assert!(BinOp::Assign.precedence() < BinOp::Or.precedence());
        assert!(BinOp::Or.precedence() < BinOp::And.precedence());
        assert!(BinOp::And.precedence() < BinOp::Equal.precedence());
        assert!(BinOp::Equal.precedence() < BinOp::Add.precedence());
        assert!(BinOp::Add.precedence() < BinOp::Multiply.precedence());
        assert_eq!(BinOp::Power.precedence(), MAX_PRECEDENCE);
    }
}
