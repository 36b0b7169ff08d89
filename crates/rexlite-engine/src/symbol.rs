//! Matchable symbols and the classes built from them.

use std::fmt;

/// The atomic unit a single input character is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Literal(char),
    /// `.`: any character, newline included.
    Wildcard,
    /// `lo-hi` inside a bracket class, inclusive on both ends.
    Range(char, char),
    /// `\d`
    Digit,
    /// `\D`
    NonDigit,
    /// `\s`
    Space,
    /// `\S`
    NonSpace,
    /// `\w`
    WordChar,
    /// `\W`
    NonWordChar,
}

impl Symbol {
    /// The predefined class named by a backslash shorthand, if any.
    pub fn from_shorthand(c: char) -> Option<Symbol> {
        match c {
            'd' => Some(Symbol::Digit),
            'D' => Some(Symbol::NonDigit),
            's' => Some(Symbol::Space),
            'S' => Some(Symbol::NonSpace),
            'w' => Some(Symbol::WordChar),
            'W' => Some(Symbol::NonWordChar),
            _ => None,
        }
    }

    /// The symbol produced by `\c`: a shorthand class or the literal `c`.
    pub fn escaped(c: char) -> Symbol {
        Symbol::from_shorthand(c).unwrap_or(Symbol::Literal(c))
    }

    pub fn matches(&self, c: char) -> bool {
        match *self {
            Symbol::Literal(l) => c == l,
            Symbol::Wildcard => true,
            Symbol::Range(lo, hi) => lo <= c && c <= hi,
            Symbol::Digit => c.is_ascii_digit(),
            Symbol::NonDigit => !c.is_ascii_digit(),
            Symbol::Space => is_space(c),
            Symbol::NonSpace => !is_space(c),
            Symbol::WordChar => is_word(c),
            Symbol::NonWordChar => !is_word(c),
        }
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C')
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn write_literal(f: &mut fmt::Formatter<'_>, c: char, in_class: bool) -> fmt::Result {
    let special = if in_class {
        matches!(c, '\\' | ']' | '-')
    } else {
        matches!(
            c,
            '\\' | '.' | '[' | ']' | '(' | ')' | '|' | '^' | '+' | '*' | '?' | '{' | '}'
        )
    };
    match c {
        '\n' => f.write_str("\\n"),
        '\t' => f.write_str("\\t"),
        '\r' => f.write_str("\\r"),
        c if special => write!(f, "\\{}", c),
        c => write!(f, "{}", c),
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Symbol::Literal(c) => write_literal(f, c, false),
            Symbol::Wildcard => f.write_str("."),
            Symbol::Range(lo, hi) => {
                write_literal(f, lo, true)?;
                f.write_str("-")?;
                write_literal(f, hi, true)
            }
            Symbol::Digit => f.write_str("\\d"),
            Symbol::NonDigit => f.write_str("\\D"),
            Symbol::Space => f.write_str("\\s"),
            Symbol::NonSpace => f.write_str("\\S"),
            Symbol::WordChar => f.write_str("\\w"),
            Symbol::NonWordChar => f.write_str("\\W"),
        }
    }
}

/// An ordered OR-set of symbols: a character matches the class when it
/// matches any member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Class {
    symbols: Vec<Symbol>,
}

impl Class {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(symbol: Symbol) -> Self {
        Self {
            symbols: vec![symbol],
        }
    }

    pub fn push(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn matches(&self, c: char) -> bool {
        self.symbols.iter().any(|s| s.matches(c))
    }
}

impl FromIterator<Symbol> for Class {
    fn from_iter<T: IntoIterator<Item = Symbol>>(iter: T) -> Self {
        Self {
            symbols: iter.into_iter().collect(),
        }
    }
}

/// Renders the class back in pattern syntax: a lone symbol bare, anything
/// else as a bracket class.
impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [symbol] = self.symbols.as_slice() {
            return write!(f, "{}", symbol);
        }
        f.write_str("[")?;
        for symbol in &self.symbols {
            match *symbol {
                Symbol::Literal(c) => write_literal(f, c, true)?,
                Symbol::Wildcard => f.write_str(".")?,
                other => write!(f, "{}", other)?,
            }
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_and_wildcard() {
        assert!(Symbol::Literal('a').matches('a'));
        assert!(!Symbol::Literal('a').matches('A'));
        assert!(Symbol::Wildcard.matches('\n'));
        assert!(Symbol::Wildcard.matches('é'));
    }

    #[test]
    fn test_range_is_inclusive() {
        let range = Symbol::Range('b', 'd');
        assert!(!range.matches('a'));
        assert!(range.matches('b'));
        assert!(range.matches('d'));
        assert!(!range.matches('e'));
    }

    #[test]
    fn test_shorthand_classes() {
        assert!(Symbol::Digit.matches('7'));
        assert!(!Symbol::Digit.matches('x'));
        assert!(Symbol::NonDigit.matches('x'));
        assert!(Symbol::Space.matches('\x0B'));
        assert!(!Symbol::NonSpace.matches('\t'));
        assert!(Symbol::WordChar.matches('_'));
        assert!(!Symbol::WordChar.matches('-'));
        assert!(Symbol::NonWordChar.matches('-'));
        // ASCII only
        assert!(!Symbol::Digit.matches('٣'));
        assert!(!Symbol::WordChar.matches('é'));
    }

    #[test]
    fn test_escaped() {
        assert_eq!(Symbol::escaped('d'), Symbol::Digit);
        assert_eq!(Symbol::escaped('.'), Symbol::Literal('.'));
        assert_eq!(Symbol::escaped('n'), Symbol::Literal('n'));
    }

    #[test]
    fn test_class_is_union() {
        let class: Class = [Symbol::Literal('x'), Symbol::Range('0', '3')]
            .into_iter()
            .collect();
        assert!(class.matches('x'));
        assert!(class.matches('2'));
        assert!(!class.matches('4'));
        assert!(!Class::new().matches('x'));
    }

    #[test]
    fn test_display() {
        assert_eq!(Class::single(Symbol::Literal('+')).to_string(), "\\+");
        assert_eq!(Class::single(Symbol::Digit).to_string(), "\\d");
        let class: Class = [
            Symbol::Range('a', 'c'),
            Symbol::Literal('-'),
            Symbol::Literal('.'),
            Symbol::Space,
        ]
        .into_iter()
        .collect();
        assert_eq!(class.to_string(), "[a-c\\-.\\s]");
    }
}
