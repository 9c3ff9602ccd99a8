//! Extension constants.
//!
//! An extension declares a family of literals (for instance blockchain
//! addresses) recognized from their lexeme, carried through the AST as
//! [`ExtValue`] and typed as a named constant type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// A literal of an extension kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ExtValue {
    pub kind: String,
    pub raw: String,
}

impl fmt::Display for ExtValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

pub trait Extension: fmt::Debug {
    /// Kind tag stored in [`ExtValue::kind`].
    fn kind(&self) -> &str;

    /// Whether a lexeme (identifier, number or string contents) is a literal of this kind.
    fn matches(&self, lexeme: &str) -> bool;

    /// Constant type name used by inference.
    fn type_name(&self) -> &str {
        self.kind()
    }

    /// Normalized raw text stored for a matching lexeme.
    fn rewrite(&self, lexeme: &str) -> String {
        lexeme.to_string()
    }

    /// Build the literal for a lexeme, if it matches.
    fn literal(&self, lexeme: &str) -> Option<ExtValue> {
        self.matches(lexeme)
            .then(|| ExtValue { kind: self.kind().to_string(), raw: self.rewrite(lexeme) })
    }

    /// Whether a literal belongs to this extension.
    fn is_instance(&self, value: &ExtValue) -> bool {
        value.kind == self.kind()
    }
}

pub type ExtensionRef = Rc<dyn Extension>;

/// First extension accepting `lexeme`.
pub fn recognize(exts: &[ExtensionRef], lexeme: &str) -> Option<ExtValue> {
    exts.iter().find_map(|e| e.literal(lexeme))
}
