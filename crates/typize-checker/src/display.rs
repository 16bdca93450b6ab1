//! Human-readable type names for diagnostics.

use crate::program::Program;
use crate::types::TypeKey;
use typize_common::{SymbolId, TypeId};

impl Program {
    /// `List<Item>`, `int?`, `Outer.Inner`, `T[]`. The error type prints as `?`.
    pub fn display_type(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty);
        out
    }

    fn write_type(&self, out: &mut String, ty: TypeId) {
        match self.interner.lookup(ty) {
            Some(TypeKey::Intrinsic(kind)) => out.push_str(kind.keyword().unwrap_or("?")),
            Some(TypeKey::Named { symbol, args }) => {
                out.push_str(&self.nested_type_name(symbol));
                if !args.is_empty() {
                    out.push('<');
                    for (i, &arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.write_type(out, arg);
                    }
                    out.push('>');
                }
            }
            Some(TypeKey::TypeParameter(param)) => out.push_str(&self.symbol_name(param)),
            Some(TypeKey::Array(elem)) => {
                self.write_type(out, elem);
                out.push_str("[]");
            }
            Some(TypeKey::Nullable(elem)) => {
                self.write_type(out, elem);
                out.push('?');
            }
            Some(TypeKey::Anonymous { .. }) => out.push_str("<anonymous type>"),
            None => out.push('?'),
        }
    }

    /// Name of a type prefixed by its enclosing types, without namespace.
    pub fn nested_type_name(&self, sym: SymbolId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(sym);
        while let Some(id) = current {
            let Some(s) = self.symbol(id) else {
                break;
            };
            if !s.kind.is_type() {
                break;
            }
            segments.push(s.name.as_str());
            current = s.parent;
        }
        segments.reverse();
        segments.join(".")
    }
}
