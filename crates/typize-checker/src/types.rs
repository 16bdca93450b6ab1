//! Type representation and interning.
//!
//! Types are interned into a `TypeInterner`; a `TypeId` is an index into it,
//! so type identity is id equality. Interning is lock-free on the read path
//! (`DashMap`) because the narrowing engine constructs types from many
//! threads at once.

use dashmap::DashMap;
use smallvec::SmallVec;
use std::sync::RwLock;
use typize_common::{FileId, SymbolId, TypeId};
use typize_parser::{NodeIndex, SyntaxKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IntrinsicKind {
    /// Unresolvable type.
    Error = 0,
    Object,
    Dynamic,
    Void,
    String,
    Bool,
    Byte,
    Char,
    Short,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Decimal,
}

impl IntrinsicKind {
    pub const ALL: [IntrinsicKind; 16] = [
        IntrinsicKind::Error,
        IntrinsicKind::Object,
        IntrinsicKind::Dynamic,
        IntrinsicKind::Void,
        IntrinsicKind::String,
        IntrinsicKind::Bool,
        IntrinsicKind::Byte,
        IntrinsicKind::Char,
        IntrinsicKind::Short,
        IntrinsicKind::Int,
        IntrinsicKind::UInt,
        IntrinsicKind::Long,
        IntrinsicKind::ULong,
        IntrinsicKind::Float,
        IntrinsicKind::Double,
        IntrinsicKind::Decimal,
    ];

    pub fn from_keyword(kind: SyntaxKind) -> Option<IntrinsicKind> {
        Some(match kind {
            SyntaxKind::ObjectKeyword => IntrinsicKind::Object,
            SyntaxKind::DynamicKeyword => IntrinsicKind::Dynamic,
            SyntaxKind::VoidKeyword => IntrinsicKind::Void,
            SyntaxKind::StringKeyword => IntrinsicKind::String,
            SyntaxKind::BoolKeyword => IntrinsicKind::Bool,
            SyntaxKind::ByteKeyword => IntrinsicKind::Byte,
            SyntaxKind::CharKeyword => IntrinsicKind::Char,
            SyntaxKind::ShortKeyword => IntrinsicKind::Short,
            SyntaxKind::IntKeyword => IntrinsicKind::Int,
            SyntaxKind::UIntKeyword => IntrinsicKind::UInt,
            SyntaxKind::LongKeyword => IntrinsicKind::Long,
            SyntaxKind::ULongKeyword => IntrinsicKind::ULong,
            SyntaxKind::FloatKeyword => IntrinsicKind::Float,
            SyntaxKind::DoubleKeyword => IntrinsicKind::Double,
            SyntaxKind::DecimalKeyword => IntrinsicKind::Decimal,
            _ => return None,
        })
    }

    /// Keyword spelling; `Error` has none.
    pub fn keyword(self) -> Option<&'static str> {
        Some(match self {
            IntrinsicKind::Error => return None,
            IntrinsicKind::Object => "object",
            IntrinsicKind::Dynamic => "dynamic",
            IntrinsicKind::Void => "void",
            IntrinsicKind::String => "string",
            IntrinsicKind::Bool => "bool",
            IntrinsicKind::Byte => "byte",
            IntrinsicKind::Char => "char",
            IntrinsicKind::Short => "short",
            IntrinsicKind::Int => "int",
            IntrinsicKind::UInt => "uint",
            IntrinsicKind::Long => "long",
            IntrinsicKind::ULong => "ulong",
            IntrinsicKind::Float => "float",
            IntrinsicKind::Double => "double",
            IntrinsicKind::Decimal => "decimal",
        })
    }

    /// `object` and `dynamic`: every value converts to them.
    pub fn is_top(self) -> bool {
        matches!(self, IntrinsicKind::Object | IntrinsicKind::Dynamic)
    }
}

pub type TypeArgs = SmallVec<[TypeId; 2]>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Intrinsic(IntrinsicKind),
    /// A class or interface, possibly constructed with type arguments.
    Named { symbol: SymbolId, args: TypeArgs },
    TypeParameter(SymbolId),
    Array(TypeId),
    Nullable(TypeId),
    /// The type of one anonymous object creation expression.
    Anonymous { file: FileId, node: NodeIndex },
}

pub struct TypeInterner {
    map: DashMap<TypeKey, TypeId>,
    keys: RwLock<Vec<TypeKey>>,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    pub fn new() -> Self {
        let interner = TypeInterner {
            map: DashMap::new(),
            keys: RwLock::new(Vec::new()),
        };
        // Intrinsics occupy the first ids, in `IntrinsicKind` order.
        for kind in IntrinsicKind::ALL {
            interner.intern(TypeKey::Intrinsic(kind));
        }
        interner
    }

    #[inline]
    pub fn intrinsic(&self, kind: IntrinsicKind) -> TypeId {
        TypeId(kind as u32)
    }

    #[inline]
    pub fn error(&self) -> TypeId {
        self.intrinsic(IntrinsicKind::Error)
    }

    pub fn intern(&self, key: TypeKey) -> TypeId {
        if let Some(id) = self.map.get(&key) {
            return *id;
        }
        // The entry lock serializes concurrent interning of the same key.
        *self.map.entry(key.clone()).or_insert_with(|| {
            let mut keys = match self.keys.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let id = TypeId(keys.len() as u32);
            keys.push(key);
            id
        })
    }

    pub fn lookup(&self, id: TypeId) -> Option<TypeKey> {
        let keys = match self.keys.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        keys.get(id.0 as usize).cloned()
    }

    pub fn named(&self, symbol: SymbolId, args: &[TypeId]) -> TypeId {
        self.intern(TypeKey::Named {
            symbol,
            args: args.iter().copied().collect(),
        })
    }

    pub fn len(&self) -> usize {
        match self.keys.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Type-parameter substitution for members reached through a constructed type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
    pairs: SmallVec<[(SymbolId, TypeId); 2]>,
}

impl Substitution {
    pub fn new() -> Self {
        Substitution::default()
    }

    pub fn from_pairs(params: &[SymbolId], args: &[TypeId]) -> Self {
        Substitution {
            pairs: params.iter().copied().zip(args.iter().copied()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, param: SymbolId) -> Option<TypeId> {
        self.pairs
            .iter()
            .find(|(p, _)| *p == param)
            .map(|&(_, t)| t)
    }

    /// Apply to `ty`, interning any new types.
    pub fn apply(&self, interner: &TypeInterner, ty: TypeId) -> TypeId {
        if self.is_empty() {
            return ty;
        }
        match interner.lookup(ty) {
            Some(TypeKey::TypeParameter(param)) => self.get(param).unwrap_or(ty),
            Some(TypeKey::Named { symbol, args }) if !args.is_empty() => {
                let args: TypeArgs = args.iter().map(|&a| self.apply(interner, a)).collect();
                interner.intern(TypeKey::Named { symbol, args })
            }
            Some(TypeKey::Array(elem)) => {
                let elem = self.apply(interner, elem);
                interner.intern(TypeKey::Array(elem))
            }
            Some(TypeKey::Nullable(elem)) => {
                let elem = self.apply(interner, elem);
                interner.intern(TypeKey::Nullable(elem))
            }
            _ => ty,
        }
    }
}
