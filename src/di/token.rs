//! Injection tokens.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TokenKey {
    Type(TypeId),
    Named(&'static str),
}

/// Key under which a value is provided and looked up.
///
/// Type tokens compare by `TypeId`, named tokens by name.
#[derive(Debug, Clone, Copy)]
pub struct Token {
    key: TokenKey,
    name: &'static str,
}

impl Token {
    /// Token identifying the type `T` (component types use this).
    pub fn of<T: 'static>() -> Self {
        Self {
            key: TokenKey::Type(TypeId::of::<T>()),
            name: short_type_name(std::any::type_name::<T>()),
        }
    }

    pub const fn named(name: &'static str) -> Self {
        Self {
            key: TokenKey::Named(name),
            name,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Token of the renderer factory used for bootstrap.
pub const RENDERER_FACTORY: Token = Token::named("RendererFactory");

/// Token of the optional sanitizer.
pub const SANITIZER: Token = Token::named("Sanitizer");

/// `my_crate::module::Type` -> `Type`. Generic arguments are kept as-is.
fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
