//! Procedural macros for Wiring.
//!
//! * `#[derive(Injectable)]` - generates the constructor table of a struct
//!   from its fields, plus `Contract` impls for declared trait objects

use proc_macro::TokenStream;

mod injectable;

/// Derives `Injectable` for a struct with named fields or a unit struct.
///
/// Field rules:
/// * `Arc<T>` - required constructor parameter `T`
/// * `Option<Arc<T>>` - optional parameter `T`, `None` when unresolved
/// * `#[inject(default)]` - not a parameter, filled with `Default::default()`
///
/// Struct attributes:
/// * `#[injectable(constructor = "name")]` - label of the generated constructor
/// * `#[injectable(provides = "dyn Trait")]` - repeatable, implements `Contract<dyn Trait>`
///
/// ```ignore
/// #[derive(Injectable)]
/// #[injectable(provides = "dyn SignupFlow")]
/// struct Signup {
///     store: Arc<dyn UserStore>,
///     mailer: Option<Arc<dyn Mailer>>,
///     #[inject(default)]
///     attempts: u32,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(injectable, inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input.into()).into()
}
