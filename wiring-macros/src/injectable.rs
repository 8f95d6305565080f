//! `#[derive(Injectable)]` implementation.
//!
//! Turns the fields of a struct into a single constructor:
//!
//! ```ignore
//! #[derive(Injectable)]
//! struct Signup {
//!     store: Arc<dyn UserStore>,
//!     mailer: Option<Arc<dyn Mailer>>,
//!     #[inject(default)]
//!     attempts: u32,
//! }
//! ```
//!
//! Generates roughly:
//!
//! ```ignore
//! impl ::wiring::Injectable for Signup {
//!     fn constructors() -> Vec<::wiring::Constructor<Self>> {
//!         vec![::wiring::Constructor::new(
//!             "new",
//!             vec![TypeKey::of::<dyn UserStore>(), TypeKey::of::<dyn Mailer>()],
//!             |args| Ok(Self {
//!                 store: args.required::<dyn UserStore>()?,
//!                 mailer: args.optional::<dyn Mailer>()?,
//!                 attempts: Default::default(),
//!             }),
//!         )]
//!     }
//! }
//! ```

use darling::ast::{Data, Style};
use darling::util::Ignored;
use darling::{FromDeriveInput, FromField};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{DeriveInput, GenericArgument, PathArguments, Type};

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(injectable), supports(struct_named, struct_unit))]
struct InjectableInput {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<Ignored, InjectableField>,
    /// Label of the generated constructor.
    #[darling(default)]
    constructor: Option<String>,
    /// Trait-object contracts the struct can be registered under.
    #[darling(multiple)]
    provides: Vec<Type>,
}

#[derive(Debug, FromField)]
#[darling(attributes(inject))]
struct InjectableField {
    ident: Option<syn::Ident>,
    ty: Type,
    #[darling(default)]
    default: bool,
}

/// How a field is filled.
enum FieldKind<'a> {
    Required(&'a Type),
    Optional(&'a Type),
    Default,
}

/// Entry point for the `#[derive(Injectable)]` macro.
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = match syn::parse2::<DeriveInput>(input) {
        Ok(input) => input,
        Err(e) => return e.to_compile_error(),
    };

    let parsed = match InjectableInput::from_derive_input(&input) {
        Ok(parsed) => parsed,
        Err(e) => return e.write_errors(),
    };

    expand(&parsed).unwrap_or_else(|e| e.to_compile_error())
}

fn expand(input: &InjectableInput) -> syn::Result<TokenStream> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(fields) = &input.data else {
        return Err(syn::Error::new(
            ident.span(),
            "Injectable can only be derived for structs",
        ));
    };

    let args = if fields.iter().any(|f| !f.default) {
        format_ident!("args")
    } else {
        format_ident!("_args")
    };

    let mut params = Vec::new();
    let mut inits = Vec::new();
    for field in fields.iter() {
        let Some(name) = &field.ident else {
            continue;
        };
        match classify(field)? {
            FieldKind::Required(inner) => {
                params.push(inner);
                inits.push(quote! { #name: #args.required::<#inner>()? });
            }
            FieldKind::Optional(inner) => {
                params.push(inner);
                inits.push(quote! { #name: #args.optional::<#inner>()? });
            }
            FieldKind::Default => {
                inits.push(quote! { #name: ::core::default::Default::default() });
            }
        }
    }

    let body = if fields.style == Style::Unit {
        quote! { Self }
    } else {
        quote! { Self { #(#inits),* } }
    };

    let label = input.constructor.as_deref().unwrap_or("new");

    let contracts = input.provides.iter().map(|contract| {
        quote! {
            impl #impl_generics ::wiring::Contract<#contract> for #ident #ty_generics #where_clause {
                #[inline]
                fn into_contract(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<#contract> {
                    self
                }
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::wiring::Injectable for #ident #ty_generics #where_clause {
            fn constructors() -> ::std::vec::Vec<::wiring::Constructor<Self>> {
                ::std::vec![::wiring::Constructor::new(
                    #label,
                    ::std::vec![#(::wiring::TypeKey::of::<#params>()),*],
                    |#args: &mut ::wiring::Arguments| ::std::result::Result::Ok(#body),
                )]
            }
        }

        #(#contracts)*
    })
}

fn classify(field: &InjectableField) -> syn::Result<FieldKind<'_>> {
    if field.default {
        return Ok(FieldKind::Default);
    }
    if let Some(inner) = single_argument(&field.ty, "Arc") {
        return Ok(FieldKind::Required(inner));
    }
    if let Some(inner) = single_argument(&field.ty, "Option").and_then(|t| single_argument(t, "Arc")) {
        return Ok(FieldKind::Optional(inner));
    }
    Err(syn::Error::new(
        field.ty.span(),
        "injectable fields must be `Arc<T>`, `Option<Arc<T>>`, or marked `#[inject(default)]`",
    ))
}

/// Returns `T` if `ty` is `Wrapper<T>` (any path prefix).
fn single_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(generic) = &segment.arguments else {
        return None;
    };
    if generic.args.len() != 1 {
        return None;
    }
    match generic.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
