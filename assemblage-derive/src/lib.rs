//! Derive macros for the assemblage composition kernel.
//!
//! - `#[derive(Assemblage)]` — generate `Assemblage::construct` (and the
//!   `inject` half of `Assemblage::definition`) from field attributes,
//!   instead of hand-writing a `Resolver` call per field.
//! - `#[derive(Transversal)]` — generate an `engage()` function from
//!   struct-level `#[before]`/`#[after]`/`#[around]` attributes, for use
//!   in `AssemblageDef::engage`.
//!
//! # `Assemblage` field attributes
//!
//! - `#[context]` — field type `PublicContext`.
//! - `#[configuration]` — field type `Arc<T>`; fails with
//!   `UnresolvedParameter` if the entry has no configuration object of
//!   type `T`.
//! - `#[dispose]` — field type `DisposeHandle`.
//! - `#[use_("channel")]` / `#[global("channel")]` — field type `Arc<T>`,
//!   resolved by identifier instead of by type.
//! - no attribute, field type `Arc<T>` — the common case: resolved by
//!   `T`'s own identifier, and added to `definition()`'s `inject` list.
//! - no attribute, any other field type — `Default::default()`.
//!
//! ```rust,ignore
//! use assemblage::prelude::*;
//! use assemblage_derive::Assemblage;
//!
//! #[derive(Assemblage)]
//! struct UserService {
//!     db: Arc<Database>,
//!     #[context]
//!     ctx: PublicContext,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Lit, Meta, Type};

#[proc_macro_derive(
    Assemblage,
    attributes(context, configuration, dispose, use_, global)
)]
pub fn derive_assemblage(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    &input,
                    "Assemblage can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "Assemblage can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let mut field_inits = Vec::new();
    let mut inject_calls = Vec::new();

    for field in fields.iter() {
        let field_name = field.ident.as_ref().unwrap();
        let field_type = &field.ty;
        let slot = field_name.to_string();

        match classify_field(&field.attrs) {
            Ok(Some(FieldSource::Context)) => {
                field_inits.push(quote! { #field_name: resolver.context() });
            }
            Ok(Some(FieldSource::Configuration)) => {
                let inner = match extract_arc_inner_type(field_type) {
                    Some(inner) => inner,
                    None => {
                        return syn::Error::new_spanned(
                            field_type,
                            "#[configuration] fields must have type Arc<T>",
                        )
                        .to_compile_error()
                        .into();
                    }
                };
                field_inits.push(quote! {
                    #field_name: resolver.configuration::<#inner>().ok_or_else(|| {
                        ::assemblage::DiError::unresolved_parameter(
                            ::std::any::type_name::<#inner>(),
                            #slot,
                        )
                    })?
                });
            }
            Ok(Some(FieldSource::Dispose)) => {
                field_inits.push(quote! { #field_name: resolver.dispose_handle() });
            }
            Ok(Some(FieldSource::Use(channel))) => {
                let inner = match extract_arc_inner_type(field_type) {
                    Some(inner) => inner,
                    None => {
                        return syn::Error::new_spanned(
                            field_type,
                            "#[use_(\"name\")] fields must have type Arc<T>",
                        )
                        .to_compile_error()
                        .into();
                    }
                };
                field_inits.push(quote! {
                    #field_name: resolver
                        .use_identifier(::assemblage::Identifier::tag(#channel))?
                        .downcast::<#inner>()
                        .map_err(|_| ::assemblage::DiError::unresolved_parameter(#channel, #slot))?
                });
            }
            Ok(Some(FieldSource::Global(channel))) => {
                let inner = match extract_arc_inner_type(field_type) {
                    Some(inner) => inner,
                    None => {
                        return syn::Error::new_spanned(
                            field_type,
                            "#[global(\"name\")] fields must have type Arc<T>",
                        )
                        .to_compile_error()
                        .into();
                    }
                };
                field_inits.push(quote! {
                    #field_name: resolver
                        .global_identifier(::assemblage::Identifier::tag(#channel))?
                        .downcast::<#inner>()
                        .map_err(|_| ::assemblage::DiError::unresolved_parameter(#channel, #slot))?
                });
            }
            Ok(None) => {
                if let Some(inner) = extract_arc_inner_type(field_type) {
                    field_inits.push(quote! { #field_name: resolver.dep::<#inner>(#slot)? });
                    inject_calls.push(quote! {
                        ::assemblage::InjectionTuple::concrete::<#inner>()
                    });
                } else {
                    field_inits.push(quote! {
                        #field_name: ::std::default::Default::default()
                    });
                }
            }
            Err(err) => return err.to_compile_error().into(),
        }
    }

    let expanded = quote! {
        impl #impl_generics ::assemblage::Assemblage for #name #ty_generics #where_clause {
            fn definition() -> ::assemblage::AssemblageDef {
                ::assemblage::AssemblageDef::new()
                    #(.inject(#inject_calls))*
            }

            fn construct(resolver: &::assemblage::Resolver<'_>) -> ::assemblage::Result<Self> {
                Ok(Self {
                    #(#field_inits),*
                })
            }
        }
    };

    TokenStream::from(expanded)
}

enum FieldSource {
    Context,
    Configuration,
    Dispose,
    Use(String),
    Global(String),
}

fn classify_field(attrs: &[Attribute]) -> syn::Result<Option<FieldSource>> {
    for attr in attrs {
        if attr.path().is_ident("context") {
            return Ok(Some(FieldSource::Context));
        }
        if attr.path().is_ident("configuration") {
            return Ok(Some(FieldSource::Configuration));
        }
        if attr.path().is_ident("dispose") {
            return Ok(Some(FieldSource::Dispose));
        }
        if attr.path().is_ident("use_") {
            return Ok(Some(FieldSource::Use(parse_single_string_arg(attr)?)));
        }
        if attr.path().is_ident("global") {
            return Ok(Some(FieldSource::Global(parse_single_string_arg(attr)?)));
        }
    }
    Ok(None)
}

fn parse_single_string_arg(attr: &Attribute) -> syn::Result<String> {
    let expr: Expr = attr.parse_args()?;
    match expr {
        Expr::Lit(lit) => match lit.lit {
            Lit::Str(s) => Ok(s.value()),
            _ => Err(syn::Error::new_spanned(lit, "expected a string literal")),
        },
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

/// Extract `T` from `Arc<T>`.
fn extract_arc_inner_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident == "Arc" {
            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                    return Some(inner);
                }
            }
        }
    }
    None
}

// =============================================================================
// Transversal derive
// =============================================================================

struct AdviceSpec {
    kind: &'static str,
    pointcut: String,
    priority: i64,
    handler: syn::Path,
}

#[proc_macro_derive(Transversal, attributes(before, after, around))]
pub fn derive_transversal(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut specs = Vec::new();
    for attr in &input.attrs {
        let kind = if attr.path().is_ident("before") {
            "before"
        } else if attr.path().is_ident("after") {
            "after"
        } else if attr.path().is_ident("around") {
            "around"
        } else {
            continue;
        };

        match parse_advice_spec(kind, attr) {
            Ok(spec) => specs.push(spec),
            Err(err) => return err.to_compile_error().into(),
        }
    }

    let engage_entries = specs.iter().map(|spec| {
        let pointcut = &spec.pointcut;
        let priority = spec.priority;
        let handler = &spec.handler;
        match spec.kind {
            "before" => quote! {
                ::assemblage::Advice::before(
                    ::assemblage::Pointcut::parse(#pointcut).expect("valid pointcut"),
                    #priority as i32,
                    ::std::sync::Arc::new(|ctx| ::std::boxed::Box::pin(#handler(ctx))),
                )
            },
            "after" => quote! {
                ::assemblage::Advice::after(
                    ::assemblage::Pointcut::parse(#pointcut).expect("valid pointcut"),
                    #priority as i32,
                    ::std::sync::Arc::new(|ctx| ::std::boxed::Box::pin(#handler(ctx))),
                )
            },
            _ => quote! {
                ::assemblage::Advice::around(
                    ::assemblage::Pointcut::parse(#pointcut).expect("valid pointcut"),
                    #priority as i32,
                    ::std::sync::Arc::new(|ctx, proceed| ::std::boxed::Box::pin(#handler(ctx, proceed))),
                )
            },
        }
    });

    let expanded = quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// The advice this type engages, for use in `AssemblageDef::engage`.
            pub fn engage() -> ::std::vec::Vec<::assemblage::Advice> {
                ::std::vec![#(#engage_entries),*]
            }
        }
    };

    TokenStream::from(expanded)
}

fn parse_advice_spec(kind: &'static str, attr: &Attribute) -> syn::Result<AdviceSpec> {
    let mut pointcut = None;
    let mut priority = 0i64;
    let mut handler = None;

    if let Meta::List(_) = &attr.meta {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("pointcut") {
                let value: syn::LitStr = meta.value()?.parse()?;
                pointcut = Some(value.value());
            } else if meta.path.is_ident("priority") {
                let value: syn::LitInt = meta.value()?.parse()?;
                priority = value.base10_parse()?;
            } else if meta.path.is_ident("handler") {
                let value: syn::LitStr = meta.value()?.parse()?;
                handler = Some(syn::parse_str::<syn::Path>(&value.value())?);
            } else {
                return Err(meta.error("unrecognized advice attribute key"));
            }
            Ok(())
        })?;
    }

    let pointcut = pointcut.ok_or_else(|| {
        syn::Error::new(Span::call_site(), format!("#[{kind}] requires `pointcut = \"...\"`"))
    })?;
    let handler = handler.ok_or_else(|| {
        syn::Error::new(Span::call_site(), format!("#[{kind}] requires `handler = \"...\"`"))
    })?;

    Ok(AdviceSpec {
        kind,
        pointcut,
        priority,
        handler,
    })
}
