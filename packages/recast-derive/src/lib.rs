//! Derive macros for `recast`.
//!
//! `FromMap` wires a struct into map binding, `ToMap` renders one back out.
//! Both read the `#[recast("...")]` field attribute.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

/// Derive macro for binding maps onto structs.
///
/// Implements `recast::FromMap`, emitting one `recast::Field` per named
/// field, and `recast::FromValue`, so the struct nests inside other bound
/// structs and map-kind values convert straight into it. The struct must
/// implement `Default`; every bound field type must implement
/// `recast::FromValue`.
///
/// Lookup keys come from the `#[recast("...")]` attribute:
///
/// ```ignore
/// #[derive(FromMap, Default)]
/// struct Server {
///     host: String,            // untagged: bound by field name
///     #[recast("port,listen_port")]
///     port: u16,               // tagged: candidate keys in order
///     #[recast("")]
///     scratch: Vec<u8>,        // empty tag: never bound
/// }
/// ```
#[proc_macro_derive(FromMap, attributes(recast))]
pub fn derive_from_map(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_from_map(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Derive macro for rendering structs as maps.
///
/// Implements `recast::ToMap` keyed by field name and `From<Struct> for
/// recast::Data`, so instances nest as map-kind values; `Map::from(&Struct)`
/// follows from the blanket impl on `recast::ToMap`. Field tags do not
/// rename output keys; every field type must be `Clone` and convertible
/// into `recast::Data`.
///
/// ```ignore
/// #[derive(ToMap)]
/// struct Event {
///     name: String,
///     attempts: u32,
/// }
/// ```
#[proc_macro_derive(ToMap, attributes(recast))]
pub fn derive_to_map(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_to_map(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

struct FieldTag {
    keys: Vec<String>,
    skip: bool,
    tagged: bool,
}

/// Reads the `#[recast("...")]` attribute, if present.
///
/// The literal splits on `,` without trimming, so `"a, b"` names the keys
/// `"a"` and `" b"`. An empty literal opts the field out of binding.
fn field_tag(field: &syn::Field) -> Result<FieldTag, syn::Error> {
    for attr in &field.attrs {
        if !attr.path().is_ident("recast") {
            continue;
        }
        let lit: LitStr = attr.parse_args()?;
        let raw = lit.value();
        if raw.is_empty() {
            return Ok(FieldTag {
                keys: Vec::new(),
                skip: true,
                tagged: true,
            });
        }
        return Ok(FieldTag {
            keys: raw.split(',').map(str::to_owned).collect(),
            skip: false,
            tagged: true,
        });
    }
    Ok(FieldTag {
        keys: Vec::new(),
        skip: false,
        tagged: false,
    })
}

fn named_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> Result<&'a syn::punctuated::Punctuated<syn::Field, syn::Token![,]>, syn::Error> {
    if let Some(param) = input.generics.params.first() {
        return Err(syn::Error::new_spanned(
            param,
            format!("{derive} does not support generic structs"),
        ));
    }
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                &input.ident,
                format!("{derive} only supports structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            format!("{derive} only supports structs"),
        )),
    }
}

fn expand_from_map(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let fields = named_fields(input, "FromMap")?;

    let mut field_tokens = Vec::new();
    for field in fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_name = ident.to_string();
        let tag = field_tag(field)?;
        let keys = &tag.keys;
        let skip = tag.skip;
        let tagged = tag.tagged;
        // Skipped fields get a no-op assign so their types carry no bounds.
        let assign = if skip {
            quote! { |_, _, _| ::core::result::Result::Ok(()) }
        } else {
            quote! { |dest, value, ctx| value.to_in(&mut dest.#ident, ctx) }
        };
        field_tokens.push(quote! {
            ::recast::Field {
                name: #field_name,
                keys: &[#(#keys),*],
                skip: #skip,
                tagged: #tagged,
                assign: #assign,
            }
        });
    }

    Ok(quote! {
        impl ::recast::FromMap for #name {
            fn fields() -> &'static [::recast::Field<Self>] {
                static FIELDS: &[::recast::Field<#name>] = &[
                    #(#field_tokens),*
                ];
                FIELDS
            }
        }

        impl ::recast::FromValue for #name {
            fn from_value(
                value: &::recast::Value,
                ctx: &::recast::Context<'_>,
            ) -> ::core::result::Result<Self, ::recast::Error> {
                // A registered converter overrides the map-binding default.
                if let Some(claimed) = ctx.claim::<Self>(value) {
                    return claimed;
                }
                let map = value.as_map()?;
                let mut dest = <Self as ::core::default::Default>::default();
                map.to_in(&mut dest, ctx)?;
                ::core::result::Result::Ok(dest)
            }
        }
    })
}

fn expand_to_map(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let fields = named_fields(input, "ToMap")?;

    let mut insert_tokens = Vec::new();
    for field in fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_name = ident.to_string();
        insert_tokens.push(quote! {
            map.insert(#field_name, ::recast::Data::from(self.#ident.clone()));
        });
    }

    Ok(quote! {
        impl ::recast::ToMap for #name {
            fn to_map(&self) -> ::recast::Map {
                let mut map = ::recast::Map::new();
                #(#insert_tokens)*
                map
            }
        }

        impl ::core::convert::From<#name> for ::recast::Data {
            fn from(value: #name) -> Self {
                ::recast::Data::Map(::recast::ToMap::to_map(&value))
            }
        }
    })
}
