// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Visibility};

/// `#[derive(Schema)]` macro: generates the struct's type descriptor and
/// its conversions to and from `bytecodec::Value`.
///
/// - Fields are encoded in declaration order.
/// - `#[bytecodec("...")]` carries the field annotation, e.g.
///   `#[bytecodec("gbk;length:4")]`.
/// - Fields that are not `pub` keep their position but are never encoded.
/// - Every field type must implement `bytecodec::Schema`; a field of type
///   `Option<Box<Self>>` or `Vec<Self>` makes the struct recursive.
///
/// Example:
/// ```ignore
/// use bytecodec::Schema;
///
/// #[derive(Schema)]
/// pub struct Packet {
///     pub header: Header,
///     #[bytecodec("bcd8421:6,true")]
///     pub phone: String,
///     #[bytecodec("lengthref:msg")]
///     pub msg_length: u8,
///     #[bytecodec("gbk")]
///     pub msg: String,
/// }
/// ```
#[proc_macro_derive(Schema, attributes(bytecodec))]
pub fn derive_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(&input.generics, "Generic structs are not supported")
            .to_compile_error()
            .into();
    }

    let name = &input.ident;
    let type_name = name.unraw().to_string();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            _ => {
                return syn::Error::new_spanned(&input, "Only named fields are supported")
                    .to_compile_error()
                    .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "Only structs are supported")
                .to_compile_error()
                .into()
        }
    };

    let mut field_defs: Vec<TokenStream2> = Vec::new();
    let mut to_values: Vec<TokenStream2> = Vec::new();
    let mut from_values: Vec<TokenStream2> = Vec::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            return syn::Error::new_spanned(field, "Field must have a name")
                .to_compile_error()
                .into();
        };
        let ty = &field.ty;
        let field_name = ident.unraw().to_string();

        let mut tag = String::new();
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("bytecodec")) {
            match attr.parse_args::<LitStr>() {
                Ok(lit) => {
                    if !tag.is_empty() {
                        tag.push(';');
                    }
                    tag.push_str(&lit.value());
                }
                Err(err) => return err.to_compile_error().into(),
            }
        }

        let mut def = quote! {
            ::bytecodec::FieldDef::new(#field_name, <#ty as ::bytecodec::Schema>::type_descriptor())
        };
        if !tag.is_empty() {
            def = quote! { #def.tagged(#tag) };
        }
        if !matches!(field.vis, Visibility::Public(_)) {
            def = quote! { #def.unexported() };
        }
        field_defs.push(def);

        to_values.push(quote! {
            ::bytecodec::Schema::to_value(&self.#ident)
        });

        from_values.push(quote! {
            #ident: match values.next() {
                ::core::option::Option::Some(v) => <#ty as ::bytecodec::Schema>::from_value(v)?,
                ::core::option::Option::None => {
                    return ::core::result::Result::Err(::bytecodec::Error::InvalidType {
                        expected: ::std::string::String::from(#type_name),
                        found: ::std::string::String::from("struct with too few fields"),
                    })
                }
            }
        });
    }

    let arity = field_defs.len();

    let expanded = quote! {
        impl ::bytecodec::Schema for #name {
            fn type_descriptor() -> ::bytecodec::TypeDescriptor {
                fn fields() -> ::std::vec::Vec<::bytecodec::FieldDef> {
                    ::std::vec![#(#field_defs),*]
                }
                static TYPE: ::std::sync::OnceLock<::bytecodec::StructType> =
                    ::std::sync::OnceLock::new();
                let ty = TYPE.get_or_init(|| ::bytecodec::StructType::lazy(#type_name, fields));
                ::bytecodec::TypeDescriptor::Struct(::core::clone::Clone::clone(ty))
            }

            fn to_value(&self) -> ::bytecodec::Value {
                ::bytecodec::Value::Struct(::std::vec![#(#to_values),*])
            }

            #[allow(unused_mut, unused_variables)]
            fn from_value(value: ::bytecodec::Value) -> ::bytecodec::Result<Self> {
                let values = match value {
                    ::bytecodec::Value::Struct(values) if values.len() == #arity => values,
                    other => {
                        return ::core::result::Result::Err(::bytecodec::Error::InvalidType {
                            expected: ::std::string::String::from(#type_name),
                            found: ::std::string::String::from(other.kind_name()),
                        })
                    }
                };
                let mut values = values.into_iter();
                ::core::result::Result::Ok(Self {
                    #(#from_values),*
                })
            }
        }
    };

    TokenStream::from(expanded)
}
