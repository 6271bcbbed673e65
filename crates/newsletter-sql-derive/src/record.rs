//! Record derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

use crate::attrs::{Mapping, field_mapping};
use crate::sql_ident::{ColumnSet, parse_column};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let mut columns = ColumnSet::default();
    let mut entries = Vec::with_capacity(fields.len());

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = ident.unraw().to_string();

        let entry = match field_mapping(field)? {
            Mapping::Column(lit) => {
                let column = parse_column(&lit)?;
                columns.insert(&column, &field_name, lit.span())?;
                let ty = &field.ty;
                quote! {
                    ::newsletter_sql::Field::new(
                        #field_name,
                        #column,
                        <#ty as ::newsletter_sql::SqlType>::category(),
                        |r: &#name| <#ty as ::newsletter_sql::SqlType>::to_sql_value(&r.#ident),
                    )
                }
            }
            Mapping::Excluded(tag) => quote! {
                ::newsletter_sql::Field::excluded(#field_name, #tag)
            },
        };
        entries.push(entry);
    }

    let record_name = name.unraw().to_string();

    Ok(quote! {
        impl ::newsletter_sql::Record for #name {
            fn fields() -> &'static [::newsletter_sql::Field<Self>] {
                static FIELDS: ::std::sync::OnceLock<::std::vec::Vec<::newsletter_sql::Field<#name>>> =
                    ::std::sync::OnceLock::new();
                FIELDS.get_or_init(|| ::std::vec![#(#entries),*])
            }

            fn record_name() -> &'static str {
                #record_name
            }
        }

        ::newsletter_sql::inventory::submit! {
            ::newsletter_sql::RecordRegistration {
                name: #record_name,
                describe: ::newsletter_sql::catalog::descriptors_of::<#name>,
            }
        }
    })
}
