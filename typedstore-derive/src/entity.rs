use crate::convertible::ignored_fields;
use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use syn::{DataStruct, DeriveInput, LitStr, Result};

fn parse_field(meta: &syn::meta::ParseNestedMeta, what: &str) -> Result<String> {
    let mut field: Option<String> = None;
    meta.parse_nested_meta(|nested| {
        if nested.path.is_ident("field") {
            let value = nested.value()?;
            let s: LitStr = value.parse()?;
            field = Some(s.value());
            Ok(())
        } else {
            Err(nested.error(format!("Unknown {} attribute", what)))
        }
    })?;
    field.ok_or_else(|| meta.error(format!("{} requires a field", what)))
}

pub(crate) fn generate_entity_for_struct(
    ast: &DeriveInput,
    data: &DataStruct,
) -> Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let mut entity_name = name.to_string();
    let mut id_field: Option<String> = None;
    let mut version_field: Option<String> = None;

    for attr in &ast.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    entity_name = s.value();
                    Ok(())
                } else if meta.path.is_ident("id") {
                    if id_field.is_some() {
                        return Err(meta.error("Multiple id attributes are not allowed"));
                    }
                    id_field = Some(parse_field(&meta, "id")?);
                    Ok(())
                } else if meta.path.is_ident("version") {
                    if version_field.is_some() {
                        return Err(meta.error("Multiple version attributes are not allowed"));
                    }
                    version_field = Some(parse_field(&meta, "version")?);
                    Ok(())
                } else {
                    Err(meta.error("Unknown entity attribute"))
                }
            })?
        }
    }

    let ignored = ignored_fields(&ast.attrs)?;
    let field_names: Vec<String> = data
        .fields
        .iter()
        .filter_map(|field| field.ident.as_ref().map(|ident| ident.to_string()))
        .filter(|field| !ignored.contains(field))
        .collect();

    let find_field = |field_name: &str| {
        data.fields.iter().find(|field| {
            field
                .ident
                .as_ref()
                .is_some_and(|ident| ident == field_name)
        })
    };

    let id_type = match &id_field {
        Some(id_field_name) => match find_field(id_field_name) {
            Some(field) => field.ty.to_token_stream(),
            None => {
                return Err(syn::Error::new_spanned(
                    ast,
                    format!("Field {} not found in struct", id_field_name),
                ))
            }
        },
        None => quote! { () },
    };

    if let Some(version_field_name) = &version_field {
        if find_field(version_field_name).is_none() {
            return Err(syn::Error::new_spanned(
                ast,
                format!("Field {} not found in struct", version_field_name),
            ));
        }
    }

    let entity_id_code = match &id_field {
        Some(id_field) => quote! {
            fn entity_id(&self) -> Option<typedstore::entity::EntityId> {
                Some(typedstore::entity::EntityId::new(#id_field))
            }
        },
        None => quote! {
            fn entity_id(&self) -> Option<typedstore::entity::EntityId> {
                None
            }
        },
    };

    let entity_version_code = match &version_field {
        Some(version_field) => quote! {
            fn entity_version(&self) -> Option<String> {
                Some(#version_field.to_string())
            }
        },
        None => quote! {
            fn entity_version(&self) -> Option<String> {
                None
            }
        },
    };

    let gen = quote! {
        impl #impl_generics typedstore::entity::DocumentEntity for #name #ty_generics #where_clause {
            type Id = #id_type;

            fn entity_name(&self) -> String {
                #entity_name.to_string()
            }

            #entity_id_code

            #entity_version_code

            fn entity_fields(&self) -> Vec<String> {
                vec![#(#field_names.to_string()),*]
            }
        }
    };

    Ok(TokenStream::from(gen))
}
