use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use quote::quote;
use syn::{Attribute, DataEnum, DataStruct, DeriveInput, Field, LitStr, Result, Type};

/// Reads `#[converter(ignored = "a, b")]` from the type's attributes.
pub(crate) fn ignored_fields(attrs: &[Attribute]) -> Result<Vec<String>> {
    let mut ignored_fields: Vec<String> = vec![];
    for attr in attrs {
        if attr.path().is_ident("converter") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("ignored") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    ignored_fields.extend(
                        s.value()
                            .split(',')
                            .map(|field| field.trim().to_string())
                            .filter(|field| !field.is_empty()),
                    );
                    Ok(())
                } else {
                    Err(meta.error("Unknown converter attribute"))
                }
            })?
        }
    }
    Ok(ignored_fields)
}

// A missing or null field falls back to the field type's default.
fn field_initializer(
    ident: &Ident,
    name: &str,
    ty: &Type,
    source: &Ident,
    ignored: bool,
) -> proc_macro2::TokenStream {
    if ignored {
        quote! { #ident: Default::default() }
    } else {
        quote! {
            #ident: match #source.get(#name)? {
                typedstore::common::Value::Null => Default::default(),
                ref field => typedstore::common::from_value::<#ty>(field)?,
            }
        }
    }
}

pub(crate) fn generate_convertible_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let ignored = ignored_fields(&ast.attrs)?;

    let fields: Vec<&Field> = match &data.fields {
        syn::Fields::Named(ref fields) => fields.named.iter().collect(),
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                "only structs with named fields are supported",
            ))
        }
    };

    let persisted_idents: Vec<&Ident> = fields
        .iter()
        .filter_map(|f| f.ident.as_ref())
        .filter(|ident| !ignored.contains(&ident.to_string()))
        .collect();
    let persisted_names: Vec<String> = persisted_idents.iter().map(|i| i.to_string()).collect();

    let source = Ident::new("doc", Span::call_site());
    let initializers: Vec<proc_macro2::TokenStream> = fields
        .iter()
        .filter_map(|f| f.ident.as_ref().map(|ident| (ident, &f.ty)))
        .map(|(ident, ty)| {
            let name = ident.to_string();
            let is_ignored = ignored.contains(&name);
            field_initializer(ident, &name, ty, &source, is_ignored)
        })
        .collect();

    let name = &ast.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let gen = quote! {
        impl #impl_generics typedstore::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> typedstore::errors::TypedStoreResult<typedstore::common::Value> {
                use typedstore::common::Convertible as _;
                let mut doc = typedstore::document::Document::new();
                #(doc.put(#persisted_names, self.#persisted_idents.to_value()?)?;)*
                Ok(typedstore::common::Value::Document(doc))
            }

            fn from_value(value: &typedstore::common::Value) -> typedstore::errors::TypedStoreResult<Self::Output> {
                match value {
                    typedstore::common::Value::Document(doc) => {
                        Ok(#name {
                            #(#initializers,)*
                        })
                    },
                    other => Err(typedstore::errors::TypedStoreError::new(
                        &format!("Cannot convert {} into {}", other.type_name(), #type_name),
                        typedstore::errors::ErrorKind::ObjectMappingError,
                    )),
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}

pub(crate) fn generate_convertible_for_enum(ast: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    let name = &ast.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let ignored = ignored_fields(&ast.attrs)?;

    let variant_count = data.variants.len();
    let mut to_value_variants = Vec::with_capacity(variant_count);
    let mut from_value_variants = Vec::with_capacity(variant_count);

    for variant in &data.variants {
        let variant_ident = &variant.ident;
        let variant_name = variant_ident.to_string();

        match &variant.fields {
            syn::Fields::Named(fields) => {
                let all_idents: Vec<&Ident> = fields
                    .named
                    .iter()
                    .filter_map(|f| f.ident.as_ref())
                    .collect();
                let persisted_idents: Vec<&Ident> = all_idents
                    .iter()
                    .filter(|ident| !ignored.contains(&ident.to_string()))
                    .copied()
                    .collect();
                let persisted_names: Vec<String> =
                    persisted_idents.iter().map(|i| i.to_string()).collect();

                to_value_variants.push(quote! {
                    #name::#variant_ident { #(ref #all_idents),* } => {
                        let mut data = typedstore::document::Document::new();
                        #(data.put(#persisted_names, #persisted_idents.to_value()?)?;)*
                        let mut doc = typedstore::document::Document::new();
                        doc.put("variant", #variant_name)?;
                        doc.put("value", typedstore::common::Value::Document(data))?;
                        Ok(typedstore::common::Value::Document(doc))
                    }
                });

                let source = Ident::new("data", Span::call_site());
                let initializers: Vec<proc_macro2::TokenStream> = fields
                    .named
                    .iter()
                    .filter_map(|f| f.ident.as_ref().map(|ident| (ident, &f.ty)))
                    .map(|(ident, ty)| {
                        let field_name = ident.to_string();
                        let is_ignored = ignored.contains(&field_name);
                        field_initializer(ident, &field_name, ty, &source, is_ignored)
                    })
                    .collect();

                from_value_variants.push(quote! {
                    #variant_name => {
                        let data = match doc.get("value")? {
                            typedstore::common::Value::Document(data) => data,
                            _ => typedstore::document::Document::new(),
                        };
                        Ok(#name::#variant_ident {
                            #(#initializers,)*
                        })
                    }
                });
            }
            syn::Fields::Unnamed(fields) => {
                let field_count = fields.unnamed.len();
                let field_idents: Vec<Ident> = (0..field_count)
                    .map(|i| Ident::new(&format!("field_{}", i), Span::call_site()))
                    .collect();

                to_value_variants.push(quote! {
                    #name::#variant_ident(#(#field_idents),*) => {
                        let mut array = Vec::with_capacity(#field_count);
                        #(array.push(#field_idents.to_value()?);)*
                        let mut doc = typedstore::document::Document::new();
                        doc.put("variant", #variant_name)?;
                        doc.put("value", typedstore::common::Value::Array(array))?;
                        Ok(typedstore::common::Value::Document(doc))
                    }
                });

                let field_indices: Vec<usize> = (0..field_count).collect();
                let field_types: Vec<&Type> = fields.unnamed.iter().map(|f| &f.ty).collect();

                from_value_variants.push(quote! {
                    #variant_name => {
                        let data = match doc.get("value")? {
                            typedstore::common::Value::Array(data) if data.len() == #field_count => data,
                            _ => {
                                return Err(typedstore::errors::TypedStoreError::new(
                                    &format!("Variant {} of {} expects {} values", #variant_name, #type_name, #field_count),
                                    typedstore::errors::ErrorKind::ObjectMappingError,
                                ))
                            }
                        };
                        Ok(#name::#variant_ident(
                            #(typedstore::common::from_value::<#field_types>(&data[#field_indices])?,)*
                        ))
                    }
                });
            }
            syn::Fields::Unit => {
                to_value_variants.push(quote! {
                    #name::#variant_ident => {
                        let mut doc = typedstore::document::Document::new();
                        doc.put("variant", #variant_name)?;
                        doc.put("value", typedstore::common::Value::Null)?;
                        Ok(typedstore::common::Value::Document(doc))
                    }
                });

                from_value_variants.push(quote! {
                    #variant_name => Ok(#name::#variant_ident)
                });
            }
        }
    }

    let gen = quote! {
        impl #impl_generics typedstore::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> typedstore::errors::TypedStoreResult<typedstore::common::Value> {
                use typedstore::common::Convertible as _;
                match self {
                    #(#to_value_variants),*
                }
            }

            fn from_value(value: &typedstore::common::Value) -> typedstore::errors::TypedStoreResult<Self::Output> {
                let doc = match value {
                    typedstore::common::Value::Document(doc) => doc,
                    other => {
                        return Err(typedstore::errors::TypedStoreError::new(
                            &format!("Cannot convert {} into {}", other.type_name(), #type_name),
                            typedstore::errors::ErrorKind::ObjectMappingError,
                        ))
                    }
                };

                match doc.get("variant")? {
                    typedstore::common::Value::String(variant) => match variant.as_str() {
                        #(#from_value_variants,)*
                        unknown => Err(typedstore::errors::TypedStoreError::new(
                            &format!("Unknown variant {} of {}", unknown, #type_name),
                            typedstore::errors::ErrorKind::ObjectMappingError,
                        )),
                    },
                    _ => Err(typedstore::errors::TypedStoreError::new(
                        &format!("Value is not a variant of {}", #type_name),
                        typedstore::errors::ErrorKind::ObjectMappingError,
                    )),
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}
