//! Record derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    parse_quote, spanned::Spanned, Attribute, Data, DeriveInput, Error, Field, Fields, Generics,
    Ident, LitStr, Path, Result, Visibility,
};

/// Container-level `#[scan(...)]` options
#[derive(Default)]
struct RecordConfig {
    /// Implements `Scanner`
    scanner: bool,
    /// Implements `MapValues`
    map_values: bool,
    /// Extra capability traits
    capabilities: Vec<Path>,
}

fn parse_record_config(attrs: &[Attribute]) -> Result<RecordConfig> {
    let mut config = RecordConfig::default();

    for attr in attrs {
        if !attr.path().is_ident("scan") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("scanner") {
                config.scanner = true;
            } else if meta.path.is_ident("map_values") {
                config.map_values = true;
            } else if meta.path.is_ident("capability") {
                meta.parse_nested_meta(|inner| {
                    config.capabilities.push(inner.path);
                    Ok(())
                })?;
            } else {
                return Err(meta.error(format!(
                    "unknown scan attribute `{}`",
                    path_name(&meta.path)
                )));
            }
            Ok(())
        })?;
    }

    Ok(config)
}

/// Parsed per-field attributes
struct FieldConfig {
    /// Declaration index among all fields
    index: usize,
    ident: Ident,
    ty: syn::Type,
    /// `(tag key, tag value)` pairs
    tags: Vec<(String, String)>,
    embedded: bool,
}

/// Returns `None` for fields that take no part in mapping.
fn parse_field_config(index: usize, field: &Field) -> Result<Option<FieldConfig>> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| Error::new(field.span(), "tuple structs are not supported"))?;

    let mut tags = Vec::new();
    let mut embedded = false;
    let mut skip = false;

    for attr in &field.attrs {
        if attr.path().is_ident("scan") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("embed") {
                    embedded = true;
                } else if meta.path.is_ident("skip") {
                    skip = true;
                } else {
                    return Err(meta.error(format!(
                        "unknown scan attribute `{}`",
                        path_name(&meta.path)
                    )));
                }
                Ok(())
            })?;
        } else if attr.path().is_ident("tag") {
            attr.parse_nested_meta(|meta| {
                let key = path_name(&meta.path);
                let lit: LitStr = meta.value()?.parse()?;
                tags.push((key, lit.value()));
                Ok(())
            })?;
        }
    }

    if skip || !matches!(field.vis, Visibility::Public(_)) {
        return Ok(None);
    }

    Ok(Some(FieldConfig {
        index,
        ident,
        ty: field.ty.clone(),
        tags,
        embedded,
    }))
}

fn path_name(path: &Path) -> String {
    path.get_ident().map(|i| i.to_string()).unwrap_or_default()
}

/// Type parameters must be `'static` and every mapped field type `Mappable`.
fn add_bounds(generics: &Generics, fields: &[FieldConfig]) -> Generics {
    let mut generics = generics.clone();
    if generics.type_params().next().is_none() {
        return generics;
    }

    let params: Vec<Ident> = generics.type_params().map(|p| p.ident.clone()).collect();
    let where_clause = generics.make_where_clause();
    for param in &params {
        where_clause.predicates.push(parse_quote!(#param: 'static));
    }
    for field in fields {
        let ty = &field.ty;
        where_clause
            .predicates
            .push(parse_quote!(#ty: ::rowscan::Mappable));
    }
    generics
}

pub fn derive_record_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(Error::new(
            lifetime.span(),
            "records must be 'static; lifetime parameters are not supported",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => return Err(Error::new(input.span(), "unit structs are not supported")),
            _ => return Err(Error::new(input.span(), "only named fields are supported")),
        },
        _ => return Err(Error::new(input.span(), "only structs are supported")),
    };

    let record_config = parse_record_config(&input.attrs)?;
    let field_configs: Vec<FieldConfig> = fields
        .iter()
        .enumerate()
        .map(|(index, field)| parse_field_config(index, field))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    let generics = add_bounds(&input.generics, &field_configs);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let field_shapes: Vec<TokenStream> = field_configs
        .iter()
        .map(|config| {
            let index = config.index;
            let ident = config.ident.unraw().to_string();
            let ty = &config.ty;
            let embedded = config.embedded;
            let tags = config.tags.iter().map(|(key, value)| quote! { (#key, #value) });

            quote! {
                ::rowscan::FieldShape {
                    index: #index,
                    ident: #ident,
                    tags: &[#(#tags),*],
                    embedded: #embedded,
                    shape: <#ty as ::rowscan::Mappable>::shape,
                }
            }
        })
        .collect();

    let field_arms: Vec<TokenStream> = field_configs
        .iter()
        .map(|config| {
            let index = config.index;
            let ident = &config.ident;
            quote! {
                #index => ::core::option::Option::Some(::rowscan::Mappable::slot(&mut self.#ident)),
            }
        })
        .collect();

    let mut capabilities: Vec<TokenStream> = Vec::new();
    if record_config.scanner {
        capabilities.push(quote! { ::rowscan::Capability::of::<dyn ::rowscan::Scanner>() });
    }
    for path in &record_config.capabilities {
        capabilities.push(quote! { ::rowscan::Capability::of::<dyn #path>() });
    }

    let custom = if record_config.map_values {
        quote! {
            ::core::option::Option::Some(
                ::rowscan::mapper::erase_map_values::<Self> as ::rowscan::shape::CustomMapperFn
            )
        }
    } else {
        quote! { ::core::option::Option::None }
    };

    let scan_body = if record_config.scanner {
        quote! { <Self as ::rowscan::Scanner>::scan(self, value) }
    } else {
        quote! {
            let _ = value;
            ::core::result::Result::Err(::rowscan::Error::NotScannable(
                ::core::any::type_name::<Self>(),
            ))
        }
    };

    let expanded = quote! {
        impl #impl_generics ::rowscan::Mappable for #name #ty_generics #where_clause {
            fn shape() -> ::rowscan::Shape {
                ::rowscan::Shape::Record(::rowscan::RecordShape {
                    type_id: ::core::any::TypeId::of::<Self>(),
                    type_name: ::core::any::type_name::<Self>(),
                    fields: ::std::vec![#(#field_shapes),*],
                    capabilities: ::std::vec![#(#capabilities),*],
                    custom: #custom,
                })
            }

            fn slot(&mut self) -> ::rowscan::Slot<'_> {
                ::rowscan::Slot::Record(self)
            }
        }

        impl #impl_generics ::rowscan::RecordSlot for #name #ty_generics #where_clause {
            fn field(&mut self, index: usize) -> ::core::option::Option<::rowscan::Slot<'_>> {
                match index {
                    #(#field_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn scan(&mut self, value: ::rowscan::Value) -> ::rowscan::Result<()> {
                #scan_body
            }

            fn set_any(
                &mut self,
                value: ::std::boxed::Box<dyn ::core::any::Any + ::core::marker::Send>,
            ) -> ::rowscan::Result<()> {
                ::rowscan::traits::replace_from_any(self, value)
            }
        }
    };

    Ok(expanded)
}
