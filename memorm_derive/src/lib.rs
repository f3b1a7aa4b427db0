use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitBool, LitInt, LitStr, Type, parse_macro_input, spanned::Spanned};

/// Implements `memorm::metadata::Entity` for a struct with named fields.
///
/// Struct attribute: `#[entity(table = "users")]` (default: the struct name).
/// Field attributes: `#[id]` or `#[id(generated)]` on exactly one field, and
/// `#[column(name = "...", nullable = false, length = 50)]` or `#[column(skip)]`.
#[proc_macro_derive(Entity, attributes(entity, id, column))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_entity(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Default)]
struct EntityOptions {
    table_name: Option<String>,
}

#[derive(Default)]
struct IdOptions {
    generated: bool,
}

#[derive(Default)]
struct ColumnOptions {
    name: Option<String>,
    nullable: Option<bool>,
    length: Option<u32>,
    skip: bool,
}

struct MappedField {
    ident: Ident,
    ty: Type,
    column: String,
    id: Option<IdOptions>,
    options: ColumnOptions,
}

fn expand_entity(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "Entity does not support generic structs",
        ));
    }

    let entity_options = parse_entity_options(&input.attrs)?;

    let data_struct = match input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Entity can only be derived for structs",
            ));
        }
    };

    let named_fields = match data_struct.fields {
        Fields::Named(fields) => fields,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Entity requires named fields",
            ));
        }
    };

    let mut mapped = Vec::<MappedField>::new();
    let mut skipped = Vec::<Ident>::new();
    for field in named_fields.named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "Entity requires named fields"))?;
        let options = parse_column_options(&field.attrs)?;
        let id = parse_id_options(&field.attrs)?;

        if options.skip {
            if id.is_some() {
                return Err(syn::Error::new(
                    ident.span(),
                    "the #[id] field cannot be #[column(skip)]",
                ));
            }
            skipped.push(ident);
            continue;
        }

        let column = options
            .name
            .clone()
            .unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());
        if let Some(previous) = mapped.iter().find(|m| m.column == column) {
            return Err(syn::Error::new(
                ident.span(),
                format!("column '{}' is already mapped by field '{}'", column, previous.ident),
            ));
        }

        mapped.push(MappedField {
            ident,
            ty: field.ty,
            column,
            id,
            options,
        });
    }

    let id_positions: Vec<usize> = mapped
        .iter()
        .enumerate()
        .filter(|(_, field)| field.id.is_some())
        .map(|(idx, _)| idx)
        .collect();
    let id_index = match id_positions.as_slice() {
        [idx] => *idx,
        [] => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Entity requires exactly one #[id] field",
            ));
        }
        [_, second, ..] => {
            return Err(syn::Error::new(
                mapped[*second].ident.span(),
                "Entity allows only one #[id] field",
            ));
        }
    };

    let table_name = entity_options
        .table_name
        .unwrap_or_else(|| struct_name.to_string());

    let column_builders = mapped.iter().map(column_metadata_tokens);
    let value_exprs = mapped.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        quote! { <#ty as ::memorm::metadata::ColumnValue>::to_value(&self.#ident) }
    });
    let field_decoders = mapped.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        let column = &field.column;
        quote! { #ident: row.decode::<#ty>(#column)? }
    });
    let skipped_defaults = skipped.iter().map(|ident| {
        quote! { #ident: ::std::default::Default::default() }
    });

    let id_field = &mapped[id_index].ident;
    let id_ty = &mapped[id_index].ty;
    let id_column = &mapped[id_index].column;

    Ok(quote! {
        impl ::memorm::metadata::Entity for #struct_name {
            fn metadata() -> &'static ::memorm::metadata::EntityMetadata {
                static METADATA: ::std::sync::OnceLock<::memorm::metadata::EntityMetadata> =
                    ::std::sync::OnceLock::new();
                METADATA.get_or_init(|| {
                    ::memorm::metadata::EntityMetadata::from_parts(
                        #table_name,
                        ::std::vec![#(#column_builders),*],
                        #id_index,
                    )
                })
            }

            fn values(&self) -> ::std::vec::Vec<::memorm::core::Value> {
                ::std::vec![#(#value_exprs),*]
            }

            fn from_row(row: &::memorm::template::ResultRow<'_>) -> ::memorm::core::Result<Self> {
                ::std::result::Result::Ok(Self {
                    #(#field_decoders,)*
                    #(#skipped_defaults,)*
                })
            }

            fn assign_id(&mut self, id: ::memorm::core::Value) -> ::memorm::core::Result<()> {
                self.#id_field = ::memorm::metadata::decode_column::<#id_ty>(#id_column, &id)?;
                ::std::result::Result::Ok(())
            }
        }
    })
}

fn column_metadata_tokens(field: &MappedField) -> TokenStream2 {
    let ty = &field.ty;
    let column = &field.column;
    let field_name = field.ident.to_string();

    let mut chain = quote! {
        ::memorm::metadata::ColumnMetadata::new(
            #column,
            <#ty as ::memorm::metadata::ColumnValue>::sql_type(),
        )
        .field(#field_name)
    };
    if field.options.nullable == Some(false) {
        chain = quote! { #chain.not_null() };
    }
    if let Some(id) = &field.id {
        chain = quote! { #chain.primary_key() };
        if id.generated {
            chain = quote! { #chain.generated() };
        }
    }
    if let Some(length) = field.options.length {
        chain = quote! { #chain.length(#length) };
    }
    chain
}

fn parse_entity_options(attrs: &[Attribute]) -> syn::Result<EntityOptions> {
    let mut options = EntityOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value = meta.value()?;
                let lit: LitStr = value.parse()?;
                if lit.value().trim().is_empty() {
                    return Err(meta.error("table name cannot be empty"));
                }
                options.table_name = Some(lit.value());
                return Ok(());
            }

            Err(meta.error("Unsupported entity attribute. Supported: table = \"...\""))
        })?;
    }

    Ok(options)
}

fn parse_id_options(attrs: &[Attribute]) -> syn::Result<Option<IdOptions>> {
    let mut parsed: Option<IdOptions> = None;

    for attr in attrs {
        if !attr.path().is_ident("id") {
            continue;
        }
        if parsed.is_some() {
            return Err(syn::Error::new(attr.span(), "duplicate #[id] attribute"));
        }

        let mut options = IdOptions::default();
        if matches!(attr.meta, syn::Meta::List(_)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("generated") {
                    options.generated = true;
                    return Ok(());
                }

                Err(meta.error("Unsupported #[id(...)] option. Supported: generated"))
            })?;
        }
        parsed = Some(options);
    }

    Ok(parsed)
}

fn parse_column_options(attrs: &[Attribute]) -> syn::Result<ColumnOptions> {
    let mut options = ColumnOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("column") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                return Ok(());
            }

            if meta.path.is_ident("name") {
                let value = meta.value()?;
                let lit: LitStr = value.parse()?;
                options.name = Some(lit.value());
                return Ok(());
            }

            if meta.path.is_ident("nullable") {
                let value = meta.value()?;
                let lit: LitBool = value.parse()?;
                options.nullable = Some(lit.value);
                return Ok(());
            }

            if meta.path.is_ident("length") {
                let value = meta.value()?;
                let lit: LitInt = value.parse()?;
                options.length = Some(lit.base10_parse::<u32>()?);
                return Ok(());
            }

            Err(meta.error(
                "Unsupported #[column(...)] option. Supported: name = \"...\", nullable = <bool>, length = <u32>, skip",
            ))
        })?;
    }

    Ok(options)
}
