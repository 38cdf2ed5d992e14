use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{
    DeriveInput, FnArg, GenericArgument, ImplItem, ImplItemFn, ItemImpl, LitStr, Pat, PatType,
    PathArguments, ReturnType, Token, Type, TypeParamBound, TypePath, parse_macro_input,
    spanned::Spanned,
};

#[proc_macro_derive(Message, attributes(message))]
pub fn derive_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_message(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Marks a handler method. Only meaningful inside `#[message_handlers]`,
/// which consumes the marker before this attribute can expand.
#[proc_macro_attribute]
pub fn handler(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = TokenStream2::from(item);
    let error = syn::Error::new(
        proc_macro2::Span::call_site(),
        "#[handler] can only be applied to methods inside a #[message_handlers] impl block",
    )
    .to_compile_error();

    quote!(#error #item).into()
}

#[proc_macro_attribute]
pub fn message_handlers(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[message_handlers] does not accept arguments",
        )
        .to_compile_error()
        .into();
    }

    let input = parse_macro_input!(item as ItemImpl);
    match expand_message_handlers(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_message(input: DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "#[derive(Message)] does not support generic types",
        ));
    }

    let options = parse_message_options(&input.attrs)?;
    let ident = &input.ident;
    let type_name = options.name.unwrap_or_else(|| ident.to_string());
    let parents = if options.parents.is_empty() && type_name != "Message" {
        vec!["Message".to_string()]
    } else {
        options.parents
    };
    let kind = if options.interface {
        quote!(::servicebus_common::types::TypeKind::Interface)
    } else {
        quote!(::servicebus_common::types::TypeKind::Class)
    };

    Ok(quote! {
        impl ::servicebus_common::message::Message for #ident {
            fn message_type(&self) -> &'static str {
                <Self as ::servicebus_common::message::MessageType>::TYPE_NAME
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }

        impl ::servicebus_common::message::MessageType for #ident {
            const TYPE_NAME: &'static str = #type_name;
            const KIND: ::servicebus_common::types::TypeKind = #kind;

            fn parents() -> &'static [&'static str] {
                &[#(#parents),*]
            }
        }
    })
}

fn expand_message_handlers(mut item_impl: ItemImpl) -> syn::Result<TokenStream2> {
    if item_impl.trait_.is_some() {
        return Err(syn::Error::new(
            item_impl.span(),
            "#[message_handlers] can only be used on inherent impl blocks",
        ));
    }

    let mut handlers = Vec::<HandlerMethod>::new();
    for item in &mut item_impl.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };

        let Some(marker) = extract_handler_marker(&mut method.attrs)? else {
            continue;
        };

        handlers.push(HandlerMethod::from_impl_method(method, marker)?);
    }

    let self_ty = &item_impl.self_ty;
    let (impl_generics, _, where_clause) = item_impl.generics.split_for_impl();
    let reflections = handlers.iter().map(HandlerMethod::reflection_tokens);

    Ok(quote! {
        #item_impl

        impl #impl_generics ::servicebus_common::reflection::HandlerReflection for #self_ty #where_clause {
            fn handler_methods() -> ::std::vec::Vec<::servicebus_common::reflection::MethodReflection> {
                ::std::vec![#(#reflections),*]
            }
        }
    })
}

#[derive(Default)]
struct MessageOptions {
    name: Option<String>,
    parents: Vec<String>,
    interface: bool,
}

#[derive(Clone, Default)]
struct HandlerAttrOptions {
    description: Option<String>,
}

enum DeclaredType {
    Named(String),
    Intersection(Vec<String>),
}

impl DeclaredType {
    fn tokens(&self) -> TokenStream2 {
        match self {
            Self::Named(name) => {
                quote!(::servicebus_common::reflection::TypeDeclaration::named(#name))
            }
            Self::Intersection(names) => quote!(
                ::servicebus_common::reflection::TypeDeclaration::intersection([#(#names),*])
            ),
        }
    }
}

struct HandlerParameter {
    name: String,
    declared: DeclaredType,
}

struct HandlerMethod {
    name: String,
    parameters: Vec<HandlerParameter>,
    return_type: Option<DeclaredType>,
    description: Option<String>,
}

impl HandlerMethod {
    fn from_impl_method(method: &ImplItemFn, marker: HandlerAttrOptions) -> syn::Result<Self> {
        let mut parameters = Vec::new();
        for (index, input) in method.sig.inputs.iter().enumerate() {
            let FnArg::Typed(PatType { pat, ty, .. }) = input else {
                continue;
            };

            let name = match pat.as_ref() {
                Pat::Ident(pat_ident) => pat_ident.ident.to_string(),
                Pat::Wild(_) => "_".to_string(),
                _ => format!("arg{index}"),
            };

            let declared = declared_type(ty, false)?.ok_or_else(|| {
                syn::Error::new(ty.span(), "#[handler] arguments cannot be the unit type")
            })?;

            parameters.push(HandlerParameter { name, declared });
        }

        let return_type = match &method.sig.output {
            ReturnType::Default => None,
            ReturnType::Type(_, ty) => declared_type(ty, true)?,
        };

        Ok(Self {
            name: method.sig.ident.to_string(),
            parameters,
            return_type,
            description: marker.description,
        })
    }

    fn reflection_tokens(&self) -> TokenStream2 {
        let name = self.name.as_str();
        let mut expr = quote!(::servicebus_common::reflection::MethodReflection::new(#name));

        for parameter in &self.parameters {
            let parameter_name = parameter.name.as_str();
            let declared = parameter.declared.tokens();
            expr = quote! {
                #expr.with_parameter(::servicebus_common::reflection::ParameterReflection::new(
                    #parameter_name,
                    ::std::option::Option::Some(#declared),
                ))
            };
        }

        if let Some(return_type) = &self.return_type {
            let declared = return_type.tokens();
            expr = quote!(#expr.with_return_type(#declared));
        }

        if let Some(description) = &self.description {
            expr = quote!(#expr.with_description(#description));
        }

        expr
    }
}

/// Map a Rust type to the name the type registry knows it by.
///
/// Returns `None` for `()`, which only a return type may be.
fn declared_type(ty: &Type, in_return: bool) -> syn::Result<Option<DeclaredType>> {
    match ty {
        Type::Reference(reference) => declared_type(&reference.elem, in_return),
        Type::Paren(paren) => declared_type(&paren.elem, in_return),
        Type::Group(group) => declared_type(&group.elem, in_return),
        Type::Slice(_) | Type::Array(_) => Ok(Some(DeclaredType::Named("array".to_string()))),
        Type::Tuple(tuple) if tuple.elems.is_empty() => Ok(None),
        Type::Path(TypePath { qself: None, path }) => {
            let Some(segment) = path.segments.last() else {
                return Err(syn::Error::new(ty.span(), "Unable to extract type name"));
            };

            let ident = segment.ident.to_string();
            let is_wrapper = matches!(ident.as_str(), "Arc" | "Box" | "Rc" | "Option")
                || (in_return && ident == "Result");
            if is_wrapper {
                if let Some(inner) = first_generic_type(segment) {
                    return declared_type(&inner, in_return);
                }
            }

            Ok(Some(DeclaredType::Named(ident)))
        }
        Type::ImplTrait(impl_trait) => declared_bounds(&impl_trait.bounds, ty, in_return),
        Type::TraitObject(trait_object) => declared_bounds(&trait_object.bounds, ty, in_return),
        other => Err(syn::Error::new(
            other.span(),
            "#[handler] signatures must use named types",
        )),
    }
}

fn declared_bounds(
    bounds: &Punctuated<TypeParamBound, Token![+]>,
    ty: &Type,
    in_return: bool,
) -> syn::Result<Option<DeclaredType>> {
    let mut names = Vec::new();
    for bound in bounds {
        let TypeParamBound::Trait(trait_bound) = bound else {
            continue;
        };
        let Some(segment) = trait_bound.path.segments.last() else {
            continue;
        };

        if segment.ident == "Future" {
            if let Some(output) = future_output_type(segment) {
                return declared_type(&output, in_return);
            }
        }

        let ident = segment.ident.to_string();
        if !matches!(ident.as_str(), "Send" | "Sync" | "Unpin") {
            names.push(ident);
        }
    }

    match names.len() {
        0 => Err(syn::Error::new(
            ty.span(),
            "#[handler] trait types need at least one non-auto trait",
        )),
        1 => Ok(names.pop().map(DeclaredType::Named)),
        _ => Ok(Some(DeclaredType::Intersection(names))),
    }
}

fn first_generic_type(segment: &syn::PathSegment) -> Option<Type> {
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };

    for arg in &arguments.args {
        if let GenericArgument::Type(ty) = arg {
            return Some(ty.clone());
        }
    }
    None
}

fn future_output_type(segment: &syn::PathSegment) -> Option<Type> {
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };

    arguments.args.iter().find_map(|arg| match arg {
        GenericArgument::AssocType(assoc) if assoc.ident == "Output" => Some(assoc.ty.clone()),
        _ => None,
    })
}

fn parse_message_options(attrs: &[syn::Attribute]) -> syn::Result<MessageOptions> {
    let mut options = MessageOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("message") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value = meta.value()?;
                let lit: LitStr = value.parse()?;
                options.name = Some(lit.value());
                return Ok(());
            }

            if meta.path.is_ident("parents") {
                let content;
                syn::parenthesized!(content in meta.input);
                let parents = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
                options.parents.extend(parents.iter().map(LitStr::value));
                return Ok(());
            }

            if meta.path.is_ident("interface") {
                options.interface = true;
                return Ok(());
            }

            Err(meta.error(
                "Unsupported #[message(...)] option. Supported: name = \"...\", parents(\"...\"), interface",
            ))
        })?;
    }

    Ok(options)
}

fn parse_handler_attr_tokens(attr: TokenStream2) -> syn::Result<HandlerAttrOptions> {
    let mut options = HandlerAttrOptions::default();
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("description") {
            let value = meta.value()?;
            let lit: LitStr = value.parse()?;
            options.description = Some(lit.value());
            return Ok(());
        }
        Err(meta.error("Unsupported #[handler(...)] option. Supported: description = \"...\""))
    });

    parser.parse2(attr)?;
    Ok(options)
}

fn extract_handler_marker(
    attrs: &mut Vec<syn::Attribute>,
) -> syn::Result<Option<HandlerAttrOptions>> {
    let mut found: Option<HandlerAttrOptions> = None;
    let mut kept = Vec::with_capacity(attrs.len());

    for attr in attrs.drain(..) {
        if path_ends_with_ident(attr.path(), "handler") {
            let parsed = parse_handler_attr_tokens(
                attr.meta
                    .require_list()
                    .map(|list| list.tokens.clone())
                    .unwrap_or_default(),
            )?;
            if found.is_some() {
                return Err(syn::Error::new(
                    attr.span(),
                    "Duplicate #[handler] marker on method",
                ));
            }
            found = Some(parsed);
            continue;
        }

        kept.push(attr);
    }

    *attrs = kept;
    Ok(found)
}

fn path_ends_with_ident(path: &syn::Path, ident: &str) -> bool {
    path.segments
        .last()
        .map(|segment| segment.ident == ident)
        .unwrap_or(false)
}
