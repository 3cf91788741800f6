use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Fields, FnArg, GenericParam, Generics, ImplItemFn, Index, ReturnType,
    Type, parse_macro_input, parse_quote, spanned::Spanned,
};

#[proc_macro_derive(Duplicate)]
pub fn derive_duplicate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_duplicate(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[proc_macro_derive(Snapshotable)]
pub fn derive_snapshotable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_snapshotable(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Rolls the receiver back to its entry state when the method returns `Err`.
///
/// Applies to `&mut self` methods returning a `Result` whose error type
/// implements `From<rustmemento::MementoError>`.
#[proc_macro_attribute]
pub fn transactional(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[transactional] does not accept arguments",
        )
        .to_compile_error()
        .into();
    }

    let method = parse_macro_input!(item as ImplItemFn);
    match expand_transactional(method) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn add_duplicate_bounds(mut generics: Generics) -> Generics {
    for param in &mut generics.params {
        if let GenericParam::Type(type_param) = param {
            type_param
                .bounds
                .push(parse_quote!(::rustmemento::Duplicate));
        }
    }
    generics
}

fn duplicate_fields(fields: &Fields, path: TokenStream2, bindings: &[TokenStream2]) -> TokenStream2 {
    match fields {
        Fields::Named(named) => {
            let inits = named.named.iter().zip(bindings).map(|(field, binding)| {
                let ident = &field.ident;
                quote!(#ident: ::rustmemento::Duplicate::duplicate_in(#binding, copier)?)
            });
            quote!(#path { #(#inits),* })
        }
        Fields::Unnamed(_) => {
            let inits = bindings
                .iter()
                .map(|binding| quote!(::rustmemento::Duplicate::duplicate_in(#binding, copier)?));
            quote!(#path ( #(#inits),* ))
        }
        Fields::Unit => quote!(#path),
    }
}

fn expand_duplicate(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = input.ident;
    let generics = add_duplicate_bounds(input.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data) => {
            let bindings = data
                .fields
                .iter()
                .enumerate()
                .map(|(i, field)| match &field.ident {
                    Some(ident) => quote!(&self.#ident),
                    None => {
                        let index = Index::from(i);
                        quote!(&self.#index)
                    }
                })
                .collect::<Vec<_>>();
            duplicate_fields(&data.fields, quote!(Self), &bindings)
        }
        Data::Enum(data) => {
            let arms = data.variants.iter().map(|variant| {
                let variant_ident = &variant.ident;
                let bindings = (0..variant.fields.len())
                    .map(|i| {
                        let ident = format_ident!("__field_{}", i);
                        quote!(#ident)
                    })
                    .collect::<Vec<_>>();
                let pattern = match &variant.fields {
                    Fields::Named(named) => {
                        let parts = named.named.iter().zip(&bindings).map(|(field, binding)| {
                            let ident = &field.ident;
                            quote!(#ident: #binding)
                        });
                        quote!(Self::#variant_ident { #(#parts),* })
                    }
                    Fields::Unnamed(_) => quote!(Self::#variant_ident ( #(#bindings),* )),
                    Fields::Unit => quote!(Self::#variant_ident),
                };
                let value = duplicate_fields(&variant.fields, quote!(Self::#variant_ident), &bindings);
                quote!(#pattern => #value)
            });
            quote! {
                match self {
                    #(#arms,)*
                }
            }
        }
        Data::Union(_) => {
            return Err(syn::Error::new(
                name.span(),
                "Duplicate cannot be derived for unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::rustmemento::Duplicate for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn duplicate_in(&self, copier: &mut ::rustmemento::Copier) -> ::rustmemento::Result<Self> {
                ::core::result::Result::Ok(#body)
            }
        }
    })
}

fn expand_snapshotable(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = input.ident;
    if let Data::Union(_) = input.data {
        return Err(syn::Error::new(
            name.span(),
            "Snapshotable cannot be derived for unions",
        ));
    }

    let mut generics = input.generics;
    generics
        .make_where_clause()
        .predicates
        .push(parse_quote!(Self: ::rustmemento::Duplicate));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::rustmemento::Snapshotable for #name #ty_generics #where_clause {
            type State = Self;

            fn snapshot(&self, depth: ::rustmemento::CopyDepth) -> ::rustmemento::Result<Self::State> {
                ::rustmemento::Duplicate::duplicate(self, depth)
            }

            fn restore(&mut self, state: Self::State) {
                *self = state;
            }
        }
    })
}

fn expand_transactional(mut method: ImplItemFn) -> syn::Result<TokenStream2> {
    let sig = &method.sig;

    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new(
            asyncness.span(),
            "#[transactional] does not support async methods",
        ));
    }

    // `&mut self` and `self: &mut Self` both carry the `&mut Self` type.
    match sig.inputs.first() {
        Some(FnArg::Receiver(receiver)) if is_mut_reference(&receiver.ty) => {}
        _ => {
            return Err(syn::Error::new(
                sig.span(),
                "#[transactional] requires a `&mut self` receiver",
            ));
        }
    }

    let output = match &sig.output {
        ReturnType::Type(_, ty) => ty.as_ref().clone(),
        ReturnType::Default => {
            return Err(syn::Error::new(
                sig.span(),
                "#[transactional] methods must return a Result",
            ));
        }
    };
    if let Type::ImplTrait(_) = output {
        return Err(syn::Error::new(
            output.span(),
            "#[transactional] methods cannot return `impl Trait`",
        ));
    }

    let body = &method.block;
    let wrapped = quote! {
        {
            let __memento = ::rustmemento::capture(&*self, ::rustmemento::CopyDepth::Shallow)?;
            #[allow(clippy::redundant_closure_call)]
            let __result: #output = (|| -> #output #body)();
            if __result.is_err() {
                __memento.restore_into(self)?;
            }
            __result
        }
    };
    method.block = syn::parse2(wrapped)?;

    Ok(quote!(#method))
}

fn is_mut_reference(ty: &Type) -> bool {
    matches!(ty, Type::Reference(reference) if reference.mutability.is_some())
}
