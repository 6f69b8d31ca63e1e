use proc_macro::TokenStream;
use quote::quote;
use syn::{Ident, ItemFn, LitStr, parse_macro_input, spanned::Spanned};

const USAGE: &str = "rxcore_macro::test only accepts: #[rxcore_macro::test], \
                     #[rxcore_macro::test(local)], #[rxcore_macro::test(shared)], or string \
                     equivalents";

/// Marks a test function.
///
/// Sync functions become plain `#[test]`s. Async functions run on a tokio
/// runtime: `local` (the default) uses the current-thread flavor, `shared`
/// uses the multi-thread flavor so jobs really run on other threads.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let input = parse_macro_input!(item as ItemFn);

  let is_async = input.sig.asyncness.is_some();

  let raw_args = proc_macro2::TokenStream::from(attr);
  let tokio_args = if raw_args.is_empty() {
    quote!(flavor = "current_thread")
  } else {
    if !is_async {
      return TokenStream::from(
        syn::Error::new(
          raw_args.span(),
          "rxcore_macro::test flavor args are only supported for async tests. Use \
           #[rxcore_macro::test] for sync tests, or make the function async.",
        )
        .to_compile_error(),
      );
    }

    let flavor = if let Ok(ident) = syn::parse2::<Ident>(raw_args.clone()) {
      flavor_of(&ident.to_string()).ok_or_else(|| syn::Error::new(ident.span(), USAGE))
    } else if let Ok(lit) = syn::parse2::<LitStr>(raw_args.clone()) {
      flavor_of(&lit.value()).ok_or_else(|| syn::Error::new(lit.span(), USAGE))
    } else {
      Err(syn::Error::new(raw_args.span(), USAGE))
    };

    match flavor {
      Ok(tokens) => tokens,
      Err(err) => return TokenStream::from(err.to_compile_error()),
    }
  };

  let attr = if is_async { quote!(#[tokio::test(#tokio_args)]) } else { quote!(#[test]) };

  let expanded = quote! {
      #attr
      #input
  };

  TokenStream::from(expanded)
}

fn flavor_of(name: &str) -> Option<proc_macro2::TokenStream> {
  match name {
    "local" => Some(quote!(flavor = "current_thread")),
    "shared" => Some(quote!(flavor = "multi_thread")),
    _ => None,
  }
}
