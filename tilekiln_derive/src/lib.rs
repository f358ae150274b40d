//! Procedural macros shared by the tilekiln crates.
//!
//! The only macro is [`macro@context`], which wraps the body of a function returning
//! `anyhow::Result` so that every error leaving it carries an extra line of context.

use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use quote::{ToTokens, quote};
use syn::{ItemFn, ReturnType, parse_macro_input};

/// Attach `anyhow` context to every error returned from the annotated function.
///
/// ```ignore
/// #[context("loading config '{}'", path.display())]
/// fn load(path: &Path) -> anyhow::Result<Config> { ... }
/// ```
///
/// The arguments are passed to `format!` as they are. Works for sync and async functions.
#[proc_macro_attribute]
pub fn context(args: TokenStream, input: TokenStream) -> TokenStream {
	let format_args = TokenStream2::from(args);
	let mut function = parse_macro_input!(input as ItemFn);

	let return_type = match &function.sig.output {
		ReturnType::Default => {
			return syn::Error::new_spanned(&function.sig, "#[context] requires a function returning Result")
				.to_compile_error()
				.into();
		}
		ReturnType::Type(_, ty) => ty.clone(),
	};

	let body = &function.block;
	let err = Ident::new("err", Span::mixed_site());

	let wrapped = if function.sig.asyncness.is_some() {
		let result = Ident::new("result", Span::mixed_site());
		quote! {
			let #result: #return_type = async { #body }.await;
			#result.map_err(|#err| #err.context(format!(#format_args)).into())
		}
	} else {
		quote! {
			(|| -> #return_type { #body })()
				.map_err(|#err| #err.context(format!(#format_args)).into())
		}
	};

	function.block.stmts = vec![syn::Stmt::Expr(syn::Expr::Verbatim(wrapped), None)];
	function.into_token_stream().into()
}
