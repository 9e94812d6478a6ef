use darling::{ast::NestedMeta, FromMeta};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote, ToTokens};

#[derive(FromMeta)]
struct RouteArgs {
	#[darling(multiple)]
	tag: Vec<syn::Expr>,
	#[darling(multiple)]
	response: Vec<Response>,
}

/// A documented status code, e.g. `response(status = 404, description = "...")`.
#[derive(FromMeta)]
struct Response {
	status: syn::LitInt,
	shape: Option<syn::Type>,
	description: Option<String>,
}

impl ToTokens for Response {
	fn to_tokens(&self, tokens: &mut TokenStream2) {
		let status = &self.status;
		let shape = self
			.shape
			.as_ref()
			.map_or_else(|| quote!(()), ToTokens::to_token_stream);

		tokens.extend(match &self.description {
			Some(text) => quote!(.response_with::<#status, #shape, _>(|res| res.description(#text))),
			None => quote!(.response::<#status, #shape>()),
		});
	}
}

/// The `<handler>_docs` function emitted next to a handler.
struct RouteDocs {
	vis: syn::Visibility,
	ident: syn::Ident,
	summary: String,
	description: String,
	tags: Vec<syn::Expr>,
	responses: Vec<Response>,
}

impl RouteDocs {
	fn new(args: RouteArgs, handler: &syn::ItemFn) -> syn::Result<Self> {
		let (summary, description) = doc_comment(handler)?;

		Ok(Self {
			vis: handler.vis.clone(),
			ident: format_ident!("{}_docs", handler.sig.ident),
			summary,
			description,
			tags: args.tag,
			responses: args.response,
		})
	}
}

impl ToTokens for RouteDocs {
	fn to_tokens(&self, tokens: &mut TokenStream2) {
		let Self {
			vis,
			ident,
			summary,
			description,
			tags,
			responses,
		} = self;

		tokens.extend(quote! {
			#vis fn #ident(op: aide::transform::TransformOperation) -> aide::transform::TransformOperation {
				op.summary(#summary)
					.description(#description)
					#(.tag(#tags))*
					#(#responses)*
			}
		});
	}
}

pub fn from_input(args: TokenStream, input: TokenStream) -> TokenStream {
	let handler = syn::parse_macro_input!(input as syn::ItemFn);

	let args = match NestedMeta::parse_meta_list(args.into()) {
		Ok(list) => list,
		Err(error) => return error.into_compile_error().into(),
	};

	let args = match RouteArgs::from_list(&args) {
		Ok(args) => args,
		Err(error) => return error.write_errors().into(),
	};

	match RouteDocs::new(args, &handler) {
		Ok(docs) => quote!(#handler #docs).into(),
		Err(error) => error.into_compile_error().into(),
	}
}

/// Splits the handler's doc comment into a one-line summary and a description.
///
/// A route without a description reuses its summary.
fn doc_comment(handler: &syn::ItemFn) -> syn::Result<(String, String)> {
	let mut lines = handler
		.attrs
		.iter()
		.filter(|attr| attr.path().is_ident("doc"))
		.filter_map(|attr| match &attr.meta {
			syn::Meta::NameValue(syn::MetaNameValue {
				value: syn::Expr::Lit(syn::ExprLit {
					lit: syn::Lit::Str(line),
					..
				}),
				..
			}) => Some(line.value().trim().to_owned()),
			_ => None,
		})
		.filter(|line| !line.is_empty());

	let summary = lines.next().ok_or_else(|| {
		syn::Error::new(
			handler.sig.ident.span(),
			"routes need a doc comment: a summary line, then an optional description",
		)
	})?;

	let description = lines.collect::<Vec<_>>().join(" ");

	if description.is_empty() {
		return Ok((summary.clone(), summary));
	}

	Ok((summary, description))
}
