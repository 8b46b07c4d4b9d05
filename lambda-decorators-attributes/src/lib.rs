extern crate proc_macro;

use proc_macro::TokenStream;
use quote::{quote, quote_spanned};
use syn::{
    parse::Parser, punctuated::Punctuated, spanned::Spanned, Expr, FnArg, ItemFn, Token,
};

/// Stacks middlewares around a handler function.
///
/// ```ignore
/// #[decorate(CorsHeaders::default(), JsonHttpResp::default())]
/// fn hello(event: Value, ctx: Context) -> Result<Value, Error> {
///     Ok(json!({ "hello": event["name"] }))
/// }
/// ```
///
/// The first middleware is the outermost layer, the same order as
/// `decorate(cors, decorate(json, handler_fn(hello)))`. The stack is built on
/// the first call and kept for the life of the process, so stateful
/// middlewares keep their state across invocations.
#[proc_macro_attribute]
pub fn decorate(attr: TokenStream, item: TokenStream) -> TokenStream {
    let middlewares = match Punctuated::<Expr, Token![,]>::parse_terminated.parse(attr) {
        Ok(middlewares) => middlewares,
        Err(e) => return TokenStream::from(e.to_compile_error()),
    };
    let input = syn::parse_macro_input!(item as ItemFn);

    let sig = &input.sig;
    let name = &sig.ident;
    let ret = &sig.output;
    let inputs = &sig.inputs;
    let body = &input.block;
    let attrs = &input.attrs;
    let vis = &input.vis;

    if let Some(asyncness) = &sig.asyncness {
        let tokens = quote_spanned! { asyncness.span() =>
            compile_error!("#[decorate] cannot be applied to an async fn, wrap it with `async_handler` instead");
        };
        return TokenStream::from(tokens);
    }

    if let Some(param) = sig.generics.params.first() {
        let tokens = quote_spanned! { param.span() =>
            compile_error!("a decorated handler cannot be generic");
        };
        return TokenStream::from(tokens);
    }

    if inputs.len() != 2 {
        let tokens = quote_spanned! { name.span() =>
            compile_error!("a decorated handler takes exactly two arguments: the event and the context");
        };
        return TokenStream::from(tokens);
    }

    let mut types = Vec::with_capacity(2);
    for arg in inputs {
        match arg {
            FnArg::Typed(arg) => types.push(&arg.ty),
            FnArg::Receiver(receiver) => {
                let tokens = quote_spanned! { receiver.self_token.span() =>
                    compile_error!("#[decorate] cannot be applied to a method");
                };
                return TokenStream::from(tokens);
            }
        }
    }
    let event_ty = types[0];
    let ctx_ty = types[1];

    let mut handler = quote! { ::lambda_decorators::handler_fn(__decorated) };
    for middleware in middlewares.iter().rev() {
        handler = quote! { ::lambda_decorators::middleware::decorate(#middleware, #handler) };
    }

    let result = quote! {
        #(#attrs)*
        #vis fn #name(__event: #event_ty, __ctx: #ctx_ty) #ret {
            fn __decorated(#inputs) #ret #body

            static __HANDLER: ::std::sync::OnceLock<
                ::std::boxed::Box<
                    dyn ::lambda_decorators::Handler + ::std::marker::Send + ::std::marker::Sync,
                >,
            > = ::std::sync::OnceLock::new();

            let __handler = __HANDLER.get_or_init(|| ::std::boxed::Box::new(#handler));
            ::lambda_decorators::Handler::call(__handler, __event, __ctx)
        }
    };

    result.into()
}
