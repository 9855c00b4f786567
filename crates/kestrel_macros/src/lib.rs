use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, ItemFn, LitInt};

/// Time a function when the `perf_stats` feature is enabled.
///
/// The function body is wrapped with a drop guard that logs the elapsed time
/// through Bevy's `info!` once it exceeds the threshold. With the feature
/// disabled the guard is compiled out entirely.
///
/// # Example
/// ```ignore
/// #[profile]
/// pub fn from_polygons(&mut self, contours: &[[Vec3; 3]]) -> &mut Self {
///     // ... work ...
/// }
///
/// #[profile(5)] // threshold in milliseconds
/// pub fn init(&mut self, nav_mesh: &NavMesh) -> &mut Self { ... }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        let literal = parse_macro_input!(attr as LitInt);
        match literal.base10_parse::<u128>() {
            Ok(value) => value,
            Err(_) => {
                return syn::Error::new(Span::call_site(), "#[profile] expects a threshold in milliseconds")
                    .to_compile_error()
                    .into();
            }
        }
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_timer = {
                struct ProfileGuard {
                    name: &'static str,
                    start: std::time::Instant,
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        if elapsed.as_millis() >= #threshold_ms {
                            bevy::prelude::info!("[PERF] {}: {:?}", self.name, elapsed);
                        }
                    }
                }
                ProfileGuard {
                    name: #fn_name_str,
                    start: std::time::Instant::now(),
                }
            };

            #block
        }
    };

    output.into()
}
