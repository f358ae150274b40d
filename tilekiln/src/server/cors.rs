//! Cross-origin headers.
//!
//! Every response allows any origin and names `GET, HEAD` as the allowed methods, on
//! simple requests as well as on preflights, so map clients on other hosts can fetch
//! tiles directly.

use axum::{
	Router,
	http::{HeaderValue, Method, header::ACCESS_CONTROL_ALLOW_METHODS},
};
use tower_http::{
	cors::{Any, CorsLayer},
	set_header::SetResponseHeaderLayer,
};

const ALLOWED_METHODS: &str = "GET, HEAD";

/// Apply the cross-origin layers to `router`.
pub fn add_cors(router: Router) -> Router {
	// outermost, so it also rewrites the preflight answers of the cors layer
	router.layer(build_cors_layer()).layer(SetResponseHeaderLayer::overriding(
		ACCESS_CONTROL_ALLOW_METHODS,
		HeaderValue::from_static(ALLOWED_METHODS),
	))
}

fn build_cors_layer() -> CorsLayer {
	CorsLayer::new()
		.allow_origin(Any)
		.allow_methods([Method::GET, Method::HEAD])
}
