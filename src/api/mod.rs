//! API module
//!
//! `Api` is the endpoint registry: it binds (method, path, resource) triples,
//! captures the middleware chain for each endpoint, and serves them.
//!
//! Registration happens through `&mut Api` before serving; `start` and
//! `serve` consume the registry, so it cannot change while requests run.

pub mod dispatch;
mod envelope;
mod error;
mod request;
pub mod response;

use http_body_util::BodyExt;
use percent_encoding::percent_decode_str;
use hyper::body::Body;
use hyper::{Method, Request};
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::logger;
use crate::middleware::{Chain, Middleware, Next};
use crate::resource::Resource;
use crate::routing::{Lookup, RouteTable};
use crate::server;

pub use envelope::Envelope;
pub use error::{
    ApiError, RegistrationError, StartError, CODE_BAD_REQUEST, CODE_INTERNAL,
    CODE_NOT_IMPLEMENTED, NOT_IMPLEMENTED_MESSAGE,
};
pub use request::{ApiRequest, ID_PARAM};
pub use response::ApiResponse;

/// A registered (method, path) binding
#[derive(Clone)]
struct Endpoint {
    /// Middleware present when the endpoint was registered
    chain: Chain,
    resource: Arc<Resource>,
}

/// Endpoint registry and entry point for serving
#[derive(Default)]
pub struct Api {
    routes: Option<RouteTable<Endpoint>>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Api {
    pub fn new() -> Self {
        Self::default()
    }

    fn routes_mut(&mut self) -> &mut RouteTable<Endpoint> {
        self.routes.get_or_insert_with(RouteTable::new)
    }

    /// Append a middleware.
    ///
    /// Only endpoints registered after this call are wrapped by it.
    pub fn use_middleware(&mut self, middleware: impl Middleware) {
        self.middlewares.push(Arc::new(middleware));
    }

    /// Bind one (method, path) pair to `resource`, wrapped by the middleware
    /// registered so far.
    pub fn new_endpoint(
        &mut self,
        method: Method,
        path: &str,
        resource: Arc<Resource>,
    ) -> Result<(), RegistrationError> {
        let endpoint = Endpoint {
            chain: self.middlewares.iter().cloned().collect(),
            resource,
        };

        self.routes_mut()
            .insert(method.clone(), path, endpoint)
            .map_err(|e| RegistrationError::new(method.clone(), path.to_string(), e))?;

        logger::log_registration(&method, path);
        Ok(())
    }

    /// Register the conventional triple for `resource` under `path`:
    /// GET `path`, GET `path/:ID` and POST `path`.
    ///
    /// All three are registered whatever the resource implements; missing
    /// capabilities are reported per request.
    pub fn new_endpoint_group(
        &mut self,
        path: &str,
        resource: Arc<Resource>,
    ) -> Result<(), RegistrationError> {
        let item_path = format!("{}/:{ID_PARAM}", path.trim_end_matches('/'));

        self.new_endpoint(Method::GET, path, Arc::clone(&resource))?;
        self.new_endpoint(Method::GET, &item_path, Arc::clone(&resource))?;
        self.new_endpoint(Method::POST, path, resource)
    }

    /// Number of registered (method, path) pairs
    pub fn endpoint_count(&self) -> usize {
        self.routes.as_ref().map_or(0, RouteTable::len)
    }

    pub fn has_endpoints(&self) -> bool {
        self.routes.as_ref().is_some_and(|routes| !routes.is_empty())
    }

    /// Route one request and produce its response.
    pub async fn handle<B>(&self, req: Request<B>) -> ApiResponse
    where
        B: Body + Send,
        B::Data: Send,
        B::Error: fmt::Display,
    {
        let lookup = match &self.routes {
            Some(routes) => routes.lookup(req.method(), req.uri().path()),
            None => Lookup::NotFound,
        };

        let (endpoint, id) = match lookup {
            Lookup::Found { value, params } => {
                let raw_id = params
                    .into_iter()
                    .find_map(|(name, value)| (name == ID_PARAM).then_some(value));
                let id = match raw_id.as_deref().map(decode_path_param).transpose() {
                    Ok(id) => id,
                    Err(err) => return response::api_error_response(&err),
                };
                (value.clone(), id)
            }
            Lookup::MethodNotAllowed(allowed) => return response::method_not_allowed(&allowed),
            Lookup::NotFound => return response::not_found(),
        };

        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                logger::log_warning(&format!("Failed to read request body: {e}"));
                return response::api_error_response(&ApiError::BadRequest(e.to_string()));
            }
        };

        let request = ApiRequest {
            remote_addr: parts.extensions.get::<SocketAddr>().copied(),
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            id,
            body,
        };

        Next::new(endpoint.chain, endpoint.resource)
            .run(request)
            .await
    }

    /// Serve on `0.0.0.0:port` until SIGINT/SIGTERM.
    pub async fn start(self, port: u16) -> Result<(), StartError> {
        self.start_with(&ServerConfig {
            port,
            ..ServerConfig::default()
        })
        .await
    }

    /// Serve on the configured address until SIGINT/SIGTERM.
    ///
    /// Fails before binding anything if no endpoint was registered.
    pub async fn start_with(self, config: &ServerConfig) -> Result<(), StartError> {
        if !self.has_endpoints() {
            return Err(StartError::NoEndpoints);
        }

        let addr = config.socket_addr().map_err(StartError::InvalidAddress)?;
        let listener = server::create_listener(addr)?;

        self.serve_inner(listener, config.keep_alive, server::shutdown_signal())
            .await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), StartError>
    where
        F: Future<Output = ()>,
    {
        if !self.has_endpoints() {
            return Err(StartError::NoEndpoints);
        }
        self.serve_inner(listener, true, shutdown).await
    }

    async fn serve_inner<F>(
        self,
        listener: TcpListener,
        keep_alive: bool,
        shutdown: F,
    ) -> Result<(), StartError>
    where
        F: Future<Output = ()>,
    {
        let addr = listener.local_addr()?;
        logger::log_server_start(&addr, self.endpoint_count());

        server::run_server_loop(listener, Arc::new(self), keep_alive, shutdown).await;
        Ok(())
    }
}

/// Percent-decode a path parameter; the result must be UTF-8.
fn decode_path_param(raw: &str) -> Result<String, ApiError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| ApiError::BadRequest(format!("Invalid identifier '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Create, FetchAll, FetchById, Payload};
    use http_body_util::Full;
    use hyper::body::Bytes;
    use hyper::header::ALLOW;
    use hyper::StatusCode;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Resource implementing all three capabilities, recording its calls
    #[derive(Default)]
    struct Widgets {
        calls: Mutex<Vec<String>>,
    }

    impl FetchAll for Widgets {
        fn get(&self) -> Envelope {
            self.calls.lock().unwrap().push("get".to_string());
            Envelope::ok(json!([{ "id": "1" }, { "id": "42" }]))
        }
    }

    impl FetchById for Widgets {
        fn get_by_id(&self, id: &str) -> Envelope {
            self.calls.lock().unwrap().push(format!("get_by_id:{id}"));
            Envelope::ok(json!({ "id": id }))
        }
    }

    impl Create for Widgets {
        fn post(&self, payload: Payload) -> Envelope {
            self.calls.lock().unwrap().push("post".to_string());
            Envelope::ok(Value::Object(payload))
        }
    }

    fn request(method: Method, uri: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn body_json(response: ApiResponse) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn widgets_api() -> (Api, Arc<Widgets>) {
        let widgets = Arc::new(Widgets::default());
        let mut api = Api::new();
        api.new_endpoint_group("/widgets", Arc::new(Resource::full(widgets.clone())))
            .unwrap();
        (api, widgets)
    }

    #[tokio::test]
    async fn test_group_registration_exposes_crud_triple() {
        let (api, widgets) = widgets_api();
        assert_eq!(api.endpoint_count(), 3);

        let response = api.handle(request(Method::GET, "/widgets", "")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "data": [{ "id": "1" }, { "id": "42" }] })
        );

        let response = api.handle(request(Method::GET, "/widgets/42", "")).await;
        assert_eq!(body_json(response).await, json!({ "data": { "id": "42" } }));

        let response = api
            .handle(request(Method::POST, "/widgets", r#"{"name":"gear","teeth":12}"#))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "data": { "name": "gear", "teeth": 12 } })
        );

        assert_eq!(
            *widgets.calls.lock().unwrap(),
            ["get", "get_by_id:42", "post"]
        );
    }

    #[tokio::test]
    async fn test_fetch_all_only_resource_over_group() {
        let mut api = Api::new();
        let resource = Resource::new().with_fetch_all(Arc::new(|| Envelope::ok(json!([]))));
        api.new_endpoint_group("/widgets", Arc::new(resource)).unwrap();

        let response = api.handle(request(Method::GET, "/widgets", "")).await;
        assert_eq!(response.status(), StatusCode::OK);

        for (method, uri, body) in [
            (Method::GET, "/widgets/42", ""),
            (Method::POST, "/widgets", r#"{"name":"gear"}"#),
        ] {
            let response = api.handle(request(method, uri, body)).await;
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(
                body_json(response).await,
                json!({ "error_code": 1, "error_message": "Method is not implemented!" })
            );
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (api, widgets) = widgets_api();
        let body = r#"{"name": "gear""#;
        let expected = serde_json::from_str::<Payload>(body).unwrap_err().to_string();

        let response = api.handle(request(Method::POST, "/widgets", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error_code": 3, "error_message": expected })
        );
        assert!(widgets.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_path_and_wrong_method() {
        let (api, _widgets) = widgets_api();

        let response = api.handle(request(Method::GET, "/gadgets", "")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = api.handle(request(Method::DELETE, "/widgets/42", "")).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET");
    }

    #[tokio::test]
    async fn test_unwired_method_on_registered_endpoint() {
        let widgets = Arc::new(Widgets::default());
        let mut api = Api::new();
        api.new_endpoint(Method::PUT, "/widgets/:ID", Arc::new(Resource::full(widgets.clone())))
            .unwrap();

        let response = api.handle(request(Method::PUT, "/widgets/42", "{}")).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(response).await["error_code"], json!(1));
        assert!(widgets.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_middleware_order_is_registration_order() {
        let log = Arc::new(Mutex::new(Vec::<String>::new()));
        let mut api = Api::new();

        for name in ["A", "B"] {
            let log = Arc::clone(&log);
            api.use_middleware(move |req: ApiRequest, next: Next| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push(format!("{name}-enter"));
                    let response = next.run(req).await;
                    log.lock().unwrap().push(format!("{name}-exit"));
                    response
                }
            });
        }

        let handler_log = Arc::clone(&log);
        let resource = Resource::new().with_fetch_all(Arc::new(move || {
            handler_log.lock().unwrap().push("handler".to_string());
            Envelope::ok(json!("ok"))
        }));
        api.new_endpoint(Method::GET, "/widgets", Arc::new(resource)).unwrap();

        let response = api.handle(request(Method::GET, "/widgets", "")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *log.lock().unwrap(),
            ["A-enter", "B-enter", "handler", "B-exit", "A-exit"]
        );
    }

    #[tokio::test]
    async fn test_late_middleware_does_not_wrap_earlier_endpoints() {
        let (mut api, widgets) = widgets_api();
        api.use_middleware(|_req: ApiRequest, _next: Next| async {
            response::error_response(StatusCode::FORBIDDEN, 0, "denied")
        });
        api.new_endpoint(
            Method::GET,
            "/gadgets",
            Arc::new(Resource::full(widgets.clone())),
        )
        .unwrap();

        let response = api.handle(request(Method::GET, "/widgets", "")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = api.handle(request(Method::GET, "/gadgets", "")).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(*widgets.calls.lock().unwrap(), ["get"]);
    }

    #[tokio::test]
    async fn test_request_carries_identifier_to_middleware() {
        let seen = Arc::new(Mutex::new(None));
        let mut api = Api::new();
        let recorder = Arc::clone(&seen);
        api.use_middleware(move |req: ApiRequest, next: Next| {
            *recorder.lock().unwrap() = req.id.clone();
            next.run(req)
        });
        api.new_endpoint_group("/widgets/", Arc::new(Resource::full(Arc::new(Widgets::default()))))
            .unwrap();

        let response = api.handle(request(Method::GET, "/widgets/7", "")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(seen.lock().unwrap().as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_identifier_is_percent_decoded() {
        let (api, widgets) = widgets_api();

        let response = api.handle(request(Method::GET, "/widgets/gear%20box", "")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "data": { "id": "gear box" } }));

        let response = api.handle(request(Method::GET, "/widgets/caf%C3%A9", "")).await;
        assert_eq!(body_json(response).await, json!({ "data": { "id": "café" } }));

        assert_eq!(
            *widgets.calls.lock().unwrap(),
            ["get_by_id:gear box", "get_by_id:café"]
        );
    }

    #[tokio::test]
    async fn test_identifier_with_invalid_utf8_is_bad_request() {
        let (api, widgets) = widgets_api();

        let response = api.handle(request(Method::GET, "/widgets/%FF", "")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error_code"], CODE_BAD_REQUEST);
        assert!(body["error_message"].as_str().unwrap().contains("%FF"));
        assert!(widgets.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_conflicting_registration_is_an_error() {
        let (mut api, widgets) = widgets_api();
        let err = api
            .new_endpoint(Method::GET, "/widgets", Arc::new(Resource::full(widgets)))
            .unwrap_err();
        assert_eq!(err.method, Method::GET);
        assert_eq!(err.path, "/widgets");
        assert_eq!(api.endpoint_count(), 3);
    }

    #[tokio::test]
    async fn test_start_without_endpoints_fails_before_binding() {
        let err = Api::new().start(0).await.unwrap_err();
        assert!(matches!(err, StartError::NoEndpoints));

        let listener = server::create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let err = Api::new()
            .serve(listener, std::future::ready(()))
            .await
            .unwrap_err();
        assert!(matches!(err, StartError::NoEndpoints));
    }

    #[tokio::test]
    async fn test_serve_returns_on_shutdown() {
        let (api, _widgets) = widgets_api();
        let listener = server::create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        api.serve(listener, std::future::ready(())).await.unwrap();
    }
}
