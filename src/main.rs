use resource_api::config::Config;
use resource_api::{logger, AccessLog, Api, Create, Envelope, FetchAll, FetchById, Payload, Resource};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = match std::env::args().nth(1) {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };
    logger::init(&cfg.logging)?;

    // Build the runtime by hand so `server.workers` is honoured
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut api = Api::new();
    if cfg.logging.access_log {
        api.use_middleware(AccessLog::new(cfg.logging.access_log_format.clone()));
    }

    let widgets = Arc::new(WidgetStore::default());
    api.new_endpoint_group("/widgets", Arc::new(Resource::full(widgets)))?;

    // List-only resource: GET /health/:ID and POST /health answer 405
    let health = Resource::new().with_fetch_all(Arc::new(|| Envelope::ok(json!({ "status": "ok" }))));
    api.new_endpoint_group("/health", Arc::new(health))?;

    api.start_with(&cfg.server).await?;
    Ok(())
}

/// In-memory widget collection
#[derive(Default)]
struct WidgetStore {
    next_id: AtomicU64,
    widgets: RwLock<BTreeMap<u64, Value>>,
}

impl FetchAll for WidgetStore {
    fn get(&self) -> Envelope {
        let Ok(widgets) = self.widgets.read() else {
            return Envelope::error(hyper::StatusCode::INTERNAL_SERVER_ERROR, 2, "Widget store unavailable");
        };
        let items: Vec<Value> = widgets.values().cloned().collect();
        Envelope::ok(Value::Array(items)).with_meta(json!({ "total": widgets.len() }))
    }
}

impl FetchById for WidgetStore {
    fn get_by_id(&self, id: &str) -> Envelope {
        let Ok(key) = id.parse::<u64>() else {
            return Envelope::error(hyper::StatusCode::BAD_REQUEST, 4, format!("Invalid widget id '{id}'"));
        };
        let Ok(widgets) = self.widgets.read() else {
            return Envelope::error(hyper::StatusCode::INTERNAL_SERVER_ERROR, 2, "Widget store unavailable");
        };
        match widgets.get(&key) {
            Some(widget) => Envelope::ok(widget.clone()),
            None => Envelope::error(hyper::StatusCode::NOT_FOUND, 5, format!("Widget {key} not found")),
        }
    }
}

impl Create for WidgetStore {
    fn post(&self, mut payload: Payload) -> Envelope {
        if !payload.get("name").is_some_and(Value::is_string) {
            return Envelope::error(hyper::StatusCode::BAD_REQUEST, 4, "Field 'name' must be a string");
        }
        let Ok(mut widgets) = self.widgets.write() else {
            return Envelope::error(hyper::StatusCode::INTERNAL_SERVER_ERROR, 2, "Widget store unavailable");
        };
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        payload.insert("id".to_string(), json!(id));
        let widget = Value::Object(payload);
        widgets.insert(id, widget.clone());
        Envelope::ok(widget)
    }
}
