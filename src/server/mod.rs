pub mod routes;

use anyhow::Result;
use log::{debug, error, info};

use crate::config::Config;
use crate::model::{load_models, Models};

pub use routes::{route, Reply, HEALTH_MESSAGE};

pub fn run_server(config: &Config) -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let models = load_models(config);

    let addr = config.listen_addr();
    let server = bind(&addr)?;
    info!("listening on {}", addr);

    serve(&server, &models);
    Ok(())
}

pub fn bind(addr: &str) -> Result<tiny_http::Server> {
    tiny_http::Server::http(addr).map_err(|e| anyhow::anyhow!("failed to bind {}: {}", addr, e))
}

/// Handle requests one at a time until the server is closed.
pub fn serve(server: &tiny_http::Server, models: &Models) {
    for request in server.incoming_requests() {
        handle_request(request, models);
    }
}

fn handle_request(mut request: tiny_http::Request, models: &Models) {
    let method = request.method().clone();
    let url = request.url().to_string();
    debug!("{} {}", method, url);

    let mut body = String::new();
    if let Err(e) = request.as_reader().read_to_string(&mut body) {
        error!("{} {}: failed to read body: {}", method, url, e);
        respond_fault(request);
        return;
    }

    match route(models, &method, &url, &body) {
        Ok(reply) => respond_json(request, reply),
        Err(e) => {
            error!("{} {}: {}", method, url, e);
            respond_fault(request);
        }
    }
}

fn respond_json(request: tiny_http::Request, reply: Reply) {
    let mut response = tiny_http::Response::from_string(reply.body.to_string())
        .with_status_code(tiny_http::StatusCode(reply.status));
    if let Some(header) = content_type("application/json") {
        response = response.with_header(header);
    }
    let _ = request.respond(response);
}

/// Unstructured 500 for failures the service does not recover from.
fn respond_fault(request: tiny_http::Request) {
    let mut response = tiny_http::Response::from_string("Internal Server Error")
        .with_status_code(tiny_http::StatusCode(500));
    if let Some(header) = content_type("text/plain; charset=utf-8") {
        response = response.with_header(header);
    }
    let _ = request.respond(response);
}

fn content_type(value: &str) -> Option<tiny_http::Header> {
    tiny_http::Header::from_bytes(&b"Content-Type"[..], value.as_bytes()).ok()
}
