#![deny(missing_docs)]

//! # Serve Command
//!
//! HTTP endpoints over previously generated documents:
//!
//! - `/mock/{project}/{tail}`: example response of the matched operation.
//! - `/proxy/{project}/{tail}`: forwards the request to the project's host.
//! - `GET /docs/{project}/{file}`: the document in either dialect.
//!
//! Documents are read from `<docs>/<project>/swagger.json` through a shared
//! 60 second cache.

use crate::error::CliError;
use crate::generate::load_config;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, ResponseError};
use apigraph_core::proxy::{forwards_request_header, relays_response_header, target_url};
use apigraph_core::{
    load_from_dir, mock_reply, to_openapi, ApiDocument, AppError, AppResult, DocumentCache,
    ExportFormat,
};
use derive_more::{Display, From};
use serde_json::{json, Value as JsonValue};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Arguments for the serve command.
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on.
    #[clap(long, env = "APIGRAPH_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// Directory holding `<project>/swagger.json` documents.
    #[clap(long, short, env = "APIGRAPH_DOCS", default_value = "docs")]
    pub docs: PathBuf,

    /// Generator configuration (YAML or JSON); supplies `example_depth`.
    #[clap(long, short, env = "APIGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Recursion limit for generated examples; overrides the configuration.
    #[clap(long)]
    pub example_depth: Option<usize>,

    /// Upstream timeout for proxied requests, in seconds.
    #[clap(long, default_value_t = 30)]
    pub proxy_timeout: u64,
}

/// Shared by every worker.
pub struct ServerState {
    cache: DocumentCache,
    docs_root: PathBuf,
    example_depth: usize,
    agent: ureq::Agent,
}

impl ServerState {
    /// State over a docs directory.
    pub fn new(docs_root: PathBuf, example_depth: usize, proxy_timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(proxy_timeout))
            .build()
            .into();
        Self {
            cache: DocumentCache::default(),
            docs_root,
            example_depth,
            agent,
        }
    }

    /// State for the command line; the flag wins over the configured depth.
    pub fn from_args(args: &ServeArgs) -> AppResult<Self> {
        let config = load_config(args.config.as_deref())?;
        let example_depth = args.example_depth.unwrap_or(config.example_depth);
        tracing::debug!(example_depth, "example depth");
        Ok(Self::new(
            args.docs.clone(),
            example_depth,
            Duration::from_secs(args.proxy_timeout),
        ))
    }

    fn load(&self, project: &str) -> AppResult<Arc<ApiDocument>> {
        self.cache
            .get_or_load(project, |p| load_from_dir(&self.docs_root, p))?
            .ok_or_else(|| AppError::NotFound(format!("project '{}'", project)))
    }
}

/// Cache lookup on the blocking pool; a miss reads the docs directory.
async fn load_document(
    state: &web::Data<ServerState>,
    project: &str,
) -> AppResult<Arc<ApiDocument>> {
    let state = state.clone();
    let project = project.to_string();
    web::block(move || state.load(&project))
        .await
        .map_err(|e| AppError::General(e.to_string()))?
}

/// Handler failure mapped onto an HTTP status.
#[derive(Debug, Display, From)]
pub enum ServeError {
    /// Lookup, conversion or routing failure.
    #[display("{_0}")]
    App(AppError),

    /// The upstream of a proxied request failed.
    #[from(ignore)]
    #[display("Upstream Error: {_0}")]
    Upstream(String),
}

impl From<CliError> for ServeError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Http(message) => ServeError::Upstream(message),
            other => ServeError::App(other.into()),
        }
    }
}

impl ResponseError for ServeError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServeError::App(AppError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServeError::App(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServeError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}

async fn mock(
    state: web::Data<ServerState>,
    path: web::Path<(String, String)>,
    req: HttpRequest,
) -> Result<HttpResponse, ServeError> {
    let (project, tail) = path.into_inner();
    let document = load_document(&state, &project).await?;
    let reply = mock_reply(
        &document,
        req.method().as_str(),
        &format!("/{}", tail),
        state.example_depth,
    )?;

    let mut response = HttpResponse::Ok();
    response.content_type(reply.content_type.as_str());
    Ok(match reply.body {
        None => response.finish(),
        Some(JsonValue::String(text)) if !reply.content_type.contains("json") => {
            response.body(text)
        }
        Some(body) => response.body(body.to_string()),
    })
}

struct Upstream {
    status: u16,
    headers: Vec<(String, Vec<u8>)>,
    body: Vec<u8>,
}

fn forward(
    agent: &ureq::Agent,
    request: ureq::http::request::Builder,
    body: Vec<u8>,
) -> Result<Upstream, CliError> {
    let sent = if body.is_empty() {
        request.body(()).map(|r| agent.run(r))
    } else {
        request.body(body).map(|r| agent.run(r))
    };
    let response = sent
        .map_err(|e| CliError::Http(e.to_string()))?
        .map_err(|e| CliError::Http(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter(|(name, _)| relays_response_header(name.as_str()))
        .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
        .collect();
    let body = response
        .into_body()
        .read_to_vec()
        .map_err(|e| CliError::Http(e.to_string()))?;
    Ok(Upstream {
        status,
        headers,
        body,
    })
}

async fn proxy(
    state: web::Data<ServerState>,
    path: web::Path<(String, String)>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ServeError> {
    let (project, tail) = path.into_inner();
    let document = load_document(&state, &project).await?;
    let url = target_url(&document, &tail, Some(req.query_string()))?;
    tracing::debug!(%project, %url, method = %req.method(), "proxying");

    let mut request = ureq::http::Request::builder()
        .method(req.method().as_str())
        .uri(url.as_str());
    for (name, value) in req.headers() {
        if forwards_request_header(name.as_str()) {
            request = request.header(name.as_str(), value.as_bytes());
        }
    }

    let agent = state.agent.clone();
    let body = body.to_vec();
    let upstream = tokio::task::spawn_blocking(move || forward(&agent, request, body))
        .await
        .map_err(|e| ServeError::Upstream(e.to_string()))??;

    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = HttpResponse::build(status);
    for (name, value) in upstream.headers {
        response.append_header((name, value));
    }
    Ok(response.body(upstream.body))
}

async fn docs(
    state: web::Data<ServerState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServeError> {
    let (project, file) = path.into_inner();
    let (stem, extension) = file
        .rsplit_once('.')
        .ok_or_else(|| AppError::NotFound(file.clone()))?;
    let format: ExportFormat = extension
        .parse()
        .map_err(|_| AppError::NotFound(file.clone()))?;
    let document = load_document(&state, &project).await?;

    let rendered = match stem {
        "swagger" => format.render(&*document)?,
        "openapi" => format.render(&to_openapi(&document)?)?,
        _ => return Err(AppError::NotFound(file.clone()).into()),
    };
    Ok(HttpResponse::Ok()
        .content_type(format!("application/{}", format.media_subtype()))
        .body(rendered))
}

/// Registers every endpoint.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/mock/{project}/{tail:.*}").route(web::to(mock)))
        .service(web::resource("/proxy/{project}/{tail:.*}").route(web::to(proxy)))
        .service(web::resource("/docs/{project}/{file}").route(web::get().to(docs)));
}

fn build_server(
    listener: TcpListener,
    state: web::Data<ServerState>,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(
        HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
            .listen(listener)?
            .run(),
    )
}

/// Runs the server until it is stopped.
pub fn execute(args: &ServeArgs) -> AppResult<()> {
    let state = web::Data::new(ServerState::from_args(args)?);
    let listener = TcpListener::bind(&args.bind)?;
    tracing::info!(bind = %args.bind, docs = ?args.docs, "serving");
    actix_rt::System::new().block_on(async move { build_server(listener, state)?.await })?;
    Ok(())
}
