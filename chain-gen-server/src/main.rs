mod config;

use std::collections::HashMap;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::http::header::ContentType;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, put, web};

use chain_gen_core::model::text_builder::TextBuilder;
use config::Config;

/// Environment variable overriding the config file path.
const CONFIG_ENV: &str = "CHAIN_GEN_CONFIG";
const CONFIG_PATH: &str = "./chain-gen.toml";

struct SharedData {
	config: Config,
	/// One generator per (corpus, depth) pair, built on first use.
	builders: HashMap<(String, usize), TextBuilder>,
}

impl SharedData {
	fn new(config: Config) -> Self {
		Self { config, builders: HashMap::new() }
	}
}

/// Generates text for a configured corpus, building the generator on
/// first use. Unknown corpora are 404, construction and generation
/// failures are 500.
fn generate(
	data: &web::Data<Mutex<SharedData>>,
	corpus: &str,
	min_length: usize,
	depth: usize,
) -> HttpResponse {
	let mut shared_data = match data.lock() {
		Ok(s) => s,
		Err(_) => return HttpResponse::InternalServerError().body("State lock failed"),
	};

	let source = match shared_data.config.corpora.get(corpus) {
		Some(path) => path.clone(),
		None => return HttpResponse::NotFound().body(format!("Unknown corpus: {corpus}")),
	};

	let key = (corpus.to_owned(), depth);
	if !shared_data.builders.contains_key(&key) {
		match TextBuilder::new(depth, &source) {
			Ok(builder) => {
				shared_data.builders.insert(key.clone(), builder);
			}
			Err(e) => {
				return HttpResponse::InternalServerError()
					.body(format!("Failed to build generator: {e}"));
			}
		}
	}

	match shared_data.builders[&key].generate_text(min_length) {
		Ok(text) => HttpResponse::Ok().content_type(ContentType::plaintext()).body(text),
		Err(e) => HttpResponse::InternalServerError().body(format!("Generation failed: {e}")),
	}
}

/// HTTP GET endpoint `/`
///
/// Lists the configured corpora, one name per line.
#[get("/")]
async fn get_corpora(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(s) => s,
		Err(_) => return HttpResponse::InternalServerError().body("State lock failed"),
	};

	let mut names: Vec<&str> = shared_data.config.corpora.keys().map(String::as_str).collect();
	names.sort_unstable();
	HttpResponse::Ok().content_type(ContentType::plaintext()).body(names.join("\n"))
}

/// HTTP GET endpoint `/{corpus}`
///
/// Generates text with the configured default minimum length and depth.
#[get("/{corpus}")]
async fn get_generated(
	data: web::Data<Mutex<SharedData>>,
	path: web::Path<String>,
) -> impl Responder {
	let corpus = path.into_inner();
	let (min_length, depth) = {
		let shared_data = match data.lock() {
			Ok(s) => s,
			Err(_) => return HttpResponse::InternalServerError().body("State lock failed"),
		};
		(shared_data.config.default_min_length, shared_data.config.default_depth)
	};
	generate(&data, &corpus, min_length, depth)
}

/// HTTP GET endpoint `/{corpus}/{min_length}/{depth}`
///
/// Generates text with an explicit minimum length and token depth.
#[get("/{corpus}/{min_length}/{depth}")]
async fn get_generated_with_params(
	data: web::Data<Mutex<SharedData>>,
	path: web::Path<(String, usize, usize)>,
) -> impl Responder {
	let (corpus, min_length, depth) = path.into_inner();
	if depth == 0 {
		return HttpResponse::BadRequest().body("Depth must be at least 1");
	}
	generate(&data, &corpus, min_length, depth)
}

/// HTTP PUT endpoint `/{corpus}/invalidate`
///
/// Rebuilds every generator of a corpus from the current source content,
/// dropping the persisted snapshots. Use it after editing a source file
/// in place, since its path and depth alone would still match the old
/// snapshot key.
#[put("/{corpus}/invalidate")]
async fn put_invalidate(
	data: web::Data<Mutex<SharedData>>,
	path: web::Path<String>,
) -> impl Responder {
	let corpus = path.into_inner();
	let mut shared_data = match data.lock() {
		Ok(s) => s,
		Err(_) => return HttpResponse::InternalServerError().body("State lock failed"),
	};

	if !shared_data.config.corpora.contains_key(&corpus) {
		return HttpResponse::NotFound().body(format!("Unknown corpus: {corpus}"));
	}

	let keys: Vec<(String, usize)> = shared_data
		.builders
		.keys()
		.filter(|(name, _)| name == &corpus)
		.cloned()
		.collect();

	let mut refreshed = 0usize;
	for key in keys {
		// invalidate_cache consumes the builder and returns the rebuilt one
		if let Some(builder) = shared_data.builders.remove(&key) {
			match builder.invalidate_cache() {
				Ok(builder) => {
					shared_data.builders.insert(key, builder);
					refreshed += 1;
				}
				Err(e) => {
					return HttpResponse::InternalServerError()
						.body(format!("Failed to rebuild generator: {e}"));
				}
			}
		}
	}

	HttpResponse::Ok().body(format!("Invalidated {refreshed} generator(s)"))
}

/// Main entry point for the server.
///
/// Loads the configuration, wraps the shared state in a `Mutex` and
/// starts an Actix-web HTTP server. Generators are built lazily on the
/// first request for each (corpus, depth) pair.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| CONFIG_PATH.to_owned());
	let config = match Config::load(&config_path) {
		Ok(config) => config,
		Err(e) => {
			log::error!("failed to load {config_path}: {e}");
			return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()));
		}
	};

	let bind = (config.bind_address.clone(), config.port);
	log::info!("serving {} corpora on {}:{}", config.corpora.len(), bind.0, bind.1);
	let shared_data = web::Data::new(Mutex::new(SharedData::new(config)));

	HttpServer::new(move || {
		App::new()
			.app_data(shared_data.clone())
			.wrap(Cors::permissive())
			.service(get_corpora)
			.service(put_invalidate)
			.service(get_generated_with_params)
			.service(get_generated)
	})
		.bind(bind)?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use std::fs;

	use actix_web::http::StatusCode;
	use actix_web::test;
	use tempfile::TempDir;

	use super::*;

	const CORPUS: &str = "The cat sat on the mat. The dog ran far away! A bird may sing today.";

	fn test_state(dir: &TempDir) -> web::Data<Mutex<SharedData>> {
		let source = dir.path().join("demo.txt");
		fs::write(&source, CORPUS).unwrap();

		let mut config = Config::default();
		config.default_min_length = 10;
		config.corpora.insert("demo".to_owned(), source);
		web::Data::new(Mutex::new(SharedData::new(config)))
	}

	#[actix_web::test]
	async fn default_endpoint_returns_plain_text() {
		let dir = TempDir::new().unwrap();
		let app = test::init_service(
			App::new()
				.app_data(test_state(&dir))
				.service(get_generated_with_params)
				.service(get_generated),
		)
		.await;

		let request = test::TestRequest::get().uri("/demo").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::OK);

		let content_type = response.headers().get("content-type").unwrap().to_str().unwrap();
		assert!(content_type.starts_with("text/plain"));
		assert!(!test::read_body(response).await.is_empty());
	}

	#[actix_web::test]
	async fn parameterized_endpoint_returns_plain_text() {
		let dir = TempDir::new().unwrap();
		let app = test::init_service(
			App::new()
				.app_data(test_state(&dir))
				.service(get_generated_with_params)
				.service(get_generated),
		)
		.await;

		let request = test::TestRequest::get().uri("/demo/30/2").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::OK);

		let content_type = response.headers().get("content-type").unwrap().to_str().unwrap();
		assert!(content_type.starts_with("text/plain"));
	}

	#[actix_web::test]
	async fn unknown_corpus_is_not_found() {
		let dir = TempDir::new().unwrap();
		let app = test::init_service(
			App::new()
				.app_data(test_state(&dir))
				.service(get_generated_with_params)
				.service(get_generated),
		)
		.await;

		let request = test::TestRequest::get().uri("/missing").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::NOT_FOUND);
	}

	#[actix_web::test]
	async fn zero_depth_is_rejected() {
		let dir = TempDir::new().unwrap();
		let app = test::init_service(
			App::new()
				.app_data(test_state(&dir))
				.service(get_generated_with_params)
				.service(get_generated),
		)
		.await;

		let request = test::TestRequest::get().uri("/demo/10/0").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn invalidate_rebuilds_from_the_edited_source() {
		let dir = TempDir::new().unwrap();
		let source = dir.path().join("demo.txt");
		fs::write(&source, "Old words stay here.").unwrap();

		let mut config = Config::default();
		config.default_min_length = 0;
		config.corpora.insert("demo".to_owned(), source.clone());
		let state = web::Data::new(Mutex::new(SharedData::new(config)));

		let app = test::init_service(
			App::new()
				.app_data(state)
				.service(put_invalidate)
				.service(get_generated_with_params)
				.service(get_generated),
		)
		.await;

		// First request builds and snapshots the old corpus
		let request = test::TestRequest::get().uri("/demo").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::OK);

		fs::write(&source, "New words live here.").unwrap();
		let request = test::TestRequest::put().uri("/demo/invalidate").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::OK);

		let request = test::TestRequest::get().uri("/demo").to_request();
		let response = test::call_service(&app, request).await;
		let body = test::read_body(response).await;
		assert!(body.starts_with(b"New"), "unexpected body: {body:?}");
	}
}
